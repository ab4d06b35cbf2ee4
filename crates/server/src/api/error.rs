//! Mapping from engine errors to HTTP responses.

use axum::{http::StatusCode, Json};
use serde::Serialize;

use corso_core::collection::CollectionError;
use corso_core::lesson::LessonError;
use corso_core::session::SessionError;
use corso_core::ServiceError;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn respond(status: StatusCode, message: String) -> ApiError {
    (status, Json(ErrorResponse { error: message }))
}

/// Upstream failures surface as gateway errors; only a missing resource is
/// the caller's 404.
pub fn service_error(e: ServiceError) -> ApiError {
    let status = match &e {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    };
    respond(status, e.to_string())
}

pub fn session_error(e: SessionError) -> ApiError {
    match e {
        SessionError::UnknownPath(_) => respond(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        SessionError::Lesson(inner) => lesson_error(inner),
        SessionError::Bulk(corso_core::bulk::BulkError::Service(inner)) => service_error(inner),
        SessionError::Service(inner) => service_error(inner),
    }
}

pub fn lesson_error(e: LessonError) -> ApiError {
    match e {
        LessonError::EmptyFeedback => respond(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        LessonError::Service(inner) => service_error(inner),
    }
}

pub fn collection_error(e: CollectionError) -> ApiError {
    match e {
        CollectionError::EmptyTopic
        | CollectionError::EmptyLanguage
        | CollectionError::EmptyTitle => respond(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        CollectionError::ReorderFailed(_) => respond(StatusCode::BAD_GATEWAY, e.to_string()),
        CollectionError::Service(inner) => service_error(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let (status, _) = service_error(ServiceError::NotFound("course 9".to_string()));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_timeout_maps_to_504() {
        let (status, _) = service_error(ServiceError::Timeout);
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_validation_errors_map_to_422() {
        let (status, _) = lesson_error(LessonError::EmptyFeedback);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let (status, _) = collection_error(CollectionError::EmptyTopic);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
