//! Lesson generation and progress handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use corso_core::api::{CourseId, Lesson, LessonId, UpdateLessonRequest};
use corso_core::lesson::LessonError;

use super::error::{lesson_error, service_error, session_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for generating a single lesson
#[derive(Debug, Deserialize)]
pub struct GenerateLessonBody {
    /// Curriculum index path of the lesson
    pub path: String,
    /// Wait for the derived artifact reference before responding
    #[serde(default)]
    pub wait_derived: bool,
}

/// Request body for updating a lesson
#[derive(Debug, Deserialize)]
pub struct UpdateLessonBody {
    pub user_notes: Option<String>,
    pub is_completed: Option<bool>,
}

/// Request body for regenerating a lesson
#[derive(Debug, Deserialize)]
pub struct RegenerateBody {
    pub feedback: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Generate the lesson at a curriculum path
pub async fn generate_lesson(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<CourseId>,
    Json(body): Json<GenerateLessonBody>,
) -> Result<(StatusCode, Json<Lesson>), ApiError> {
    let session = state.session(course_id).await.map_err(session_error)?;
    let mut lesson = session
        .generate_lesson(&body.path)
        .await
        .map_err(session_error)?;

    if body.wait_derived && lesson.pdf_path.is_none() {
        // Bounded wait; the artifact stays absent if it is not ready in time.
        lesson.pdf_path = session.watch_derived_artifact(lesson.id).await;
    }

    Ok((StatusCode::CREATED, Json(lesson)))
}

/// Fetch a single lesson
pub async fn get_lesson(
    State(state): State<Arc<AppState>>,
    Path(lesson_id): Path<LessonId>,
) -> Result<Json<Lesson>, ApiError> {
    state
        .service()
        .get_lesson(lesson_id)
        .await
        .map(Json)
        .map_err(service_error)
}

/// Update lesson notes and/or completion state
pub async fn update_lesson(
    State(state): State<Arc<AppState>>,
    Path(lesson_id): Path<LessonId>,
    Json(body): Json<UpdateLessonBody>,
) -> Result<Json<Lesson>, ApiError> {
    match body.is_completed {
        // Completion changes go through the session so the tracker follows.
        Some(completed) => {
            let current = state
                .service()
                .get_lesson(lesson_id)
                .await
                .map_err(service_error)?;
            let session = state
                .session(current.course_id)
                .await
                .map_err(session_error)?;
            session
                .update_progress(lesson_id, body.user_notes, completed)
                .await
                .map(Json)
                .map_err(session_error)
        }
        None => state
            .service()
            .update_lesson(
                lesson_id,
                UpdateLessonRequest {
                    user_notes: body.user_notes,
                    is_completed: None,
                },
            )
            .await
            .map(Json)
            .map_err(service_error),
    }
}

/// Regenerate a lesson from user feedback
pub async fn regenerate_lesson(
    State(state): State<Arc<AppState>>,
    Path(lesson_id): Path<LessonId>,
    Json(body): Json<RegenerateBody>,
) -> Result<Json<Lesson>, ApiError> {
    // Validated before any upstream call.
    if body.feedback.trim().is_empty() {
        return Err(lesson_error(LessonError::EmptyFeedback));
    }

    let current = state
        .service()
        .get_lesson(lesson_id)
        .await
        .map_err(service_error)?;
    let session = state
        .session(current.course_id)
        .await
        .map_err(session_error)?;
    session
        .regenerate_lesson(lesson_id, &body.feedback)
        .await
        .map(Json)
        .map_err(session_error)
}
