//! Course collection and bulk generation handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use corso_core::api::{Course, CourseId, CurriculumIndex, Lesson};
use corso_core::bulk::BulkOutcome;
use corso_core::tracker::CourseProgress;

use super::error::{collection_error, service_error, session_error, ApiError};
use crate::state::{AppState, BulkRunOutcome, BulkRunState};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a course
#[derive(Debug, Deserialize)]
pub struct CreateCourseBody {
    /// Topic the curriculum is generated for
    pub topic: String,
    /// Language the lessons are written in
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "English".to_string()
}

/// Request body for reordering the course list
#[derive(Debug, Deserialize)]
pub struct ReorderBody {
    /// Course being dragged
    pub moved_id: CourseId,
    /// Course whose slot it is dropped onto
    pub target_id: CourseId,
}

/// Request body for renaming a course
#[derive(Debug, Deserialize)]
pub struct RenameBody {
    pub title: String,
}

/// A course with its curriculum index and aggregate progress
#[derive(Debug, Serialize)]
pub struct CourseDetailResponse {
    pub course: Course,
    pub index: CurriculumIndex,
    pub progress: CourseProgress,
}

#[derive(Debug, Serialize)]
pub struct BulkStartedResponse {
    pub course_id: CourseId,
    pub status: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// List all courses in display order
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Course>>, ApiError> {
    state
        .collection()
        .list()
        .await
        .map(Json)
        .map_err(collection_error)
}

/// Create a course for a topic
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCourseBody>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    let course = state
        .collection()
        .create(&body.topic, &body.language)
        .await
        .map_err(collection_error)?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// Move a course onto another course's slot and persist the new order
pub async fn reorder_courses(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReorderBody>,
) -> Result<Json<Vec<Course>>, ApiError> {
    let mut courses = state.collection().list().await.map_err(collection_error)?;
    state
        .collection()
        .reorder(&mut courses, body.moved_id, body.target_id)
        .await
        .map_err(collection_error)?;
    Ok(Json(courses))
}

/// Get a course, its curriculum index, and aggregate progress
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<CourseDetailResponse>, ApiError> {
    let session = state.session(course_id).await.map_err(session_error)?;
    Ok(Json(CourseDetailResponse {
        course: session.course().clone(),
        index: session.index().clone(),
        progress: session.progress().await,
    }))
}

/// Rename a course
pub async fn rename_course(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<CourseId>,
    Json(body): Json<RenameBody>,
) -> Result<Json<Course>, ApiError> {
    let course = state
        .collection()
        .rename(course_id, &body.title)
        .await
        .map_err(collection_error)?;
    // The open session still carries the old title.
    state.close_session(course_id).await;
    Ok(Json(course))
}

/// Delete a course and all its lessons
pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<CourseId>,
) -> Result<StatusCode, ApiError> {
    state
        .collection()
        .delete(course_id)
        .await
        .map_err(collection_error)?;
    state.close_session(course_id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Aggregate progress for a course
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<CourseProgress>, ApiError> {
    let session = state.session(course_id).await.map_err(session_error)?;
    session.refresh().await.map_err(session_error)?;
    Ok(Json(session.progress().await))
}

/// List the generated lessons of a course
pub async fn list_lessons(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<Vec<Lesson>>, ApiError> {
    state
        .service()
        .list_lessons(course_id)
        .await
        .map(Json)
        .map_err(service_error)
}

/// Start generating every missing lesson of a course in the background
pub async fn generate_all(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<CourseId>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.session(course_id).await.map_err(session_error)?;

    if !state.try_start_bulk_run(course_id) {
        return Err((
            StatusCode::CONFLICT,
            Json(super::error::ErrorResponse {
                error: format!("bulk generation already running for course {course_id}"),
            }),
        ));
    }

    let state_for_task = state.clone();
    tokio::spawn(async move {
        let outcome = match session.generate_all().await {
            Ok(BulkOutcome::NothingToDo) => BulkRunOutcome::NothingToDo,
            Ok(BulkOutcome::Completed(summary)) => {
                info!(
                    course_id,
                    completed = summary.completed,
                    failed = summary.failed,
                    "background bulk run finished"
                );
                BulkRunOutcome::Completed(summary)
            }
            Err(e) => {
                error!(course_id, error = %e, "background bulk run failed");
                BulkRunOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        state_for_task.finish_bulk_run(course_id, outcome);
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(BulkStartedResponse {
            course_id,
            status: "started".to_string(),
        }),
    ))
}

/// Current state of a course's bulk generation run
pub async fn generation_status(
    State(state): State<Arc<AppState>>,
    Path(course_id): Path<CourseId>,
) -> Json<BulkRunState> {
    Json(state.bulk_run_state(course_id))
}
