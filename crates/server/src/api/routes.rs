use axum::{
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{courses, handlers, lessons};
use crate::metrics::HTTP_REQUESTS_TOTAL;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health, config, metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::get_metrics))
        // Course collection
        .route("/courses", get(courses::list_courses))
        .route("/courses", post(courses::create_course))
        .route("/courses/order", put(courses::reorder_courses))
        .route("/courses/{id}", get(courses::get_course))
        .route("/courses/{id}", put(courses::rename_course))
        .route("/courses/{id}", axum::routing::delete(courses::delete_course))
        .route("/courses/{id}/progress", get(courses::get_progress))
        .route("/courses/{id}/lessons", get(courses::list_lessons))
        // Generation
        .route("/courses/{id}/lessons/generate", post(lessons::generate_lesson))
        .route("/courses/{id}/generate-all", post(courses::generate_all))
        .route("/courses/{id}/generation-status", get(courses::generation_status))
        // Lessons
        .route("/lessons/{lesson_id}", get(lessons::get_lesson))
        .route("/lessons/{lesson_id}", put(lessons::update_lesson))
        .route("/lessons/{lesson_id}/regenerate", post(lessons::regenerate_lesson))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Count requests by route pattern, not raw path, to keep label cardinality low.
async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), &path, response.status().as_str()])
        .inc();
    response
}
