//! Common test utilities for E2E testing with mocks.
//!
//! Provides a test fixture that creates an in-process router with the mock
//! course service injected, enabling comprehensive API testing without
//! external infrastructure.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use corso_core::bulk::BulkConfig;
use corso_core::config::{ServerConfig, ServiceConfig};
use corso_core::lesson::LessonConfig;
use corso_core::testing::MockCourseService;
use corso_core::{Config, CourseService};

/// Re-export fixtures for test convenience
pub use corso_core::testing::fixtures;

/// Test fixture for API testing with a mock course service.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health() {
///     let fixture = TestFixture::new();
///     let response = fixture.get("/api/v1/health").await;
///     assert_eq!(response.status, StatusCode::OK);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock course service - seed courses, script failures
    pub service: Arc<MockCourseService>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with fast polling intervals.
    pub fn new() -> Self {
        let config = Config {
            service: ServiceConfig {
                base_url: "http://localhost:8000/api/v1".to_string(),
                api_token: None,
                timeout_secs: 5,
            },
            server: ServerConfig::default(),
            lesson: LessonConfig {
                derived_poll_interval_ms: 5,
                derived_poll_max_attempts: 3,
            },
            bulk: BulkConfig {
                status_poll_interval_ms: 5,
            },
        };

        let service = Arc::new(MockCourseService::new());
        let state = Arc::new(corso_server::state::AppState::new(
            config,
            Arc::clone(&service) as Arc<dyn CourseService>,
        ));
        let router = corso_server::api::create_router(state);

        Self { router, service }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let request = match body {
            Some(json) => Request::builder()
                .method(method)
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).to_string(),
            ))
        };

        TestResponse { status, body }
    }
}
