//! HTTP implementation of the course service client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ServiceConfig;

use super::{
    BatchGenerationStatus, BulkStart, Course, CourseId, CourseOverview, CourseService,
    CurriculumIndex, Lesson, LessonId, LessonRef, ServiceError, UpdateLessonRequest,
};

/// Course service client over the backend's REST API.
pub struct HttpCourseService {
    client: Client,
    config: ServiceConfig,
}

/// Course payload as the backend serializes it: the curriculum index comes
/// back as a raw JSON string in `index_json`.
#[derive(Debug, Deserialize)]
struct CourseDto {
    id: CourseId,
    title: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    display_order: i64,
    #[serde(default)]
    all_lessons_completed: bool,
    #[serde(default)]
    index_json: Option<String>,
}

impl From<&CourseDto> for Course {
    fn from(dto: &CourseDto) -> Self {
        Course {
            id: dto.id,
            title: dto.title.clone(),
            created_at: dto.created_at,
            display_order: dto.display_order,
            all_lessons_completed: dto.all_lessons_completed,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateLessonBody<'a> {
    course_id: CourseId,
    title: &'a str,
    path_in_index: &'a str,
}

#[derive(Debug, Serialize)]
struct RegenerateBody<'a> {
    feedback: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateCourseBody<'a> {
    topic: &'a str,
    language: &'a str,
}

#[derive(Debug, Serialize)]
struct ReorderBody<'a> {
    order: &'a [CourseId],
}

#[derive(Debug, Serialize)]
struct RenameBody<'a> {
    title: &'a str,
}

impl HttpCourseService {
    /// Create a new client from configuration.
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| ServiceError::Api(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url(), endpoint);
        let mut builder = self.client.request(method, &url);
        if let Some(ref token) = self.config.api_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    fn map_transport(e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout
        } else if e.is_connect() {
            ServiceError::ConnectionFailed(e.to_string())
        } else {
            ServiceError::Api(e.to_string())
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        endpoint: &str,
    ) -> Result<T, ServiceError> {
        let response = builder.send().await.map_err(Self::map_transport)?;

        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => return Err(ServiceError::NotFound(endpoint.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ServiceError::Unauthorized(format!("HTTP {status}")))
            }
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(ServiceError::Api(format!(
                    "HTTP {status}: {}",
                    body.chars().take(200).collect::<String>()
                )));
            }
            _ => {}
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }

    async fn send_no_body(
        &self,
        builder: RequestBuilder,
        endpoint: &str,
    ) -> Result<(), ServiceError> {
        let response = builder.send().await.map_err(Self::map_transport)?;

        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => Err(ServiceError::NotFound(endpoint.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(ServiceError::Unauthorized(format!("HTTP {status}")))
            }
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                Err(ServiceError::Api(format!(
                    "HTTP {status}: {}",
                    body.chars().take(200).collect::<String>()
                )))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl CourseService for HttpCourseService {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_course(&self, course_id: CourseId) -> Result<CourseOverview, ServiceError> {
        let endpoint = format!("/courses/{course_id}");
        let dto: CourseDto = self
            .send(self.request(Method::GET, &endpoint), &endpoint)
            .await?;

        let index = match dto.index_json {
            Some(ref raw) => CurriculumIndex::from_json(raw)?,
            None => {
                return Err(ServiceError::InvalidResponse(format!(
                    "course {course_id} has no curriculum index"
                )))
            }
        };

        debug!(course_id, lessons = index.lesson_count(), "fetched course");
        Ok(CourseOverview {
            course: Course::from(&dto),
            index,
        })
    }

    async fn list_lessons(&self, course_id: CourseId) -> Result<Vec<Lesson>, ServiceError> {
        let endpoint = format!("/courses/{course_id}/lessons");
        self.send(self.request(Method::GET, &endpoint), &endpoint)
            .await
    }

    async fn generate_lesson(
        &self,
        course_id: CourseId,
        lesson: &LessonRef,
    ) -> Result<Lesson, ServiceError> {
        let endpoint = "/lessons/generate";
        let body = GenerateLessonBody {
            course_id,
            title: &lesson.title,
            path_in_index: &lesson.path,
        };
        self.send(
            self.request(Method::POST, endpoint).json(&body),
            endpoint,
        )
        .await
    }

    async fn get_lesson(&self, lesson_id: LessonId) -> Result<Lesson, ServiceError> {
        let endpoint = format!("/lessons/{lesson_id}");
        self.send(self.request(Method::GET, &endpoint), &endpoint)
            .await
    }

    async fn update_lesson(
        &self,
        lesson_id: LessonId,
        update: UpdateLessonRequest,
    ) -> Result<Lesson, ServiceError> {
        let endpoint = format!("/lessons/{lesson_id}");
        self.send(
            self.request(Method::PUT, &endpoint).json(&update),
            &endpoint,
        )
        .await
    }

    async fn regenerate_lesson(
        &self,
        lesson_id: LessonId,
        feedback: &str,
    ) -> Result<Lesson, ServiceError> {
        let endpoint = format!("/lessons/{lesson_id}/regenerate");
        self.send(
            self.request(Method::POST, &endpoint)
                .json(&RegenerateBody { feedback }),
            &endpoint,
        )
        .await
    }

    async fn start_bulk_generation(&self, course_id: CourseId) -> Result<BulkStart, ServiceError> {
        let endpoint = format!("/courses/{course_id}/generate-all-lessons");
        self.send(self.request(Method::POST, &endpoint), &endpoint)
            .await
    }

    async fn bulk_generation_status(
        &self,
        course_id: CourseId,
    ) -> Result<BatchGenerationStatus, ServiceError> {
        let endpoint = format!("/courses/{course_id}/generation-status");
        self.send(self.request(Method::GET, &endpoint), &endpoint)
            .await
    }

    async fn list_courses(&self) -> Result<Vec<Course>, ServiceError> {
        let endpoint = "/courses/";
        let dtos: Vec<CourseDto> = self
            .send(self.request(Method::GET, endpoint), endpoint)
            .await?;
        Ok(dtos.iter().map(Course::from).collect())
    }

    async fn create_course(&self, topic: &str, language: &str) -> Result<Course, ServiceError> {
        let endpoint = "/courses/";
        let dto: CourseDto = self
            .send(
                self.request(Method::POST, endpoint)
                    .json(&CreateCourseBody { topic, language }),
                endpoint,
            )
            .await?;
        Ok(Course::from(&dto))
    }

    async fn reorder_courses(&self, order: &[CourseId]) -> Result<(), ServiceError> {
        let endpoint = "/courses/order";
        self.send_no_body(
            self.request(Method::PUT, endpoint)
                .json(&ReorderBody { order }),
            endpoint,
        )
        .await
    }

    async fn rename_course(
        &self,
        course_id: CourseId,
        title: &str,
    ) -> Result<Course, ServiceError> {
        let endpoint = format!("/courses/{course_id}");
        let dto: CourseDto = self
            .send(
                self.request(Method::PUT, &endpoint)
                    .json(&RenameBody { title }),
                &endpoint,
            )
            .await?;
        Ok(Course::from(&dto))
    }

    async fn delete_course(&self, course_id: CourseId) -> Result<(), ServiceError> {
        let endpoint = format!("/courses/{course_id}");
        self.send_no_body(self.request(Method::DELETE, &endpoint), &endpoint)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ServiceConfig {
        ServiceConfig {
            base_url: base_url.to_string(),
            api_token: None,
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let service = HttpCourseService::new(config("http://localhost:8000/api/v1/")).unwrap();
        assert_eq!(service.base_url(), "http://localhost:8000/api/v1");
    }

    #[test]
    fn test_course_dto_to_course() {
        let dto = CourseDto {
            id: 3,
            title: "Rust".to_string(),
            created_at: Utc::now(),
            display_order: 1,
            all_lessons_completed: false,
            index_json: None,
        };
        let course = Course::from(&dto);
        assert_eq!(course.id, 3);
        assert_eq!(course.display_order, 1);
    }
}
