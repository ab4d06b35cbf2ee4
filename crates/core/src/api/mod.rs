//! Remote course service abstraction.
//!
//! The engine never talks to a datastore directly: every read and mutation
//! goes through the `CourseService` trait. The HTTP implementation lives in
//! `http.rs`; tests use `crate::testing::MockCourseService`.

mod http;
mod types;

pub use http::HttpCourseService;
pub use types::*;

use async_trait::async_trait;

/// The remote collaborator that owns courses and lesson artifacts.
///
/// All operations are remote calls and may fail; the engine never assumes
/// success. `generate_lesson` must be idempotent per `(course_id, path)`:
/// if an artifact already exists it is returned unchanged.
#[async_trait]
pub trait CourseService: Send + Sync {
    /// Backend name, for logging.
    fn name(&self) -> &str;

    /// Fetch a course and its parsed curriculum index.
    async fn fetch_course(&self, course_id: CourseId) -> Result<CourseOverview, ServiceError>;

    /// List the generated lessons of a course (sparse: ungenerated paths are absent).
    async fn list_lessons(&self, course_id: CourseId) -> Result<Vec<Lesson>, ServiceError>;

    /// Generate the lesson for a curriculum entry, or return the existing artifact.
    async fn generate_lesson(
        &self,
        course_id: CourseId,
        lesson: &LessonRef,
    ) -> Result<Lesson, ServiceError>;

    /// Fetch a single lesson by id.
    async fn get_lesson(&self, lesson_id: LessonId) -> Result<Lesson, ServiceError>;

    /// Update lesson notes and/or completion flag.
    async fn update_lesson(
        &self,
        lesson_id: LessonId,
        update: UpdateLessonRequest,
    ) -> Result<Lesson, ServiceError>;

    /// Regenerate a lesson's content from user feedback. Not idempotent.
    async fn regenerate_lesson(
        &self,
        lesson_id: LessonId,
        feedback: &str,
    ) -> Result<Lesson, ServiceError>;

    /// Ask the service to generate every missing lesson of a course.
    async fn start_bulk_generation(&self, course_id: CourseId) -> Result<BulkStart, ServiceError>;

    /// Poll the status of an in-flight bulk generation run.
    async fn bulk_generation_status(
        &self,
        course_id: CourseId,
    ) -> Result<BatchGenerationStatus, ServiceError>;

    /// List the user's courses in display order.
    async fn list_courses(&self) -> Result<Vec<Course>, ServiceError>;

    /// Create a course for a topic; the service generates the curriculum index.
    async fn create_course(&self, topic: &str, language: &str) -> Result<Course, ServiceError>;

    /// Persist a full course ordering. The last successful call is authoritative.
    async fn reorder_courses(&self, order: &[CourseId]) -> Result<(), ServiceError>;

    /// Rename a course.
    async fn rename_course(
        &self,
        course_id: CourseId,
        title: &str,
    ) -> Result<Course, ServiceError>;

    /// Delete a course and all its lessons.
    async fn delete_course(&self, course_id: CourseId) -> Result<(), ServiceError>;
}
