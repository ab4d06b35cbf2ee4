//! Per-course working session.
//!
//! A `CourseSession` owns everything needed to work on one open course: the
//! course record, its curriculum index, the shared status tracker, and the
//! generation flows bound to them. Dropping the session discards the local
//! state; nothing server-side is affected.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::api::{Course, CourseId, CourseService, CurriculumIndex, Lesson, LessonId, ServiceError};
use crate::bulk::{BulkConfig, BulkError, BulkOrchestrator, BulkOutcome, BulkProgressCallback};
use crate::lesson::{LessonConfig, LessonError, LessonGenerator};
use crate::tracker::{CourseProgress, LessonStatus, SharedTracker};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Path not in curriculum index: {0}")]
    UnknownPath(String),

    #[error(transparent)]
    Lesson(#[from] LessonError),

    #[error(transparent)]
    Bulk(#[from] BulkError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

/// An open course: the unit of work for generation and progress tracking.
pub struct CourseSession {
    service: Arc<dyn CourseService>,
    course: Course,
    index: CurriculumIndex,
    tracker: SharedTracker,
    generator: LessonGenerator,
    bulk: BulkOrchestrator,
    bulk_config: BulkConfig,
}

impl CourseSession {
    /// Open a course: fetch its record and index, then seed the tracker from
    /// the current lesson listing.
    pub async fn open(
        service: Arc<dyn CourseService>,
        course_id: CourseId,
        lesson_config: LessonConfig,
        bulk_config: BulkConfig,
    ) -> Result<Self, SessionError> {
        let overview = service.fetch_course(course_id).await?;
        let lessons = service.list_lessons(course_id).await?;
        let tracker = SharedTracker::from_lessons(&lessons);
        info!(
            course_id,
            total = overview.index.lesson_count(),
            generated = lessons.len(),
            "course session opened"
        );

        let generator = LessonGenerator::new(service.clone(), tracker.clone(), lesson_config);
        let bulk = BulkOrchestrator::new(service.clone(), tracker.clone(), bulk_config.clone());

        Ok(Self {
            service,
            course: overview.course,
            index: overview.index,
            tracker,
            generator,
            bulk,
            bulk_config,
        })
    }

    /// Route bulk status updates to a callback.
    pub fn with_bulk_progress(mut self, callback: BulkProgressCallback) -> Self {
        self.bulk = BulkOrchestrator::new(
            self.service.clone(),
            self.tracker.clone(),
            self.bulk_config.clone(),
        )
        .with_progress_callback(callback);
        self
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn index(&self) -> &CurriculumIndex {
        &self.index
    }

    pub fn generator(&self) -> &LessonGenerator {
        &self.generator
    }

    /// Generate the lesson at a curriculum path.
    ///
    /// The path must exist in this course's index; anything else is rejected
    /// before any service call.
    pub async fn generate_lesson(&self, path: &str) -> Result<Lesson, SessionError> {
        let lesson_ref = self
            .index
            .find(path)
            .ok_or_else(|| SessionError::UnknownPath(path.to_string()))?;
        Ok(self.generator.generate(self.course.id, lesson_ref).await?)
    }

    /// Wait for a generated lesson's derived artifact reference.
    pub async fn watch_derived_artifact(&self, lesson_id: LessonId) -> Option<String> {
        self.generator.watch_derived_artifact(lesson_id).await
    }

    /// Persist notes and completion state for a lesson.
    pub async fn update_progress(
        &self,
        lesson_id: LessonId,
        notes: Option<String>,
        completed: bool,
    ) -> Result<Lesson, SessionError> {
        Ok(self
            .generator
            .update_progress(lesson_id, notes, completed)
            .await?)
    }

    /// Regenerate a lesson from user feedback.
    pub async fn regenerate_lesson(
        &self,
        lesson_id: LessonId,
        feedback: &str,
    ) -> Result<Lesson, SessionError> {
        Ok(self.generator.regenerate(lesson_id, feedback).await?)
    }

    /// Generate every missing lesson and wait for the run to finish.
    pub async fn generate_all(&self) -> Result<BulkOutcome, SessionError> {
        Ok(self.bulk.generate_all(self.course.id).await?)
    }

    pub async fn status_of(&self, path: &str) -> LessonStatus {
        self.tracker.status_of(path).await
    }

    /// Aggregate progress against this course's index.
    pub async fn progress(&self) -> CourseProgress {
        self.tracker.aggregate(&self.index).await
    }

    /// Re-sync the tracker from a fresh lesson listing.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let lessons = self.service.list_lessons(self.course.id).await?;
        self.tracker.rebuild_from(&lessons).await;
        Ok(())
    }
}
