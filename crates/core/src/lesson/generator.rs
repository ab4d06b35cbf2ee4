use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::{CourseId, CourseService, Lesson, LessonId, LessonRef, UpdateLessonRequest};
use crate::lesson::{LessonConfig, LessonError};
use crate::metrics;
use crate::tracker::SharedTracker;

/// Drives single-lesson operations against the service and keeps the shared
/// tracker in sync with their outcomes.
pub struct LessonGenerator {
    service: Arc<dyn CourseService>,
    tracker: SharedTracker,
    config: LessonConfig,
}

impl LessonGenerator {
    pub fn new(
        service: Arc<dyn CourseService>,
        tracker: SharedTracker,
        config: LessonConfig,
    ) -> Self {
        Self {
            service,
            tracker,
            config,
        }
    }

    /// Generate the artifact for one curriculum entry.
    ///
    /// The service call is idempotent per `(course_id, path)`; an existing
    /// artifact comes back unchanged. The tracker is only touched on success,
    /// so a failed call leaves the path's status as it was.
    pub async fn generate(
        &self,
        course_id: CourseId,
        lesson_ref: &LessonRef,
    ) -> Result<Lesson, LessonError> {
        info!(course_id, path = %lesson_ref.path, "generating lesson");
        let lesson = match self.service.generate_lesson(course_id, lesson_ref).await {
            Ok(lesson) => lesson,
            Err(e) => {
                metrics::LESSON_GENERATIONS
                    .with_label_values(&["failure"])
                    .inc();
                return Err(e.into());
            }
        };
        metrics::LESSON_GENERATIONS
            .with_label_values(&["success"])
            .inc();
        self.tracker.update(&lesson).await;
        Ok(lesson)
    }

    /// Wait for a lesson's derived artifact reference to appear.
    ///
    /// Polls `get_lesson` on a fixed interval up to the configured number of
    /// attempts. Exhaustion is not an error: the artifact is a nice-to-have
    /// and callers proceed without it. A fetch error likewise stops the
    /// watch quietly; only a warning is logged.
    pub async fn watch_derived_artifact(&self, lesson_id: LessonId) -> Option<String> {
        let interval = Duration::from_millis(self.config.derived_poll_interval_ms);
        for attempt in 1..=self.config.derived_poll_max_attempts {
            tokio::time::sleep(interval).await;
            match self.service.get_lesson(lesson_id).await {
                Ok(lesson) => {
                    if let Some(path) = lesson.pdf_path {
                        debug!(lesson_id, attempt, "derived artifact ready");
                        metrics::DERIVED_ARTIFACT_POLLS
                            .with_label_values(&["ready"])
                            .inc();
                        return Some(path);
                    }
                }
                Err(e) => {
                    warn!(lesson_id, attempt, error = %e, "derived artifact poll failed, giving up");
                    metrics::DERIVED_ARTIFACT_POLLS
                        .with_label_values(&["error"])
                        .inc();
                    return None;
                }
            }
        }
        debug!(
            lesson_id,
            attempts = self.config.derived_poll_max_attempts,
            "derived artifact not ready, giving up"
        );
        metrics::DERIVED_ARTIFACT_POLLS
            .with_label_values(&["exhausted"])
            .inc();
        None
    }

    /// Persist notes and completion state for a lesson.
    ///
    /// `completed` is always sent explicitly; `notes` of `None` leaves the
    /// stored notes untouched.
    pub async fn update_progress(
        &self,
        lesson_id: LessonId,
        notes: Option<String>,
        completed: bool,
    ) -> Result<Lesson, LessonError> {
        let update = UpdateLessonRequest {
            user_notes: notes,
            is_completed: Some(completed),
        };
        let lesson = self.service.update_lesson(lesson_id, update).await?;
        self.tracker.update(&lesson).await;
        Ok(lesson)
    }

    /// Regenerate a lesson's content from user feedback.
    ///
    /// Feedback is validated locally first: a blank string never reaches the
    /// service.
    pub async fn regenerate(
        &self,
        lesson_id: LessonId,
        feedback: &str,
    ) -> Result<Lesson, LessonError> {
        if feedback.trim().is_empty() {
            return Err(LessonError::EmptyFeedback);
        }
        info!(lesson_id, "regenerating lesson");
        let lesson = match self.service.regenerate_lesson(lesson_id, feedback).await {
            Ok(lesson) => lesson,
            Err(e) => {
                metrics::LESSON_REGENERATIONS
                    .with_label_values(&["failure"])
                    .inc();
                return Err(e.into());
            }
        };
        metrics::LESSON_REGENERATIONS
            .with_label_values(&["success"])
            .inc();
        self.tracker.update(&lesson).await;
        Ok(lesson)
    }

    pub fn tracker(&self) -> &SharedTracker {
        &self.tracker
    }
}
