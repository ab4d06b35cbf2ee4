//! Course collection management: listing, creation, rename, delete, and
//! drag-reorder with optimistic local state and rollback.

mod order;

pub use order::moved_order;

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::api::{Course, CourseId, CourseService, ServiceError};
use crate::metrics;

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("Course topic must not be empty")]
    EmptyTopic,

    #[error("Course language must not be empty")]
    EmptyLanguage,

    #[error("Course title must not be empty")]
    EmptyTitle,

    /// Persisting a reorder failed; the local ordering was rolled back.
    #[error("Reorder rejected by service, ordering rolled back: {0}")]
    ReorderFailed(#[source] ServiceError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

/// Coordinates mutations of the course collection.
pub struct CollectionCoordinator {
    service: Arc<dyn CourseService>,
}

impl CollectionCoordinator {
    pub fn new(service: Arc<dyn CourseService>) -> Self {
        Self { service }
    }

    pub async fn list(&self) -> Result<Vec<Course>, CollectionError> {
        Ok(self.service.list_courses().await?)
    }

    /// Create a course. Topic and language are validated locally first.
    pub async fn create(&self, topic: &str, language: &str) -> Result<Course, CollectionError> {
        if topic.trim().is_empty() {
            return Err(CollectionError::EmptyTopic);
        }
        if language.trim().is_empty() {
            return Err(CollectionError::EmptyLanguage);
        }
        let course = self.service.create_course(topic, language).await?;
        info!(course_id = course.id, "course created");
        Ok(course)
    }

    pub async fn rename(
        &self,
        course_id: CourseId,
        title: &str,
    ) -> Result<Course, CollectionError> {
        if title.trim().is_empty() {
            return Err(CollectionError::EmptyTitle);
        }
        Ok(self.service.rename_course(course_id, title).await?)
    }

    pub async fn delete(&self, course_id: CourseId) -> Result<(), CollectionError> {
        self.service.delete_course(course_id).await?;
        info!(course_id, "course deleted");
        Ok(())
    }

    /// Move `moved_id` to the slot currently held by `target_id`, updating
    /// `courses` in place optimistically and persisting the new order.
    ///
    /// If persistence fails, `courses` is restored to its pre-call state and
    /// `ReorderFailed` is returned. A no-op move (unknown ids, or moving a
    /// course onto itself) returns without any service call.
    pub async fn reorder(
        &self,
        courses: &mut Vec<Course>,
        moved_id: CourseId,
        target_id: CourseId,
    ) -> Result<(), CollectionError> {
        let current: Vec<CourseId> = courses.iter().map(|c| c.id).collect();
        let Some(new_order) = moved_order(&current, moved_id, target_id) else {
            return Ok(());
        };

        let snapshot = courses.clone();

        // Optimistic: reorder the local list before the service confirms.
        // Every id in new_order comes from `courses`, so nothing is dropped.
        let reordered: Vec<Course> = new_order
            .iter()
            .filter_map(|id| courses.iter().find(|c| c.id == *id).cloned())
            .collect();
        *courses = reordered;

        match self.service.reorder_courses(&new_order).await {
            Ok(()) => {
                for (idx, course) in courses.iter_mut().enumerate() {
                    course.display_order = idx as i64;
                }
                info!(moved_id, target_id, "course order persisted");
                Ok(())
            }
            Err(e) => {
                warn!(moved_id, target_id, error = %e, "reorder failed, rolling back");
                *courses = snapshot;
                metrics::REORDER_ROLLBACKS.inc();
                Err(CollectionError::ReorderFailed(e))
            }
        }
    }
}
