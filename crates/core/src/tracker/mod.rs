//! Lesson status tracking.
//!
//! The tracker is a path-keyed status map derived entirely from the lesson
//! artifacts the service reports. It never talks to the service itself:
//! callers feed it lessons, it answers status and aggregate questions.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::api::{CurriculumIndex, Lesson};

/// Generation/completion state of one curriculum path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    /// No artifact exists for this path.
    NotGenerated,
    /// An artifact exists but the user has not marked it done.
    Generated,
    /// An artifact exists and the user marked it done.
    Completed,
}

impl LessonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonStatus::NotGenerated => "not_generated",
            LessonStatus::Generated => "generated",
            LessonStatus::Completed => "completed",
        }
    }

    /// Status implied by a lesson artifact's completion flag.
    pub fn from_lesson(lesson: &Lesson) -> Self {
        if lesson.is_completed {
            LessonStatus::Completed
        } else {
            LessonStatus::Generated
        }
    }

    /// Whether an artifact exists for this status.
    pub fn is_generated(&self) -> bool {
        !matches!(self, LessonStatus::NotGenerated)
    }
}

/// Aggregate progress of a course against its curriculum index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CourseProgress {
    pub total_lessons: usize,
    pub generated_count: usize,
    pub completed_count: usize,
}

impl CourseProgress {
    pub fn all_generated(&self) -> bool {
        self.generated_count == self.total_lessons
    }

    pub fn all_completed(&self) -> bool {
        self.completed_count == self.total_lessons
    }
}

/// Path-keyed status map for one course.
///
/// Paths absent from the map are `NotGenerated`; only artifacts are stored.
#[derive(Debug, Default)]
pub struct LessonTracker {
    statuses: HashMap<String, LessonStatus>,
}

impl LessonTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a tracker from a lesson listing.
    pub fn from_lessons(lessons: &[Lesson]) -> Self {
        let mut tracker = Self::new();
        tracker.rebuild(lessons);
        tracker
    }

    /// Replace the whole map from a fresh lesson listing. Paths no longer
    /// present in the listing revert to `NotGenerated`.
    pub fn rebuild(&mut self, lessons: &[Lesson]) {
        self.statuses = lessons
            .iter()
            .map(|l| (l.path_in_index.clone(), LessonStatus::from_lesson(l)))
            .collect();
    }

    /// Record the status implied by a single artifact.
    pub fn update(&mut self, lesson: &Lesson) {
        self.statuses
            .insert(lesson.path_in_index.clone(), LessonStatus::from_lesson(lesson));
    }

    pub fn status_of(&self, path: &str) -> LessonStatus {
        self.statuses
            .get(path)
            .copied()
            .unwrap_or(LessonStatus::NotGenerated)
    }

    /// Number of tracked artifacts (generated or completed paths).
    pub fn tracked_count(&self) -> usize {
        self.statuses.len()
    }

    /// Aggregate progress against a curriculum index. Tracked paths that are
    /// not in the index are ignored; index paths with no artifact count as
    /// not generated.
    pub fn aggregate(&self, index: &CurriculumIndex) -> CourseProgress {
        let mut generated = 0;
        let mut completed = 0;
        for lesson in index.lesson_refs() {
            match self.status_of(&lesson.path) {
                LessonStatus::NotGenerated => {}
                LessonStatus::Generated => generated += 1,
                LessonStatus::Completed => {
                    generated += 1;
                    completed += 1;
                }
            }
        }
        CourseProgress {
            total_lessons: index.lesson_count(),
            generated_count: generated,
            completed_count: completed,
        }
    }
}

/// Clonable handle to a tracker shared across concurrent generation flows.
#[derive(Debug, Clone, Default)]
pub struct SharedTracker {
    inner: Arc<RwLock<LessonTracker>>,
}

impl SharedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lessons(lessons: &[Lesson]) -> Self {
        Self {
            inner: Arc::new(RwLock::new(LessonTracker::from_lessons(lessons))),
        }
    }

    pub async fn update(&self, lesson: &Lesson) {
        self.inner.write().await.update(lesson);
    }

    pub async fn rebuild_from(&self, lessons: &[Lesson]) {
        self.inner.write().await.rebuild(lessons);
    }

    pub async fn status_of(&self, path: &str) -> LessonStatus {
        self.inner.read().await.status_of(path)
    }

    pub async fn tracked_count(&self) -> usize {
        self.inner.read().await.tracked_count()
    }

    pub async fn aggregate(&self, index: &CurriculumIndex) -> CourseProgress {
        self.inner.read().await.aggregate(index)
    }

    /// Snapshot of the current path→status map.
    pub async fn snapshot(&self) -> HashMap<String, LessonStatus> {
        self.inner.read().await.statuses.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_status_defaults_to_not_generated() {
        let tracker = LessonTracker::new();
        assert_eq!(tracker.status_of("m1/l1"), LessonStatus::NotGenerated);
        assert_eq!(tracker.tracked_count(), 0);
    }

    #[test]
    fn test_from_lessons_maps_completion_flag() {
        let lessons = vec![
            fixtures::lesson(1, 1, "m1/l1", false),
            fixtures::lesson(2, 1, "m1/l2", true),
        ];
        let tracker = LessonTracker::from_lessons(&lessons);
        assert_eq!(tracker.status_of("m1/l1"), LessonStatus::Generated);
        assert_eq!(tracker.status_of("m1/l2"), LessonStatus::Completed);
        assert_eq!(tracker.status_of("m2/l1"), LessonStatus::NotGenerated);
    }

    #[test]
    fn test_rebuild_forgets_stale_paths() {
        let mut tracker =
            LessonTracker::from_lessons(&[fixtures::lesson(1, 1, "m1/l1", false)]);
        tracker.rebuild(&[fixtures::lesson(2, 1, "m1/l2", true)]);
        assert_eq!(tracker.status_of("m1/l1"), LessonStatus::NotGenerated);
        assert_eq!(tracker.status_of("m1/l2"), LessonStatus::Completed);
        assert_eq!(tracker.tracked_count(), 1);
    }

    #[test]
    fn test_update_transitions_completed_to_generated() {
        let mut tracker = LessonTracker::new();
        tracker.update(&fixtures::lesson(1, 1, "m1/l1", true));
        assert_eq!(tracker.status_of("m1/l1"), LessonStatus::Completed);
        tracker.update(&fixtures::lesson(1, 1, "m1/l1", false));
        assert_eq!(tracker.status_of("m1/l1"), LessonStatus::Generated);
    }

    #[test]
    fn test_aggregate_intersects_with_index() {
        let index = fixtures::sample_index();
        let mut tracker = LessonTracker::new();
        tracker.update(&fixtures::lesson(1, 1, "m1/l1", false));
        tracker.update(&fixtures::lesson(2, 1, "m1/l2", true));
        // Not in the index; must not count.
        tracker.update(&fixtures::lesson(3, 1, "zz/orphan", true));

        let progress = tracker.aggregate(&index);
        assert_eq!(progress.total_lessons, 5);
        assert_eq!(progress.generated_count, 2);
        assert_eq!(progress.completed_count, 1);
        assert!(!progress.all_generated());
    }

    #[tokio::test]
    async fn test_shared_tracker_concurrent_handles() {
        let tracker = SharedTracker::new();
        let other = tracker.clone();
        other.update(&fixtures::lesson(1, 1, "m1/l1", false)).await;
        assert_eq!(tracker.status_of("m1/l1").await, LessonStatus::Generated);
        assert_eq!(tracker.tracked_count().await, 1);
    }
}
