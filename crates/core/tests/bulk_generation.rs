//! End-to-end tests for bulk generation orchestration.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use corso_core::api::{BatchGenerationStatus, GenerationFailure};
use corso_core::bulk::{BulkConfig, BulkError, BulkOrchestrator, BulkOutcome};
use corso_core::testing::{fixtures, MockCourseService};
use corso_core::tracker::SharedTracker;
use corso_core::ServiceError;

fn fast_config() -> BulkConfig {
    BulkConfig {
        status_poll_interval_ms: 5,
    }
}

fn status(completed: u32, failed: u32, in_progress: bool) -> BatchGenerationStatus {
    BatchGenerationStatus {
        total: 5,
        completed,
        failed,
        in_progress,
        errors: vec![],
    }
}

#[tokio::test]
async fn test_nothing_to_do_when_all_lessons_exist() {
    let service = Arc::new(MockCourseService::new());
    let course = service.add_course_with_index("Rust", fixtures::sample_index());
    for path in ["m1/l1", "m1/l2", "m1/l3", "m2/l1", "m2/l2"] {
        service.add_lesson(course.id, path, false);
    }

    let orchestrator =
        BulkOrchestrator::new(service.clone(), SharedTracker::new(), fast_config());
    let outcome = orchestrator.generate_all(course.id).await.unwrap();
    assert!(matches!(outcome, BulkOutcome::NothingToDo));
    // No polling happened.
    assert_eq!(service.call_count("bulk_generation_status"), 0);
}

#[tokio::test]
async fn test_run_completes_with_partial_failures() {
    let service = Arc::new(MockCourseService::new());
    let course = service.add_course_with_index("Rust", fixtures::sample_index());
    service.push_status(status(2, 0, true));
    service.push_status(BatchGenerationStatus {
        total: 5,
        completed: 4,
        failed: 1,
        in_progress: false,
        errors: vec![GenerationFailure {
            path: "m2/l2".to_string(),
            message: "model refused".to_string(),
        }],
    });

    let tracker = SharedTracker::new();
    let orchestrator = BulkOrchestrator::new(service.clone(), tracker.clone(), fast_config());
    let outcome = orchestrator.generate_all(course.id).await.unwrap();

    let BulkOutcome::Completed(summary) = outcome else {
        panic!("expected a completed run");
    };
    assert_eq!(summary.completed, 4);
    assert_eq!(summary.failed, 1);
    assert!(!summary.fully_successful());
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].path, "m2/l2");

    // Tracker was rebuilt from the listing: the four generated lessons are
    // tracked, the failed one is not.
    assert_eq!(tracker.tracked_count().await, 4);
}

#[tokio::test]
async fn test_tracker_rebuilt_every_tick() {
    let service = Arc::new(MockCourseService::new());
    let course = service.add_course_with_index("Rust", fixtures::sample_index());
    service.push_status(status(1, 0, true));
    service.push_status(status(3, 0, true));
    service.push_status(status(5, 0, false));

    let orchestrator =
        BulkOrchestrator::new(service.clone(), SharedTracker::new(), fast_config());
    orchestrator.generate_all(course.id).await.unwrap();

    // One listing per status poll.
    assert_eq!(service.call_count("bulk_generation_status"), 3);
    assert_eq!(service.call_count("list_lessons"), 3);
}

#[tokio::test]
async fn test_progress_callback_sees_every_status() {
    let service = Arc::new(MockCourseService::new());
    let course = service.add_course_with_index("Rust", fixtures::sample_index());
    service.push_status(status(2, 0, true));
    service.push_status(status(5, 0, false));

    let ticks = Arc::new(AtomicUsize::new(0));
    let last_completed = Arc::new(AtomicUsize::new(0));
    let callback = {
        let ticks = ticks.clone();
        let last_completed = last_completed.clone();
        Arc::new(move |s: &BatchGenerationStatus| {
            ticks.fetch_add(1, Ordering::SeqCst);
            last_completed.store(s.completed as usize, Ordering::SeqCst);
        })
    };

    let orchestrator = BulkOrchestrator::new(service.clone(), SharedTracker::new(), fast_config())
        .with_progress_callback(callback);
    orchestrator.generate_all(course.id).await.unwrap();

    assert_eq!(ticks.load(Ordering::SeqCst), 2);
    assert_eq!(last_completed.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_status_poll_failure_aborts_run() {
    let service = Arc::new(MockCourseService::new());
    let course = service.add_course_with_index("Rust", fixtures::sample_index());
    service.push_error("bulk_generation_status", ServiceError::Timeout);

    let orchestrator =
        BulkOrchestrator::new(service.clone(), SharedTracker::new(), fast_config());
    let result = orchestrator.generate_all(course.id).await;
    assert!(matches!(
        result,
        Err(BulkError::Service(ServiceError::Timeout))
    ));
}

#[tokio::test]
async fn test_start_failure_aborts_run() {
    let service = Arc::new(MockCourseService::new());
    let course = service.add_course_with_index("Rust", fixtures::sample_index());
    service.push_error(
        "start_bulk_generation",
        ServiceError::Api("oversubscribed".to_string()),
    );

    let orchestrator =
        BulkOrchestrator::new(service.clone(), SharedTracker::new(), fast_config());
    assert!(orchestrator.generate_all(course.id).await.is_err());
    assert_eq!(service.call_count("bulk_generation_status"), 0);
}

#[tokio::test]
async fn test_listing_failure_keeps_run_alive() {
    let service = Arc::new(MockCourseService::new());
    let course = service.add_course_with_index("Rust", fixtures::sample_index());
    service.push_status(status(2, 0, true));
    service.push_status(status(5, 0, false));
    // First rebuild fails; the run continues and the next tick catches up.
    service.push_error("list_lessons", ServiceError::Timeout);

    let tracker = SharedTracker::new();
    let orchestrator = BulkOrchestrator::new(service.clone(), tracker.clone(), fast_config());
    let outcome = orchestrator.generate_all(course.id).await.unwrap();

    assert!(matches!(outcome, BulkOutcome::Completed(_)));
    assert_eq!(tracker.tracked_count().await, 5);
}
