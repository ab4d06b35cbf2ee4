//! End-to-end tests for course collection management.

use std::sync::Arc;

use corso_core::api::Course;
use corso_core::collection::{CollectionCoordinator, CollectionError};
use corso_core::testing::{fixtures, MockCourseService};
use corso_core::ServiceError;

fn coordinator(service: &Arc<MockCourseService>) -> CollectionCoordinator {
    CollectionCoordinator::new(service.clone())
}

fn seed_courses(service: &MockCourseService, titles: &[&str]) -> Vec<Course> {
    titles
        .iter()
        .map(|t| service.add_course_with_index(t, fixtures::sample_index()))
        .collect()
}

#[tokio::test]
async fn test_reorder_persists_and_updates_display_order() {
    let service = Arc::new(MockCourseService::new());
    let mut courses = seed_courses(&service, &["A", "B", "C", "D"]);
    let (a, b, d) = (courses[0].id, courses[1].id, courses[3].id);

    coordinator(&service).reorder(&mut courses, d, b).await.unwrap();

    let titles: Vec<&str> = courses.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "D", "B", "C"]);
    let orders: Vec<i64> = courses.iter().map(|c| c.display_order).collect();
    assert_eq!(orders, vec![0, 1, 2, 3]);

    let payloads = service.reorder_payloads();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0][0], a);
    assert_eq!(payloads[0][1], d);
}

#[tokio::test]
async fn test_reorder_rolls_back_on_persist_failure() {
    let service = Arc::new(MockCourseService::new());
    let mut courses = seed_courses(&service, &["A", "B", "C"]);
    let before: Vec<i64> = courses.iter().map(|c| c.id).collect();
    let (a, c) = (courses[0].id, courses[2].id);

    service.push_error("reorder_courses", ServiceError::Timeout);
    let result = coordinator(&service).reorder(&mut courses, c, a).await;

    assert!(matches!(result, Err(CollectionError::ReorderFailed(_))));
    let after: Vec<i64> = courses.iter().map(|c| c.id).collect();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_reorder_noop_skips_service_call() {
    let service = Arc::new(MockCourseService::new());
    let mut courses = seed_courses(&service, &["A", "B"]);
    let a = courses[0].id;

    coordinator(&service).reorder(&mut courses, a, a).await.unwrap();
    coordinator(&service).reorder(&mut courses, 99, a).await.unwrap();
    assert_eq!(service.call_count("reorder_courses"), 0);
}

#[tokio::test]
async fn test_create_validates_locally() {
    let service = Arc::new(MockCourseService::new());
    let coordinator = coordinator(&service);

    assert!(matches!(
        coordinator.create("  ", "en").await,
        Err(CollectionError::EmptyTopic)
    ));
    assert!(matches!(
        coordinator.create("Rust", "").await,
        Err(CollectionError::EmptyLanguage)
    ));
    assert_eq!(service.call_count("create_course"), 0);

    let course = coordinator.create("Rust", "en").await.unwrap();
    assert_eq!(course.title, "Rust");
}

#[tokio::test]
async fn test_rename_and_delete() {
    let service = Arc::new(MockCourseService::new());
    let courses = seed_courses(&service, &["A", "B"]);
    let coordinator = coordinator(&service);

    assert!(matches!(
        coordinator.rename(courses[0].id, " ").await,
        Err(CollectionError::EmptyTitle)
    ));
    let renamed = coordinator.rename(courses[0].id, "Alpha").await.unwrap();
    assert_eq!(renamed.title, "Alpha");

    coordinator.delete(courses[1].id).await.unwrap();
    let remaining = coordinator.list().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "Alpha");
}
