//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Single-lesson generation (generations, regenerations, derived-artifact polls)
//! - Bulk generation runs
//! - Course collection reordering

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts};

// =============================================================================
// Lesson generation
// =============================================================================

/// Lesson generation attempts total by result.
pub static LESSON_GENERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "corso_lesson_generations_total",
            "Total single-lesson generation attempts",
        ),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

/// Lesson regeneration attempts total by result.
pub static LESSON_REGENERATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "corso_lesson_regenerations_total",
            "Total lesson regeneration attempts",
        ),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

/// Derived-artifact watches total by outcome.
pub static DERIVED_ARTIFACT_POLLS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "corso_derived_artifact_watches_total",
            "Total derived-artifact watch outcomes",
        ),
        &["outcome"], // "ready", "exhausted", "error"
    )
    .unwrap()
});

// =============================================================================
// Bulk generation
// =============================================================================

/// Bulk generation runs total by outcome.
pub static BULK_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("corso_bulk_runs_total", "Total bulk generation runs"),
        &["outcome"], // "nothing_to_do", "completed", "completed_with_failures", "start_failed", "poll_failed"
    )
    .unwrap()
});

/// Bulk status poll ticks total.
pub static BULK_POLL_TICKS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "corso_bulk_poll_ticks_total",
        "Total bulk generation status polls",
    )
    .unwrap()
});

// =============================================================================
// Collection
// =============================================================================

/// Reorder rollbacks total.
pub static REORDER_ROLLBACKS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "corso_reorder_rollbacks_total",
        "Total course reorderings rolled back after a persist failure",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(LESSON_GENERATIONS.clone()),
        Box::new(LESSON_REGENERATIONS.clone()),
        Box::new(DERIVED_ARTIFACT_POLLS.clone()),
        Box::new(BULK_RUNS.clone()),
        Box::new(BULK_POLL_TICKS.clone()),
        Box::new(REORDER_ROLLBACKS.clone()),
    ]
}
