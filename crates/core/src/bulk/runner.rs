use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::{CourseId, CourseService};
use crate::bulk::{BulkConfig, BulkError, BulkOutcome, BulkProgressCallback, BulkSummary};
use crate::metrics;
use crate::tracker::SharedTracker;

/// Drives a server-side bulk generation run to completion.
///
/// The orchestrator starts the run, then polls status on a fixed interval.
/// After every poll it rebuilds the shared tracker from a fresh lesson
/// listing, so observers see lessons appear as the server finishes them.
/// Cancellation is dropping the `generate_all` future; the server-side run
/// keeps going and a later call observes whatever state it reached.
pub struct BulkOrchestrator {
    service: Arc<dyn CourseService>,
    tracker: SharedTracker,
    config: BulkConfig,
    progress_callback: Option<BulkProgressCallback>,
}

impl BulkOrchestrator {
    pub fn new(
        service: Arc<dyn CourseService>,
        tracker: SharedTracker,
        config: BulkConfig,
    ) -> Self {
        Self {
            service,
            tracker,
            config,
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: BulkProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Generate every missing lesson of a course and wait for the run to end.
    ///
    /// Per-lesson failures terminate the run successfully; they are reported
    /// in the summary. Only a failed start or a failed status poll aborts
    /// with an error.
    pub async fn generate_all(&self, course_id: CourseId) -> Result<BulkOutcome, BulkError> {
        let start = match self.service.start_bulk_generation(course_id).await {
            Ok(start) => start,
            Err(e) => {
                metrics::BULK_RUNS.with_label_values(&["start_failed"]).inc();
                return Err(e.into());
            }
        };

        if start.to_generate == 0 {
            info!(course_id, "bulk generation: nothing to do");
            metrics::BULK_RUNS.with_label_values(&["nothing_to_do"]).inc();
            return Ok(BulkOutcome::NothingToDo);
        }
        info!(
            course_id,
            to_generate = start.to_generate,
            "bulk generation started"
        );

        let interval = Duration::from_millis(self.config.status_poll_interval_ms);
        let mut last_done: u32 = 0;
        loop {
            tokio::time::sleep(interval).await;

            let status = match self.service.bulk_generation_status(course_id).await {
                Ok(status) => status,
                Err(e) => {
                    warn!(course_id, error = %e, "bulk status poll failed, aborting run");
                    metrics::BULK_RUNS.with_label_values(&["poll_failed"]).inc();
                    return Err(e.into());
                }
            };
            metrics::BULK_POLL_TICKS.inc();

            let done = status.completed + status.failed;
            if done < last_done {
                warn!(
                    course_id,
                    done, last_done, "bulk status went backwards, server restarted the run?"
                );
            }
            last_done = done;

            // Full rebuild per tick: the listing is the source of truth for
            // which artifacts exist now.
            match self.service.list_lessons(course_id).await {
                Ok(lessons) => self.tracker.rebuild_from(&lessons).await,
                Err(e) => {
                    warn!(course_id, error = %e, "lesson listing failed, keeping stale tracker");
                }
            }

            if let Some(ref callback) = self.progress_callback {
                callback(&status);
            }

            debug!(
                course_id,
                completed = status.completed,
                failed = status.failed,
                total = status.total,
                in_progress = status.in_progress,
                "bulk status"
            );

            if !status.in_progress {
                let summary = BulkSummary::from_status(&status);
                info!(
                    course_id,
                    completed = summary.completed,
                    failed = summary.failed,
                    "bulk generation finished"
                );
                let outcome = if summary.fully_successful() {
                    "completed"
                } else {
                    "completed_with_failures"
                };
                metrics::BULK_RUNS.with_label_values(&[outcome]).inc();
                return Ok(BulkOutcome::Completed(summary));
            }
        }
    }
}
