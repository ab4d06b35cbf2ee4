use std::sync::Arc;

use serde::Serialize;

use crate::api::{BatchGenerationStatus, GenerationFailure};

/// Called after every status poll with the latest server-side status.
pub type BulkProgressCallback = Arc<dyn Fn(&BatchGenerationStatus) + Send + Sync>;

/// How a bulk run ended.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BulkOutcome {
    /// Every lesson already had an artifact; no run was started.
    NothingToDo,
    /// The server-side run finished. Per-lesson failures are in the summary;
    /// they do not make the run itself a failure.
    Completed(BulkSummary),
}

/// Terminal state of a finished bulk run.
#[derive(Debug, Clone, Serialize)]
pub struct BulkSummary {
    pub total: u32,
    pub completed: u32,
    pub failed: u32,
    pub errors: Vec<GenerationFailure>,
}

impl BulkSummary {
    pub fn from_status(status: &BatchGenerationStatus) -> Self {
        Self {
            total: status.total,
            completed: status.completed,
            failed: status.failed,
            errors: status.errors.clone(),
        }
    }

    pub fn fully_successful(&self) -> bool {
        self.failed == 0
    }
}
