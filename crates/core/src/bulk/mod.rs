//! Bulk lesson generation orchestration.

mod config;
mod runner;
mod types;

pub use config::BulkConfig;
pub use runner::BulkOrchestrator;
pub use types::{BulkOutcome, BulkProgressCallback, BulkSummary};

use thiserror::Error;

use crate::api::ServiceError;

#[derive(Debug, Error)]
pub enum BulkError {
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}
