//! Single-lesson generation flows.

mod config;
mod generator;

pub use config::LessonConfig;
pub use generator::LessonGenerator;

use thiserror::Error;

use crate::api::ServiceError;

#[derive(Debug, Error)]
pub enum LessonError {
    #[error("Regeneration feedback must not be empty")]
    EmptyFeedback,

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}
