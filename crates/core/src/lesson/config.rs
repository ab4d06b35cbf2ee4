use serde::{Deserialize, Serialize};

/// Tuning for single-lesson generation flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonConfig {
    /// Delay between derived-artifact polls, in milliseconds.
    #[serde(default = "default_derived_poll_interval_ms")]
    pub derived_poll_interval_ms: u64,

    /// Number of derived-artifact polls before giving up.
    #[serde(default = "default_derived_poll_max_attempts")]
    pub derived_poll_max_attempts: u32,
}

fn default_derived_poll_interval_ms() -> u64 {
    500
}

fn default_derived_poll_max_attempts() -> u32 {
    20
}

impl Default for LessonConfig {
    fn default() -> Self {
        Self {
            derived_poll_interval_ms: default_derived_poll_interval_ms(),
            derived_poll_max_attempts: default_derived_poll_max_attempts(),
        }
    }
}
