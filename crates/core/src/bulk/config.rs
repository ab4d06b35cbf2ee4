use serde::{Deserialize, Serialize};

/// Tuning for bulk generation runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkConfig {
    /// Delay between status polls, in milliseconds.
    #[serde(default = "default_status_poll_interval_ms")]
    pub status_poll_interval_ms: u64,
}

fn default_status_poll_interval_ms() -> u64 {
    2000
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            status_poll_interval_ms: default_status_poll_interval_ms(),
        }
    }
}
