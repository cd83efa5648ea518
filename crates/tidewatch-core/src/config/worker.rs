//! Scheduled job configuration.

use serde::{Deserialize, Serialize};

/// Cron driver for the threat sweep and daily digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the cron scheduler is started.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression for the global threat sweep.
    #[serde(default = "default_sweep_schedule")]
    pub threat_sweep_schedule: String,
    /// Cron expression for the daily digest.
    #[serde(default = "default_digest_schedule")]
    pub daily_digest_schedule: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            threat_sweep_schedule: default_sweep_schedule(),
            daily_digest_schedule: default_digest_schedule(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sweep_schedule() -> String {
    "0 */15 * * * *".to_string()
}

fn default_digest_schedule() -> String {
    "0 0 7 * * *".to_string()
}
