//! Scoring oracle configuration.

use serde::{Deserialize, Serialize};

/// Which scoring oracle backs report analysis and threat sweeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Provider: `"heuristic"` or `"http"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Base URL of the remote AI service (http provider only).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Time budget for one oracle call, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Minimum threat score for the heuristic sweep to emit an alert.
    #[serde(default = "default_alert_threshold")]
    pub alert_threat_threshold: u32,
    /// Geofence radius of sweep-generated alerts, in km.
    #[serde(default = "default_sweep_radius_km")]
    pub sweep_alert_radius_km: f64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            alert_threat_threshold: default_alert_threshold(),
            sweep_alert_radius_km: default_sweep_radius_km(),
        }
    }
}

fn default_provider() -> String {
    "heuristic".to_string()
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_alert_threshold() -> u32 {
    60
}

fn default_sweep_radius_km() -> f64 {
    50.0
}
