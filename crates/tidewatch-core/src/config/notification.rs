//! Notification dispatch configuration.

use serde::{Deserialize, Serialize};

/// Settings for multi-channel notification delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Recipients per bulk batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Pause between consecutive bulk batches, in milliseconds.
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    /// Time budget for a single gateway call, in milliseconds.
    #[serde(default = "default_channel_timeout_ms")]
    pub channel_timeout_ms: u64,
    /// Lowest priority for which SMS is attempted (`low`, `normal`, `high`,
    /// `emergency`). Emergency sends ignore this rule.
    #[serde(default = "default_sms_min_priority")]
    pub sms_min_priority: String,
    /// Radius around a report whose residents hear about it, in km.
    #[serde(default = "default_community_radius_km")]
    pub community_radius_km: f64,
    /// Radius used to gather alerts for the daily digest, in km.
    #[serde(default = "default_digest_radius_km")]
    pub digest_radius_km: f64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            channel_timeout_ms: default_channel_timeout_ms(),
            sms_min_priority: default_sms_min_priority(),
            community_radius_km: default_community_radius_km(),
            digest_radius_km: default_digest_radius_km(),
        }
    }
}

fn default_batch_size() -> usize {
    100
}

fn default_batch_delay_ms() -> u64 {
    1000
}

fn default_channel_timeout_ms() -> u64 {
    5000
}

fn default_sms_min_priority() -> String {
    "high".to_string()
}

fn default_community_radius_km() -> f64 {
    10.0
}

fn default_digest_radius_km() -> f64 {
    50.0
}
