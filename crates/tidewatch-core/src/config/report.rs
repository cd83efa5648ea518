//! Report pipeline and gamification configuration.

use serde::{Deserialize, Serialize};

/// Report ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// AI confidence a critical report must exceed to become an alert.
    #[serde(default = "default_escalation_threshold")]
    pub escalation_confidence_threshold: f64,
    /// Geofence radius of an escalated alert, in km.
    #[serde(default = "default_escalation_radius_km")]
    pub escalation_radius_km: f64,
    /// Lifetime of an escalated alert, in hours.
    #[serde(default = "default_escalation_ttl_hours")]
    pub escalation_ttl_hours: i64,
    /// Points per attachment.
    #[serde(default = "default_attachment_points")]
    pub attachment_points: u32,
    /// Bonus credited to the author when a report is verified.
    #[serde(default = "default_verification_bonus")]
    pub verification_bonus: u64,
    /// Bonus credited to the author for each helpful vote.
    #[serde(default = "default_helpful_vote_bonus")]
    pub helpful_vote_bonus: u64,
    /// Maximum attachments per report.
    #[serde(default = "default_max_attachments")]
    pub max_attachments: usize,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            escalation_confidence_threshold: default_escalation_threshold(),
            escalation_radius_km: default_escalation_radius_km(),
            escalation_ttl_hours: default_escalation_ttl_hours(),
            attachment_points: default_attachment_points(),
            verification_bonus: default_verification_bonus(),
            helpful_vote_bonus: default_helpful_vote_bonus(),
            max_attachments: default_max_attachments(),
        }
    }
}

/// Gamification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamificationConfig {
    /// Points credited for every newly unlocked badge.
    #[serde(default = "default_badge_bonus")]
    pub badge_bonus: u64,
}

impl Default for GamificationConfig {
    fn default() -> Self {
        Self {
            badge_bonus: default_badge_bonus(),
        }
    }
}

fn default_escalation_threshold() -> f64 {
    80.0
}

fn default_escalation_radius_km() -> f64 {
    25.0
}

fn default_escalation_ttl_hours() -> i64 {
    12
}

fn default_attachment_points() -> u32 {
    5
}

fn default_verification_bonus() -> u64 {
    25
}

fn default_helpful_vote_bonus() -> u64 {
    2
}

fn default_max_attachments() -> usize {
    10
}

fn default_badge_bonus() -> u64 {
    100
}
