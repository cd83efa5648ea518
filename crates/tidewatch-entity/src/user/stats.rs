//! Gamification counters carried on the user aggregate.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cumulative per-user reward counters.
///
/// These are only mutated inside the user store's per-user critical
/// section so concurrent submissions never lose an update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    /// Cumulative points.
    pub points: u64,
    /// Consecutive reporting days.
    pub streak: u32,
    /// UTC day of the most recent report.
    pub last_report_day: Option<NaiveDate>,
    /// Reports ever submitted.
    pub total_reports: u32,
    /// Reports verified by an expert.
    pub verified_reports: u32,
    /// Reports of the weather type.
    pub weather_reports: u32,
    /// Unlocked badge keys.
    pub badges: BTreeSet<String>,
}

impl UserStats {
    /// Share of reports that were verified, 0.0 when none were submitted.
    pub fn verified_ratio(&self) -> f64 {
        if self.total_reports == 0 {
            return 0.0;
        }
        f64::from(self.verified_reports) / f64::from(self.total_reports)
    }

    /// Whether the badge is already held.
    pub fn has_badge(&self, key: &str) -> bool {
        self.badges.contains(key)
    }
}
