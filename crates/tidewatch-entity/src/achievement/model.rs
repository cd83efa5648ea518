//! Achievement catalog entry and unlock record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tidewatch_core::types::{AchievementId, UserId};

use crate::user::UserStats;

/// Counter an achievement threshold is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementMetric {
    /// Reports ever submitted.
    TotalReports,
    /// Verified share of submitted reports.
    VerifiedRatio,
    /// Weather reports submitted.
    WeatherReports,
    /// Current daily streak.
    Streak,
}

impl AchievementMetric {
    /// Current value of this metric for `stats`.
    pub fn value(&self, stats: &UserStats) -> f64 {
        match self {
            Self::TotalReports => f64::from(stats.total_reports),
            Self::VerifiedRatio => stats.verified_ratio(),
            Self::WeatherReports => f64::from(stats.weather_reports),
            Self::Streak => f64::from(stats.streak),
        }
    }
}

/// Unlock rule: `metric >= threshold`, optionally gated on a minimum
/// number of reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    /// Measured counter.
    pub metric: AchievementMetric,
    /// Inclusive lower bound.
    pub threshold: f64,
    /// Reports required before the rule applies at all.
    #[serde(default)]
    pub min_reports: u32,
}

impl Requirement {
    /// Whether `stats` satisfy the rule.
    pub fn is_met(&self, stats: &UserStats) -> bool {
        stats.total_reports >= self.min_reports && self.metric.value(stats) >= self.threshold
    }
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    /// Unique achievement identifier.
    pub id: AchievementId,
    /// Badge key stored on the user, e.g. `first_report`.
    pub key: String,
    /// Display name.
    pub name: String,
    /// What it takes.
    pub description: String,
    /// Points credited on unlock.
    pub points: u64,
    /// Unlock rule.
    pub requirement: Requirement,
}

/// Junction row: which user unlocked which achievement, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAchievement {
    /// The user.
    pub user_id: UserId,
    /// The achievement.
    pub achievement_id: AchievementId,
    /// Badge key.
    pub key: String,
    /// When it was unlocked.
    pub unlocked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_requirement_needs_minimum_reports() {
        let rule = Requirement {
            metric: AchievementMetric::VerifiedRatio,
            threshold: 0.8,
            min_reports: 20,
        };
        let mut stats = UserStats {
            total_reports: 5,
            verified_reports: 5,
            ..Default::default()
        };
        assert!(!rule.is_met(&stats));

        stats.total_reports = 20;
        stats.verified_reports = 16;
        assert!(rule.is_met(&stats));

        stats.verified_reports = 15;
        assert!(!rule.is_met(&stats));
    }
}
