//! The built-in achievement catalog.

use tidewatch_core::types::AchievementId;
use tidewatch_entity::achievement::{Achievement, AchievementMetric, Requirement};

/// Every built-in badge, each worth `points`.
pub fn default_catalog(points: u64) -> Vec<Achievement> {
    let entry = |key: &str, name: &str, description: &str, requirement: Requirement| Achievement {
        id: AchievementId::new(),
        key: key.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        points,
        requirement,
    };
    let rule = |metric, threshold, min_reports| Requirement {
        metric,
        threshold,
        min_reports,
    };

    vec![
        entry(
            "first_report",
            "First Report",
            "Submitted a first community report",
            rule(AchievementMetric::TotalReports, 1.0, 0),
        ),
        entry(
            "reporter_10",
            "Active Reporter",
            "Submitted 10 reports",
            rule(AchievementMetric::TotalReports, 10.0, 0),
        ),
        entry(
            "reporter_50",
            "Coastal Sentinel",
            "Submitted 50 reports",
            rule(AchievementMetric::TotalReports, 50.0, 0),
        ),
        entry(
            "accurate_reporter",
            "Accurate Reporter",
            "At least 80% of 20 or more reports verified",
            rule(AchievementMetric::VerifiedRatio, 0.8, 20),
        ),
        entry(
            "weather_watcher",
            "Weather Watcher",
            "Submitted 10 weather reports",
            rule(AchievementMetric::WeatherReports, 10.0, 0),
        ),
        entry(
            "streak_30",
            "Month of Vigilance",
            "Reported on 30 consecutive days",
            rule(AchievementMetric::Streak, 30.0, 0),
        ),
    ]
}
