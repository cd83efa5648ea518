//! Pure reward rules over per-user counters.
//!
//! Nothing here touches storage. The service applies these functions inside
//! a single per-user update so that concurrent reports never lose an award.

use chrono::NaiveDate;

use tidewatch_entity::Severity;
use tidewatch_entity::achievement::Achievement;
use tidewatch_entity::report::ReportType;
use tidewatch_entity::user::UserStats;

/// Base points for a report type.
pub fn base_points(report_type: ReportType) -> u64 {
    match report_type {
        ReportType::Weather => 25,
        ReportType::Flood => 30,
        ReportType::Tsunami => 40,
        ReportType::StormSurge => 35,
        ReportType::Pollution => 20,
        ReportType::Erosion => 15,
        ReportType::Infrastructure => 20,
        ReportType::Other => 10,
    }
}

/// Severity multiplier in tenths: low 1.0, medium 1.2, high 1.5, critical 2.0.
fn multiplier_tenths(severity: Severity) -> u64 {
    match severity {
        Severity::Low => 10,
        Severity::Medium => 12,
        Severity::High => 15,
        Severity::Critical => 20,
    }
}

/// `floor((base + per_attachment * attachments) * multiplier)`.
pub fn report_points(
    report_type: ReportType,
    severity: Severity,
    attachments: usize,
    per_attachment: u64,
) -> u64 {
    let raw = base_points(report_type) + per_attachment * attachments as u64;
    raw * multiplier_tenths(severity) / 10
}

/// Advance the daily streak for a report made on `today`.
///
/// A report the day after the last one extends the streak, a report after a
/// gap restarts it at 1, and further reports on the same day change nothing.
pub fn advance_streak(stats: &mut UserStats, today: NaiveDate) {
    match stats.last_report_day {
        Some(last) if last == today => return,
        Some(last) if last.succ_opt() == Some(today) => stats.streak += 1,
        Some(last) if last > today => return,
        _ => stats.streak = 1,
    }
    stats.last_report_day = Some(today);
}

/// Count a new report on `today`.
pub fn record_report(stats: &mut UserStats, report_type: ReportType, today: NaiveDate) {
    stats.total_reports += 1;
    if report_type == ReportType::Weather {
        stats.weather_reports += 1;
    }
    advance_streak(stats, today);
}

/// Catalog entries the counters qualify for that are not held yet.
pub fn newly_qualified<'a>(stats: &UserStats, catalog: &'a [Achievement]) -> Vec<&'a Achievement> {
    catalog
        .iter()
        .filter(|a| !stats.has_badge(&a.key) && a.requirement.is_met(stats))
        .collect()
}

/// Grant every newly qualifying badge: add it to the set and credit its
/// points. Returns what was granted. Running it again with unchanged
/// counters grants nothing.
pub fn unlock_badges(stats: &mut UserStats, catalog: &[Achievement]) -> Vec<Achievement> {
    let granted: Vec<Achievement> = newly_qualified(stats, catalog)
        .into_iter()
        .cloned()
        .collect();
    for achievement in &granted {
        stats.badges.insert(achievement.key.clone());
        stats.points += achievement.points;
    }
    granted
}
