//! When and how a report becomes an alert.

use tidewatch_core::config::report::ReportsConfig;
use tidewatch_entity::Severity;
use tidewatch_entity::alert::{CreateAlert, ThreatType};
use tidewatch_entity::report::{AiAnalysis, Report, ReportType};

/// Critical reports whose analysis confidence strictly exceeds the threshold
/// escalate.
pub fn should_escalate(report: &Report, analysis: &AiAnalysis, threshold: f64) -> bool {
    report.severity == Severity::Critical && analysis.confidence > threshold
}

/// Threat type an escalated report maps to.
pub fn threat_for(report_type: ReportType) -> ThreatType {
    match report_type {
        ReportType::Weather => ThreatType::Cyclone,
        ReportType::Flood => ThreatType::Flood,
        ReportType::Tsunami => ThreatType::Tsunami,
        ReportType::StormSurge => ThreatType::StormSurge,
        ReportType::Pollution => ThreatType::Pollution,
        ReportType::Erosion => ThreatType::Erosion,
        ReportType::Infrastructure | ReportType::Other => ThreatType::Other,
    }
}

/// Alert spec for an escalated report.
pub fn escalation_spec(report: &Report, analysis: &AiAnalysis, config: &ReportsConfig) -> CreateAlert {
    let threat_type = threat_for(report.report_type);
    CreateAlert {
        threat_type,
        severity: report.severity,
        title: format!("{} {}", report.severity.adjective(), threat_type.title()),
        description: escalation_description(report, analysis),
        center: report.location,
        radius_km: config.escalation_radius_km,
        confidence: analysis.confidence,
        ai_prediction: true,
        related_alerts: Vec::new(),
        source_report: Some(report.id),
        recommendations: Vec::new(),
        evacuation_zones: Vec::new(),
        ttl_hours: Some(config.escalation_ttl_hours),
    }
}

/// Alert descriptions are capped at this many characters.
const MAX_DESCRIPTION_CHARS: usize = 5000;

fn escalation_description(report: &Report, analysis: &AiAnalysis) -> String {
    let text = format!(
        "Community report \"{}\": {} AI prediction confidence: {:.0}%.",
        report.title, report.description, analysis.confidence
    );
    text.chars().take(MAX_DESCRIPTION_CHARS).collect()
}
