//! Alert content generation: titles, descriptions and resident guidance.

use serde::Serialize;

use tidewatch_core::types::GeoPoint;
use tidewatch_entity::Severity;
use tidewatch_entity::alert::ThreatType;

use crate::heuristic::Conditions;

/// `"<Adjective> <Threat title>"`, e.g. `Severe Storm Surge`.
pub fn alert_title(threat_type: ThreatType, severity: Severity) -> String {
    format!("{} {}", severity.adjective(), threat_type.title())
}

/// Human-readable description ending with the model confidence.
pub fn alert_description(
    threat_type: ThreatType,
    severity: Severity,
    conditions: &Conditions,
    confidence: f64,
) -> String {
    let base = match threat_type {
        ThreatType::Cyclone => format!(
            "Cyclonic system with sustained winds of {:.0} km/h and central pressure of {:.1} hPa approaching the coast.",
            conditions.wind_speed_kmh, conditions.pressure_hpa
        ),
        ThreatType::Tsunami => format!(
            "Tsunami waves with estimated height of {:.1}m detected. Immediate coastal evacuation recommended.",
            conditions.wave_height_m
        ),
        ThreatType::StormSurge => format!(
            "Storm surge of {:.1}m height expected due to severe weather conditions and low pressure ({:.1} hPa).",
            conditions.wave_height_m, conditions.pressure_hpa
        ),
        ThreatType::Flood => format!(
            "Coastal flooding imminent due to high tide, storm surge, and sustained winds of {:.0} km/h.",
            conditions.wind_speed_kmh
        ),
        _ => format!("Severe coastal weather conditions detected with {severity} threat level."),
    };
    format!(
        "{base} Expected impact in {}, about {} residents at risk. AI prediction confidence: {confidence:.0}%.",
        eta(threat_type),
        affected_population(severity)
    )
}

/// Rough time until the threat reaches the coast.
pub fn eta(threat_type: ThreatType) -> String {
    match threat_type {
        // A system 50 km out moving at 20 km/h.
        ThreatType::Cyclone => format!("{:.1} hours", 50.0 / 20.0),
        ThreatType::Tsunami => "15-45 minutes".to_string(),
        ThreatType::StormSurge => "2-4 hours".to_string(),
        _ => "1-3 hours".to_string(),
    }
}

/// Residents likely affected at `severity`, abbreviated as `50K` or `1.2M`.
pub fn affected_population(severity: Severity) -> String {
    let people: u64 = match severity {
        Severity::Low => 10_000,
        Severity::Medium => 50_000,
        Severity::High => 200_000,
        Severity::Critical => 500_000,
    };
    abbreviate(people)
}

fn abbreviate(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.0}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Actions residents should take at `severity`, plus condition-specific extras.
pub fn recommendations(severity: Severity, conditions: &Conditions) -> Vec<String> {
    let base: &[&str] = match severity {
        Severity::Critical => &[
            "Evacuate immediately to higher ground",
            "Alert all family members and neighbors",
            "Call emergency services (108)",
            "Avoid coastal areas and low-lying regions",
        ],
        Severity::High => &[
            "Prepare for immediate evacuation",
            "Secure property and belongings",
            "Check on vulnerable community members",
            "Monitor official emergency channels",
        ],
        Severity::Medium => &[
            "Stay alert and monitor conditions",
            "Prepare emergency kit and evacuation plan",
            "Avoid unnecessary travel to coastal areas",
            "Keep emergency contacts ready",
        ],
        Severity::Low => &[
            "Continue normal activities with caution",
            "Stay informed about weather updates",
            "Review family emergency plan",
        ],
    };

    let mut out: Vec<String> = base.iter().map(|s| s.to_string()).collect();
    if conditions.wind_speed_kmh > 50.0 {
        out.push("Secure loose outdoor objects".to_string());
    }
    if conditions.wave_height_m > 3.0 {
        out.push("Avoid beach and waterfront activities".to_string());
    }
    out
}

/// Distance bands to evacuate, prepare or monitor.
pub fn evacuation_zones(severity: Severity) -> Vec<String> {
    let zones: &[&str] = match severity {
        Severity::Low => &["Monitor coastal areas (0-2km)"],
        Severity::Medium => &[
            "Evacuate immediate coast (0-1km)",
            "Prepare inland areas (1-5km)",
        ],
        Severity::High => &[
            "Immediate evacuation (0-2km)",
            "Prepare evacuation (2-10km)",
            "Monitor closely (10-20km)",
        ],
        Severity::Critical => &[
            "Immediate evacuation (0-5km)",
            "Mandatory evacuation (5-15km)",
            "Prepare evacuation (15-30km)",
        ],
    };
    zones.iter().map(|s| s.to_string()).collect()
}

/// A way out of a threatened area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvacuationRoute {
    pub id: &'static str,
    pub name: &'static str,
    /// `inland` or `highway`.
    pub kind: &'static str,
    pub distance_km: f64,
    pub duration_min: f64,
    pub traffic: &'static str,
    /// 0 to 10, higher is safer.
    pub safety_score: f64,
    /// Starts at the origin.
    pub waypoints: Vec<GeoPoint>,
    pub instructions: Vec<&'static str>,
    pub capacity: &'static str,
}

/// Recommended inland route first, then the highway alternative.
pub fn evacuation_routes(origin: &GeoPoint) -> Vec<EvacuationRoute> {
    vec![
        EvacuationRoute {
            id: "route_alpha",
            name: "Route Alpha (Recommended)",
            kind: "inland",
            distance_km: 42.5,
            duration_min: 45.0,
            traffic: "light",
            safety_score: 9.0,
            waypoints: vec![*origin, offset(origin, 0.1, 0.15), offset(origin, 0.2, 0.3)],
            instructions: vec![
                "Head northeast away from coast",
                "Follow main highway inland",
                "Continue to designated safe zone",
            ],
            capacity: "high",
        },
        EvacuationRoute {
            id: "route_beta",
            name: "Route Beta (Alternative)",
            kind: "highway",
            distance_km: 50.0,
            duration_min: 60.0,
            traffic: "moderate",
            safety_score: 8.0,
            waypoints: vec![*origin, offset(origin, 0.05, 0.2), offset(origin, 0.15, 0.4)],
            instructions: vec![
                "Take alternate inland route",
                "Merge onto state highway",
                "Follow signs to evacuation center",
            ],
            capacity: "medium",
        },
    ]
}

/// `origin` moved by degrees, clamped to the valid coordinate range.
fn offset(origin: &GeoPoint, d_lat: f64, d_lon: f64) -> GeoPoint {
    GeoPoint::new(
        (origin.longitude() + d_lon).min(180.0),
        (origin.latitude() + d_lat).min(90.0),
    )
    .unwrap_or(*origin)
}
