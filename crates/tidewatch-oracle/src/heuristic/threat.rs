//! Environmental threat scoring.

use serde::Serialize;

use tidewatch_entity::Severity;
use tidewatch_entity::alert::ThreatType;
use tidewatch_entity::environment::EnvironmentalReading;

/// The four values threat scoring looks at, with neutral fallbacks for
/// whatever the reading did not measure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conditions {
    /// Sustained wind, km/h.
    pub wind_speed_kmh: f64,
    /// Barometric pressure, hPa.
    pub pressure_hpa: f64,
    /// Significant wave height, m.
    pub wave_height_m: f64,
    /// Sea level above datum, m.
    pub sea_level_m: f64,
}

impl Conditions {
    /// Extract conditions from a reading.
    pub fn from_reading(reading: &EnvironmentalReading) -> Self {
        let weather = reading.weather();
        let marine = reading.marine();
        Self {
            wind_speed_kmh: weather.map_or(0.0, |w| w.wind_speed_kmh),
            pressure_hpa: weather.map_or(1013.0, |w| w.pressure_hpa),
            wave_height_m: marine.map_or(1.0, |m| m.wave_height_m),
            sea_level_m: marine.map_or(0.0, |m| m.sea_level_m),
        }
    }
}

/// Threat score with derived severity and confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatAssessment {
    /// Accumulated risk points.
    pub score: u32,
    /// Severity band of the score.
    pub severity: Severity,
    /// `min(95, 50 + 0.8 * score)`.
    pub confidence: f64,
}

/// Score `conditions`.
pub fn assess(conditions: &Conditions) -> ThreatAssessment {
    let mut score = 0;

    score += match conditions.wind_speed_kmh {
        w if w > 80.0 => 40,
        w if w > 60.0 => 25,
        w if w > 40.0 => 10,
        _ => 0,
    };
    score += match conditions.pressure_hpa {
        p if p < 990.0 => 30,
        p if p < 1000.0 => 15,
        p if p < 1010.0 => 5,
        _ => 0,
    };
    score += match conditions.wave_height_m {
        h if h > 4.0 => 20,
        h if h > 3.0 => 10,
        h if h > 2.0 => 5,
        _ => 0,
    };
    score += match conditions.sea_level_m {
        s if s > 3.0 => 15,
        s if s > 2.0 => 8,
        _ => 0,
    };

    let severity = match score {
        s if s >= 80 => Severity::Critical,
        s if s >= 60 => Severity::High,
        s if s >= 30 => Severity::Medium,
        _ => Severity::Low,
    };

    ThreatAssessment {
        score,
        severity,
        confidence: (50.0 + f64::from(score) * 0.8).min(95.0),
    }
}

/// Pick the threat type the conditions most resemble.
pub fn infer_threat_type(conditions: &Conditions) -> ThreatType {
    if conditions.wind_speed_kmh > 60.0 && conditions.pressure_hpa < 990.0 {
        ThreatType::Cyclone
    } else if conditions.wave_height_m > 3.0 && conditions.pressure_hpa < 1000.0 {
        ThreatType::StormSurge
    } else if conditions.sea_level_m > 2.0 {
        ThreatType::Flood
    } else if conditions.wave_height_m > 4.0 {
        ThreatType::Tsunami
    } else {
        ThreatType::Other
    }
}

/// An out-of-range measurement worth flagging on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anomaly {
    /// Measured parameter.
    pub parameter: &'static str,
    /// Measured value.
    pub value: f64,
    /// Threshold that was crossed.
    pub threshold: f64,
    /// How serious the anomaly is.
    pub severity: Severity,
    /// Short explanation.
    pub description: &'static str,
}

/// Extreme wind or pressure in a reading's weather observation.
pub fn detect_anomalies(reading: &EnvironmentalReading) -> Vec<Anomaly> {
    let Some(weather) = reading.weather() else {
        return Vec::new();
    };

    let mut anomalies = Vec::new();
    if weather.wind_speed_kmh > 100.0 {
        anomalies.push(Anomaly {
            parameter: "wind_speed",
            value: weather.wind_speed_kmh,
            threshold: 100.0,
            severity: Severity::High,
            description: "Extremely high wind speeds detected",
        });
    }
    if weather.pressure_hpa < 980.0 {
        anomalies.push(Anomaly {
            parameter: "pressure",
            value: weather.pressure_hpa,
            threshold: 980.0,
            severity: Severity::Critical,
            description: "Extremely low atmospheric pressure",
        });
    }
    anomalies
}

/// How much a reading can be trusted, from the share of parameters it measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    High,
    Medium,
    Low,
}

/// Coverage of the parameters threat scoring can use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQuality {
    /// Share of tracked parameters present, 0 to 100.
    pub completeness: f64,
    /// Tracked parameters the reading did not measure.
    pub missing_parameters: Vec<&'static str>,
    pub reliability: Reliability,
}

const TRACKED_PARAMETERS: usize = 8;

/// Which of the eight tracked parameters a reading carries.
pub fn data_quality(reading: &EnvironmentalReading) -> DataQuality {
    let weather = reading.weather();
    let marine = reading.marine();
    let present = [
        ("wind_speed", weather.is_some()),
        ("pressure", weather.is_some()),
        ("wave_height", marine.is_some()),
        ("sea_level", marine.is_some()),
        ("temperature", weather.and_then(|w| w.temperature_c).is_some()),
        ("humidity", weather.and_then(|w| w.humidity_pct).is_some()),
        ("visibility", weather.and_then(|w| w.visibility_km).is_some()),
        ("water_quality", marine.and_then(|m| m.water_quality_index).is_some()),
    ];

    let missing_parameters: Vec<&'static str> = present
        .iter()
        .filter(|(_, measured)| !measured)
        .map(|(name, _)| *name)
        .collect();
    let measured = TRACKED_PARAMETERS - missing_parameters.len();
    let reliability = match measured {
        n if n > 6 => Reliability::High,
        n if n > 4 => Reliability::Medium,
        _ => Reliability::Low,
    };

    DataQuality {
        completeness: measured as f64 / TRACKED_PARAMETERS as f64 * 100.0,
        missing_parameters,
        reliability,
    }
}
