//! Versioned, schema-validated environmental readings.
//!
//! Upstream weather and marine feeds arrive in many shapes. They are
//! normalized into [`ReadingPayload`] before anything in the core looks at
//! them, and [`EnvironmentalReading::validate`] rejects unknown schema
//! versions and physically impossible values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tidewatch_core::types::{GeoPoint, ReadingId};
use tidewatch_core::{AppError, AppResult};

/// Schema version understood by this build.
pub const CURRENT_SCHEMA_VERSION: u16 = 1;

/// Atmospheric observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// Sustained wind speed, km/h.
    pub wind_speed_kmh: f64,
    /// Sea-level pressure, hPa.
    pub pressure_hpa: f64,
    /// Air temperature, °C.
    pub temperature_c: Option<f64>,
    /// Relative humidity, percent.
    pub humidity_pct: Option<f64>,
    /// Horizontal visibility, km.
    pub visibility_km: Option<f64>,
}

/// Sea-state observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarineObservation {
    /// Significant wave height, m.
    pub wave_height_m: f64,
    /// Sea level above datum, m.
    pub sea_level_m: f64,
    /// Water temperature, °C.
    pub water_temperature_c: Option<f64>,
    /// Water quality index, 0 to 100.
    pub water_quality_index: Option<f64>,
}

/// Measurement body, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadingPayload {
    /// Weather station.
    Weather(WeatherObservation),
    /// Buoy or tide gauge.
    Marine(MarineObservation),
    /// Station reporting both.
    Combined {
        /// Atmospheric part.
        weather: WeatherObservation,
        /// Sea-state part.
        marine: MarineObservation,
    },
}

/// A single reading from one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalReading {
    /// Unique reading identifier.
    #[serde(default)]
    pub id: ReadingId,
    /// Reporting station.
    pub station_id: String,
    /// Station location.
    pub location: GeoPoint,
    /// Payload schema version.
    pub schema_version: u16,
    /// When the measurement was taken.
    pub recorded_at: DateTime<Utc>,
    /// Measurements.
    pub payload: ReadingPayload,
}

impl EnvironmentalReading {
    /// Atmospheric part, if present.
    pub fn weather(&self) -> Option<&WeatherObservation> {
        match &self.payload {
            ReadingPayload::Weather(w) | ReadingPayload::Combined { weather: w, .. } => Some(w),
            ReadingPayload::Marine(_) => None,
        }
    }

    /// Sea-state part, if present.
    pub fn marine(&self) -> Option<&MarineObservation> {
        match &self.payload {
            ReadingPayload::Marine(m) | ReadingPayload::Combined { marine: m, .. } => Some(m),
            ReadingPayload::Weather(_) => None,
        }
    }

    /// Reject unsupported versions and out-of-range values.
    pub fn validate(&self) -> AppResult<()> {
        if self.schema_version != CURRENT_SCHEMA_VERSION {
            return Err(AppError::validation(format!(
                "Unsupported reading schema version {}",
                self.schema_version
            )));
        }
        if self.station_id.trim().is_empty() {
            return Err(AppError::validation("Reading has no station id"));
        }
        if let Some(w) = self.weather() {
            check_range("wind_speed_kmh", w.wind_speed_kmh, 0.0, 500.0)?;
            check_range("pressure_hpa", w.pressure_hpa, 800.0, 1100.0)?;
            check_optional("temperature_c", w.temperature_c, -90.0, 60.0)?;
            check_optional("humidity_pct", w.humidity_pct, 0.0, 100.0)?;
            check_optional("visibility_km", w.visibility_km, 0.0, 500.0)?;
        }
        if let Some(m) = self.marine() {
            check_range("wave_height_m", m.wave_height_m, 0.0, 40.0)?;
            check_range("sea_level_m", m.sea_level_m, -10.0, 20.0)?;
            check_optional("water_temperature_c", m.water_temperature_c, -5.0, 45.0)?;
            check_optional("water_quality_index", m.water_quality_index, 0.0, 100.0)?;
        }
        Ok(())
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> AppResult<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(AppError::validation(format!(
            "{field} = {value} is outside [{min}, {max}]"
        )));
    }
    Ok(())
}

fn check_optional(field: &str, value: Option<f64>, min: f64, max: f64) -> AppResult<()> {
    match value {
        Some(v) => check_range(field, v, min, max),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(payload: ReadingPayload) -> EnvironmentalReading {
        EnvironmentalReading {
            id: ReadingId::new(),
            station_id: "INCOIS-CHN-01".to_string(),
            location: GeoPoint::new(80.27, 13.08).unwrap(),
            schema_version: CURRENT_SCHEMA_VERSION,
            recorded_at: Utc::now(),
            payload,
        }
    }

    fn weather(wind: f64, pressure: f64) -> WeatherObservation {
        WeatherObservation {
            wind_speed_kmh: wind,
            pressure_hpa: pressure,
            temperature_c: Some(29.0),
            humidity_pct: Some(80.0),
            visibility_km: None,
        }
    }

    #[test]
    fn test_tagged_payload_deserializes() {
        let json = r#"{
            "station_id": "buoy-7",
            "location": {"longitude": 80.3, "latitude": 13.1},
            "schema_version": 1,
            "recorded_at": "2026-10-19T06:00:00Z",
            "payload": {"kind": "marine", "wave_height_m": 3.5, "sea_level_m": 1.2,
                        "water_temperature_c": null, "water_quality_index": null}
        }"#;
        let parsed: EnvironmentalReading = serde_json::from_str(json).unwrap();
        assert!(parsed.weather().is_none());
        assert_eq!(parsed.marine().unwrap().wave_height_m, 3.5);
        parsed.validate().unwrap();
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut r = reading(ReadingPayload::Weather(weather(30.0, 1008.0)));
        r.schema_version = 2;
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_rejects_impossible_values() {
        let r = reading(ReadingPayload::Weather(weather(30.0, 500.0)));
        assert!(r.validate().is_err());

        let r = reading(ReadingPayload::Weather(weather(f64::NAN, 1000.0)));
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_combined_exposes_both_parts() {
        let r = reading(ReadingPayload::Combined {
            weather: weather(90.0, 985.0),
            marine: MarineObservation {
                wave_height_m: 4.5,
                sea_level_m: 2.5,
                water_temperature_c: None,
                water_quality_index: Some(60.0),
            },
        });
        assert!(r.weather().is_some());
        assert!(r.marine().is_some());
        r.validate().unwrap();
    }
}
