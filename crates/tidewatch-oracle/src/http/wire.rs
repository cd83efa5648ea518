//! JSON shapes exchanged with the remote AI service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tidewatch_core::result::AppResult;
use tidewatch_entity::Severity;
use tidewatch_entity::alert::{CreateAlert, ThreatType};
use tidewatch_entity::environment::EnvironmentalReading;
use tidewatch_entity::report::{AiAnalysis, Report};

use crate::content;
use crate::heuristic::{Conditions, infer_threat_type};

#[derive(Debug, Serialize)]
pub(super) struct AttachmentRef<'a> {
    filename: &'a str,
    mimetype: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct ReportAnalysisRequest<'a> {
    report_id: String,
    #[serde(rename = "type")]
    report_type: &'static str,
    severity: &'static str,
    description: &'a str,
    attachments: Vec<AttachmentRef<'a>>,
}

impl<'a> ReportAnalysisRequest<'a> {
    pub(super) fn from_report(report: &'a Report) -> Self {
        Self {
            report_id: report.id.to_string(),
            report_type: report.report_type.as_str(),
            severity: report.severity.as_str(),
            description: &report.description,
            attachments: report
                .attachments
                .iter()
                .map(|a| AttachmentRef {
                    filename: &a.filename,
                    mimetype: &a.mime_type,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ReportAnalysisResponse {
    #[serde(default)]
    severity_prediction: Option<String>,
    pub(super) confidence: f64,
    #[serde(default = "default_credibility")]
    credibility: f64,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    model_version: String,
}

fn default_credibility() -> f64 {
    50.0
}

impl ReportAnalysisResponse {
    pub(super) fn into_analysis(self, now: DateTime<Utc>) -> AiAnalysis {
        let predicted = self
            .severity_prediction
            .as_deref()
            .and_then(|s| s.parse::<Severity>().ok());
        AiAnalysis {
            severity_score: predicted.map_or(50.0, |s| f64::from(s.rank()) * 25.0),
            confidence: self.confidence.clamp(0.0, 100.0),
            tags: self.tags,
            credibility: self.credibility.clamp(0.0, 100.0),
            predicted_severity: predicted,
            model_version: self.model_version,
            analyzed_at: now,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct Measurement {
    value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EnvironmentalData {
    #[serde(skip_serializing_if = "Option::is_none")]
    wind_speed: Option<Measurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pressure: Option<Measurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wave_height: Option<Measurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sea_level: Option<Measurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<Measurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    humidity: Option<Measurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visibility: Option<Measurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    water_quality: Option<Measurement>,
}

#[derive(Debug, Serialize)]
pub(super) struct Location {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct GenerateAlertRequest {
    environmental_data: EnvironmentalData,
    location: Location,
    threat_type: &'static str,
}

fn measure(value: Option<f64>) -> Option<Measurement> {
    value.map(|value| Measurement { value })
}

impl GenerateAlertRequest {
    pub(super) fn from_reading(reading: &EnvironmentalReading) -> Self {
        let weather = reading.weather();
        let marine = reading.marine();
        let conditions = Conditions::from_reading(reading);
        Self {
            environmental_data: EnvironmentalData {
                wind_speed: measure(weather.map(|w| w.wind_speed_kmh)),
                pressure: measure(weather.map(|w| w.pressure_hpa)),
                wave_height: measure(marine.map(|m| m.wave_height_m)),
                sea_level: measure(marine.map(|m| m.sea_level_m)),
                temperature: measure(weather.and_then(|w| w.temperature_c)),
                humidity: measure(weather.and_then(|w| w.humidity_pct)),
                visibility: measure(weather.and_then(|w| w.visibility_km)),
                water_quality: measure(marine.and_then(|m| m.water_quality_index)),
            },
            location: Location {
                lat: reading.location.latitude(),
                lng: reading.location.longitude(),
            },
            threat_type: infer_threat_type(&conditions).as_str(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AlertDecision {
    should_generate: bool,
    #[serde(default, rename = "type")]
    threat_type: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    evacuation_zones: Vec<String>,
}

impl AlertDecision {
    /// The alert spec the service asked for, if any.
    pub(super) fn into_alert(
        self,
        reading: &EnvironmentalReading,
        radius_km: f64,
    ) -> AppResult<Option<CreateAlert>> {
        if !self.should_generate {
            return Ok(None);
        }

        let conditions = Conditions::from_reading(reading);
        // Unknown types such as "general" map to the catch-all.
        let threat_type = self
            .threat_type
            .as_deref()
            .and_then(|t| t.parse::<ThreatType>().ok())
            .unwrap_or(ThreatType::Other);
        let severity = match self.severity.as_deref() {
            Some(s) => s.parse::<Severity>()?,
            None => Severity::Medium,
        };
        let confidence = self.confidence.unwrap_or(50.0).clamp(0.0, 100.0);

        Ok(Some(CreateAlert {
            threat_type,
            severity,
            title: self
                .title
                .unwrap_or_else(|| content::alert_title(threat_type, severity)),
            description: self.description.unwrap_or_else(|| {
                content::alert_description(threat_type, severity, &conditions, confidence)
            }),
            center: reading.location,
            radius_km,
            confidence,
            ai_prediction: true,
            related_alerts: Vec::new(),
            source_report: None,
            recommendations: content::recommendations(severity, &conditions),
            evacuation_zones: if self.evacuation_zones.is_empty() {
                content::evacuation_zones(severity)
            } else {
                self.evacuation_zones
            },
            ttl_hours: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewatch_core::types::{GeoPoint, ReadingId};
    use tidewatch_entity::environment::{CURRENT_SCHEMA_VERSION, ReadingPayload, WeatherObservation};

    fn reading() -> EnvironmentalReading {
        EnvironmentalReading {
            id: ReadingId::new(),
            station_id: "met-3".to_string(),
            location: GeoPoint::new(70.2, 23.0).unwrap(),
            schema_version: CURRENT_SCHEMA_VERSION,
            recorded_at: Utc::now(),
            payload: ReadingPayload::Weather(WeatherObservation {
                wind_speed_kmh: 95.0,
                pressure_hpa: 984.0,
                temperature_c: Some(29.0),
                humidity_pct: None,
                visibility_km: None,
            }),
        }
    }

    #[test]
    fn test_generate_alert_request_shape() {
        let body = serde_json::to_value(GenerateAlertRequest::from_reading(&reading())).unwrap();
        assert_eq!(body["environmental_data"]["windSpeed"]["value"], 95.0);
        assert_eq!(body["environmental_data"]["temperature"]["value"], 29.0);
        assert!(body["environmental_data"].get("waveHeight").is_none());
        assert_eq!(body["location"]["lat"], 23.0);
        assert_eq!(body["threat_type"], "cyclone");
    }

    #[test]
    fn test_decision_fills_missing_content() {
        let decision: AlertDecision = serde_json::from_value(serde_json::json!({
            "should_generate": true,
            "type": "general",
            "severity": "high",
            "confidence": 82.0
        }))
        .unwrap();
        let alert = decision.into_alert(&reading(), 50.0).unwrap().unwrap();
        assert_eq!(alert.threat_type, ThreatType::Other);
        assert_eq!(alert.title, "Severe Coastal Threat");
        assert_eq!(alert.evacuation_zones.len(), 3);
        assert!(alert.ai_prediction);
    }

    #[test]
    fn test_decision_declined() {
        let decision: AlertDecision = serde_json::from_value(serde_json::json!({
            "should_generate": false,
            "reason": "Threat level too low"
        }))
        .unwrap();
        assert!(decision.into_alert(&reading(), 50.0).unwrap().is_none());
    }

    #[test]
    fn test_analysis_response_mapping() {
        let response: ReportAnalysisResponse = serde_json::from_value(serde_json::json!({
            "severity_prediction": "critical",
            "confidence": 88,
            "credibility": 75,
            "tags": ["water"],
            "model_version": "report_analyzer_v1.5"
        }))
        .unwrap();
        let analysis = response.into_analysis(Utc::now());
        assert_eq!(analysis.predicted_severity, Some(Severity::Critical));
        assert_eq!(analysis.severity_score, 100.0);
        assert_eq!(analysis.confidence, 88.0);
    }
}
