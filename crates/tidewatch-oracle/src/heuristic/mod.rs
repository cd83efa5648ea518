//! Deterministic scoring provider.
//!
//! Report scoring is keyword and credibility analysis of the description.
//! Threat scoring adds fixed risk points per environmental threshold crossed.

mod text;
mod threat;

pub use text::{TextAnalysis, analyze_text, credibility, severity_consistency};
pub use threat::{
    Anomaly, Conditions, DataQuality, Reliability, ThreatAssessment, assess, data_quality,
    detect_anomalies, infer_threat_type,
};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use tidewatch_core::config::oracle::OracleConfig;
use tidewatch_core::result::AppResult;
use tidewatch_entity::alert::CreateAlert;
use tidewatch_entity::environment::EnvironmentalReading;
use tidewatch_entity::report::{AiAnalysis, Report};

use crate::content;
use crate::provider::ScoringOracle;

const REPORT_MODEL_VERSION: &str = "heuristic-report-v1";

/// Oracle that scores with fixed rules.
#[derive(Debug, Clone)]
pub struct HeuristicOracle {
    alert_threshold: u32,
    alert_radius_km: f64,
}

impl HeuristicOracle {
    /// Create a heuristic oracle from configuration.
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            alert_threshold: config.alert_threat_threshold,
            alert_radius_km: config.sweep_alert_radius_km,
        }
    }

    /// The alert spec for one reading, if its threat score reaches the threshold.
    pub fn alert_for(&self, reading: &EnvironmentalReading) -> Option<CreateAlert> {
        let conditions = Conditions::from_reading(reading);
        let assessment = assess(&conditions);
        if assessment.score < self.alert_threshold {
            return None;
        }

        let threat_type = infer_threat_type(&conditions);
        Some(CreateAlert {
            threat_type,
            severity: assessment.severity,
            title: content::alert_title(threat_type, assessment.severity),
            description: content::alert_description(
                threat_type,
                assessment.severity,
                &conditions,
                assessment.confidence,
            ),
            center: reading.location,
            radius_km: self.alert_radius_km,
            confidence: assessment.confidence,
            ai_prediction: true,
            related_alerts: Vec::new(),
            source_report: None,
            recommendations: content::recommendations(assessment.severity, &conditions),
            evacuation_zones: content::evacuation_zones(assessment.severity),
            ttl_hours: None,
        })
    }
}

#[async_trait]
impl ScoringOracle for HeuristicOracle {
    async fn analyze_report(&self, report: &Report) -> AppResult<AiAnalysis> {
        let text = analyze_text(&report.description);
        let consistency = severity_consistency(report.severity, text.predicted_severity);
        let evidence = 10.0 * report.attachments.len() as f64;
        let confidence = (text.credibility + evidence + consistency).clamp(0.0, 95.0);

        let mut tags = text.tags;
        if report.image_count() > 0 {
            tags.push("photo_evidence".to_string());
        }

        debug!(
            report_id = %report.id,
            predicted = %text.predicted_severity,
            confidence,
            "Report scored"
        );

        Ok(AiAnalysis {
            severity_score: f64::from(text.predicted_severity.rank()) * 25.0,
            confidence,
            tags,
            credibility: text.credibility,
            predicted_severity: Some(text.predicted_severity),
            model_version: REPORT_MODEL_VERSION.to_string(),
            analyzed_at: Utc::now(),
        })
    }

    async fn analyze_global_threats(
        &self,
        readings: &[EnvironmentalReading],
    ) -> AppResult<Vec<CreateAlert>> {
        Ok(readings.iter().filter_map(|r| self.alert_for(r)).collect())
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewatch_core::types::{GeoPoint, ReadingId, UserId};
    use tidewatch_entity::Severity;
    use tidewatch_entity::environment::{
        CURRENT_SCHEMA_VERSION, MarineObservation, ReadingPayload, WeatherObservation,
    };
    use tidewatch_entity::report::{Attachment, ReportType, SubmitReport};

    fn reading(wind: f64, pressure: f64, wave: f64, sea: f64) -> EnvironmentalReading {
        EnvironmentalReading {
            id: ReadingId::new(),
            station_id: "buoy-7".to_string(),
            location: GeoPoint::new(69.6, 21.6).unwrap(),
            schema_version: CURRENT_SCHEMA_VERSION,
            recorded_at: Utc::now(),
            payload: ReadingPayload::Combined {
                weather: WeatherObservation {
                    wind_speed_kmh: wind,
                    pressure_hpa: pressure,
                    temperature_c: None,
                    humidity_pct: None,
                    visibility_km: None,
                },
                marine: MarineObservation {
                    wave_height_m: wave,
                    sea_level_m: sea,
                    water_temperature_c: None,
                    water_quality_index: None,
                },
            },
        }
    }

    fn report(severity: Severity, description: &str, attachments: Vec<Attachment>) -> Report {
        Report::new(
            UserId::new(),
            SubmitReport {
                report_type: ReportType::Flood,
                severity,
                title: "Flooding".to_string(),
                description: description.to_string(),
                location: GeoPoint::new(80.2, 13.0).unwrap(),
                attachments,
            },
            Utc::now(),
        )
    }

    fn photo() -> Attachment {
        Attachment {
            filename: "shore.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            size_bytes: 2048,
            url: "https://files.example.org/shore.jpg".to_string(),
        }
    }

    #[test]
    fn test_alert_only_at_or_above_threshold() {
        let oracle = HeuristicOracle::new(&OracleConfig::default());
        // wind > 80 (40) + pressure < 1000 (15) + wave > 2 (5) = 60
        let at_threshold = reading(85.0, 995.0, 2.5, 0.0);
        // wind > 80 (40) + pressure < 1000 (15) = 55
        let below = reading(85.0, 995.0, 1.0, 0.0);

        let alert = oracle.alert_for(&at_threshold).expect("score 60 must alert");
        assert_eq!(alert.severity, Severity::High);
        assert!(alert.ai_prediction);
        assert_eq!(alert.radius_km, 50.0);
        assert!(oracle.alert_for(&below).is_none());
    }

    #[tokio::test]
    async fn test_global_threats_filters_calm_readings() {
        let oracle = HeuristicOracle::new(&OracleConfig::default());
        let readings = vec![
            reading(10.0, 1013.0, 1.0, 0.0),
            reading(120.0, 970.0, 5.0, 3.5),
        ];
        let alerts = oracle.analyze_global_threats(&readings).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].confidence, 95.0);
        assert!(alerts[0].description.ends_with("AI prediction confidence: 95%."));
    }

    #[tokio::test]
    async fn test_report_confidence_combines_credibility_evidence_and_consistency() {
        let oracle = HeuristicOracle::new(&OracleConfig::default());
        // credibility 50 + 10 (length > 50) = 60; predicted critical matches reported (+20)
        let text = "Massive emergency along the road, water rising fast near us";
        let analysis = oracle
            .analyze_report(&report(Severity::Critical, text, vec![photo()]))
            .await
            .unwrap();
        assert_eq!(analysis.credibility, 60.0);
        assert_eq!(analysis.confidence, 90.0);
        assert_eq!(analysis.predicted_severity, Some(Severity::Critical));
        assert_eq!(analysis.severity_score, 100.0);
        assert!(analysis.tags.contains(&"photo_evidence".to_string()));
    }

    #[tokio::test]
    async fn test_report_confidence_is_capped() {
        let oracle = HeuristicOracle::new(&OracleConfig::default());
        let text = "Severe disaster at the beach this morning, waves 4 meter high broke the sea wall near the village";
        let attachments = vec![photo(), photo(), photo()];
        let analysis = oracle
            .analyze_report(&report(Severity::Critical, text, attachments))
            .await
            .unwrap();
        assert_eq!(analysis.confidence, 95.0);
    }
}
