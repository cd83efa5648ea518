//! In-memory fixtures shared by the unit tests of this crate.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use tidewatch_core::config::AppConfig;
use tidewatch_core::error::AppError;
use tidewatch_core::events::{EventKind, Room};
use tidewatch_core::result::AppResult;
use tidewatch_core::traits::{
    DeliveryFailure, EmailGateway, EventPublisher, ManualClock, PushContent, PushGateway,
    SmsGateway,
};
use tidewatch_core::types::GeoPoint;
use tidewatch_database::Database;
use tidewatch_entity::Severity;
use tidewatch_entity::alert::CreateAlert;
use tidewatch_entity::environment::EnvironmentalReading;
use tidewatch_entity::report::{AiAnalysis, Report, ReportType, SubmitReport};
use tidewatch_entity::user::{CreateUser, NotificationPreferences, User, UserRole};
use tidewatch_oracle::ScoringOracle;

use crate::context::RequestContext;
use crate::notification::Gateways;
use crate::state::Services;

/// Captures every published event.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<(Room, EventKind, serde_json::Value)>>,
}

impl RecordingPublisher {
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().unwrap().iter().map(|(_, k, _)| *k).collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.kinds().into_iter().filter(|k| *k == kind).count()
    }

    pub fn rooms_for(&self, kind: EventKind) -> Vec<Room> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(r, _, _)| *r)
            .collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, room: &Room, kind: EventKind, payload: serde_json::Value) {
        self.events.lock().unwrap().push((*room, kind, payload));
    }
}

/// How a recording gateway answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Fail,
    Hang,
}

/// Records every gateway call; each channel can be told to fail or hang.
#[derive(Debug)]
pub struct RecordingGateway {
    pub push: Mutex<Behavior>,
    pub sms: Mutex<Behavior>,
    pub email: Mutex<Behavior>,
    calls: Mutex<Vec<(&'static str, String)>>,
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self {
            push: Mutex::new(Behavior::Succeed),
            sms: Mutex::new(Behavior::Succeed),
            email: Mutex::new(Behavior::Succeed),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingGateway {
    pub fn calls(&self, channel: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == channel)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn answer(&self, channel: &'static str, behavior: Behavior, target: &str) -> Result<(), DeliveryFailure> {
        self.calls
            .lock()
            .unwrap()
            .push((channel, target.to_string()));
        match behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => Err(DeliveryFailure::Unavailable(format!("{channel} down"))),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl PushGateway for RecordingGateway {
    async fn send_push(&self, target: &str, _content: &PushContent) -> Result<(), DeliveryFailure> {
        let behavior = *self.push.lock().unwrap();
        self.answer("push", behavior, target).await
    }
}

#[async_trait]
impl SmsGateway for RecordingGateway {
    async fn send_sms(&self, number: &str, _text: &str) -> Result<(), DeliveryFailure> {
        let behavior = *self.sms.lock().unwrap();
        self.answer("sms", behavior, number).await
    }
}

#[async_trait]
impl EmailGateway for RecordingGateway {
    async fn send_email(&self, address: &str, _subject: &str, _body: &str) -> Result<(), DeliveryFailure> {
        let behavior = *self.email.lock().unwrap();
        self.answer("email", behavior, address).await
    }
}

/// An oracle that returns a fixed confidence for every report.
#[derive(Debug)]
pub struct ScriptedOracle {
    pub confidence: Mutex<Option<f64>>,
    pub threats: Mutex<Vec<CreateAlert>>,
}

impl ScriptedOracle {
    pub fn with_confidence(confidence: f64) -> Self {
        Self {
            confidence: Mutex::new(Some(confidence)),
            threats: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            confidence: Mutex::new(None),
            threats: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ScoringOracle for ScriptedOracle {
    async fn analyze_report(&self, _report: &Report) -> AppResult<AiAnalysis> {
        let confidence = *self.confidence.lock().unwrap();
        match confidence {
            Some(confidence) => Ok(analysis(confidence)),
            None => Err(AppError::external_service("oracle offline")),
        }
    }

    async fn analyze_global_threats(
        &self,
        _readings: &[EnvironmentalReading],
    ) -> AppResult<Vec<CreateAlert>> {
        Ok(self.threats.lock().unwrap().clone())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn analysis(confidence: f64) -> AiAnalysis {
    AiAnalysis {
        severity_score: 100.0,
        confidence,
        tags: vec!["water".to_string()],
        credibility: 70.0,
        predicted_severity: Some(Severity::Critical),
        model_version: "scripted".to_string(),
        analyzed_at: start(),
    }
}

/// 2026-03-10 06:00 UTC.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 6, 0, 0).unwrap()
}

/// Chennai coastline.
pub fn coast() -> GeoPoint {
    GeoPoint::new(80.28, 13.08).unwrap()
}

/// A point roughly `km` kilometres north of [`coast`].
pub fn north_of_coast(km: f64) -> GeoPoint {
    GeoPoint::new(80.28, 13.08 + km / 111.2).unwrap()
}

pub struct Harness {
    pub services: Services,
    pub db: Database,
    pub clock: Arc<ManualClock>,
    pub publisher: Arc<RecordingPublisher>,
    pub gateway: Arc<RecordingGateway>,
    pub oracle: Arc<ScriptedOracle>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_oracle(ScriptedOracle::with_confidence(50.0)).await
    }

    pub async fn with_oracle(oracle: ScriptedOracle) -> Self {
        let mut config = AppConfig::default();
        config.notifications.batch_delay_ms = 10;
        config.notifications.channel_timeout_ms = 200;
        config.oracle.timeout_ms = 500;
        Self::with_config(config, oracle).await
    }

    pub async fn with_config(config: AppConfig, oracle: ScriptedOracle) -> Self {
        let db = Database::in_memory();
        let clock = Arc::new(ManualClock::new(start()));
        let publisher = Arc::new(RecordingPublisher::default());
        let gateway = Arc::new(RecordingGateway::default());
        let oracle = Arc::new(oracle);
        let gateways = Gateways {
            push: gateway.clone(),
            sms: gateway.clone(),
            email: gateway.clone(),
        };
        let services = Services::build(
            config,
            db.clone(),
            oracle.clone(),
            gateways,
            publisher.clone(),
            clock.clone(),
        )
        .await
        .unwrap();
        Self {
            services,
            db,
            clock,
            publisher,
            gateway,
            oracle,
        }
    }

    pub async fn user_at(&self, email: &str, location: GeoPoint, preferences: NotificationPreferences) -> User {
        self.services
            .users
            .register(CreateUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                phone: Some("+919800000000".to_string()),
                device_token: Some(format!("device-{email}")),
                role: UserRole::Citizen,
                location,
                preferences,
            })
            .await
            .unwrap()
    }

    pub async fn citizen(&self, email: &str) -> User {
        self.user_at(email, coast(), NotificationPreferences::default()).await
    }

    pub async fn expert(&self, email: &str) -> RequestContext {
        let user = self
            .services
            .users
            .register(CreateUser {
                name: "Expert".to_string(),
                email: email.to_string(),
                phone: None,
                device_token: None,
                role: UserRole::Expert,
                location: GeoPoint::new(0.0, 0.0).unwrap(),
                preferences: NotificationPreferences {
                    push: false,
                    sms: false,
                    email: false,
                    community_reports: false,
                },
            })
            .await
            .unwrap();
        RequestContext::new(user.id, UserRole::Expert)
    }
}

pub fn ctx(user: &User) -> RequestContext {
    RequestContext::new(user.id, user.role)
}

pub fn submission(report_type: ReportType, severity: Severity, attachments: usize) -> SubmitReport {
    SubmitReport {
        report_type,
        severity,
        title: "Water rising at the pier".to_string(),
        description: "Sea water is flooding the road next to the pier".to_string(),
        location: coast(),
        attachments: (0..attachments)
            .map(|i| tidewatch_entity::report::Attachment {
                filename: format!("photo-{i}.jpg"),
                mime_type: "image/jpeg".to_string(),
                size_bytes: 1024,
                url: format!("s3://reports/photo-{i}.jpg"),
            })
            .collect(),
    }
}

pub fn alert_spec(severity: Severity, radius_km: f64) -> CreateAlert {
    CreateAlert {
        threat_type: tidewatch_entity::alert::ThreatType::Cyclone,
        severity,
        title: "Cyclone approaching".to_string(),
        description: "Strong winds expected along the coast".to_string(),
        center: coast(),
        radius_km,
        confidence: 70.0,
        ai_prediction: false,
        related_alerts: Vec::new(),
        source_report: None,
        recommendations: Vec::new(),
        evacuation_zones: Vec::new(),
        ttl_hours: None,
    }
}

pub fn reading(station: &str, wind_speed_kmh: f64, pressure_hpa: f64) -> EnvironmentalReading {
    use tidewatch_core::types::ReadingId;
    use tidewatch_entity::environment::{CURRENT_SCHEMA_VERSION, ReadingPayload, WeatherObservation};

    EnvironmentalReading {
        id: ReadingId::new(),
        station_id: station.to_string(),
        location: coast(),
        schema_version: CURRENT_SCHEMA_VERSION,
        recorded_at: start(),
        payload: ReadingPayload::Weather(WeatherObservation {
            wind_speed_kmh,
            pressure_hpa,
            temperature_c: Some(29.0),
            humidity_pct: Some(80.0),
            visibility_km: None,
        }),
    }
}
