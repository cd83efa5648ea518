//! Shared helpers for the cross-crate tests.
//!
//! Builds the full service graph on the in-memory store with the realtime
//! engine as publisher, recording gateways, a scripted oracle and a manual
//! clock.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::mpsc;

use tidewatch_core::config::AppConfig;
use tidewatch_core::error::AppError;
use tidewatch_core::events::Room;
use tidewatch_core::result::AppResult;
use tidewatch_core::traits::{
    DeliveryFailure, EmailGateway, ManualClock, PushContent, PushGateway, SmsGateway,
};
use tidewatch_core::types::GeoPoint;
use tidewatch_database::Database;
use tidewatch_entity::Severity;
use tidewatch_entity::alert::{CreateAlert, ThreatType};
use tidewatch_entity::environment::EnvironmentalReading;
use tidewatch_entity::report::{AiAnalysis, Attachment, Report, ReportType, SubmitReport};
use tidewatch_entity::user::{CreateUser, NotificationPreferences, User, UserRole};
use tidewatch_oracle::ScoringOracle;
use tidewatch_realtime::RealtimeEngine;
use tidewatch_realtime::connection::ConnectionHandle;
use tidewatch_service::RequestContext;
use tidewatch_service::notification::Gateways;
use tidewatch_service::state::Services;

/// Gateway that records every call; push can be switched to fail.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    pub fail_push: Mutex<bool>,
    calls: Mutex<Vec<(&'static str, String)>>,
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

    fn record(&self, channel: &'static str, target: &str) {
        self.calls.lock().unwrap().push((channel, target.to_string()));
    }
}

#[async_trait]
impl PushGateway for RecordingGateway {
    async fn send_push(&self, target: &str, _content: &PushContent) -> Result<(), DeliveryFailure> {
        self.record("push", target);
        if *self.fail_push.lock().unwrap() {
            return Err(DeliveryFailure::Unavailable("push provider down".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SmsGateway for RecordingGateway {
    async fn send_sms(&self, number: &str, _text: &str) -> Result<(), DeliveryFailure> {
        self.record("sms", number);
        Ok(())
    }
}

#[async_trait]
impl EmailGateway for RecordingGateway {
    async fn send_email(&self, address: &str, _subject: &str, _body: &str) -> Result<(), DeliveryFailure> {
        self.record("email", address);
        Ok(())
    }
}

/// Oracle answering every report with the same confidence.
#[derive(Debug)]
pub struct FixedOracle {
    pub confidence: f64,
}

#[async_trait]
impl ScoringOracle for FixedOracle {
    async fn analyze_report(&self, _report: &Report) -> AppResult<AiAnalysis> {
        Ok(AiAnalysis {
            severity_score: 90.0,
            confidence: self.confidence,
            tags: vec!["flooding".to_string()],
            credibility: 70.0,
            predicted_severity: Some(Severity::Critical),
            model_version: "fixed".to_string(),
            analyzed_at: start(),
        })
    }

    async fn analyze_global_threats(
        &self,
        _readings: &[EnvironmentalReading],
    ) -> AppResult<Vec<CreateAlert>> {
        Err(AppError::external_service("global assessment not scripted"))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Test application context
pub struct TestApp {
    pub services: Services,
    pub engine: Arc<RealtimeEngine>,
    pub clock: Arc<ManualClock>,
    pub gateway: Arc<RecordingGateway>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_confidence(50.0).await
    }

    pub async fn with_confidence(confidence: f64) -> Self {
        let mut config = AppConfig::default();
        config.notifications.batch_delay_ms = 5;
        config.notifications.channel_timeout_ms = 500;
        config.oracle.timeout_ms = 1000;

        let engine = Arc::new(RealtimeEngine::new(config.realtime.clone()));
        engine.start();
        let clock = Arc::new(ManualClock::new(start()));
        let gateway = Arc::new(RecordingGateway::default());
        let gateways = Gateways {
            push: gateway.clone(),
            sms: gateway.clone(),
            email: gateway.clone(),
        };

        let services = Services::build(
            config,
            Database::in_memory(),
            Arc::new(FixedOracle { confidence }),
            gateways,
            engine.clone(),
            clock.clone(),
        )
        .await
        .expect("Failed to build services");

        Self {
            services,
            engine,
            clock,
            gateway,
        }
    }

    /// Register a citizen living at `location`.
    pub async fn resident(&self, email: &str, location: GeoPoint) -> User {
        self.services
            .users
            .register(CreateUser {
                name: "Resident".to_string(),
                email: email.to_string(),
                phone: Some("+919800000001".to_string()),
                device_token: Some(format!("device-{email}")),
                role: UserRole::Citizen,
                location,
                preferences: NotificationPreferences::default(),
            })
            .await
            .expect("Failed to register resident")
    }

    /// Register an expert far away from the coast.
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
            .expect("Failed to register expert");
        RequestContext::new(user.id, user.role)
    }

    /// Open a realtime connection for `user` joined to `rooms`.
    pub fn listen(&self, user: &User, rooms: &[Room]) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (handle, rx) = self.engine.connections.register(user.id);
        for room in rooms {
            self.engine.connections.join(&handle.id, *room).unwrap();
        }
        (handle, rx)
    }
}

pub fn ctx(user: &User) -> RequestContext {
    RequestContext::new(user.id, user.role)
}

/// 2026-03-10 06:00 UTC.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 6, 0, 0).unwrap()
}

/// Marina beach, Chennai.
pub fn coast() -> GeoPoint {
    GeoPoint::new(80.28, 13.08).unwrap()
}

/// A point roughly `km` kilometres north of [`coast`].
pub fn north_of_coast(km: f64) -> GeoPoint {
    GeoPoint::new(80.28, 13.08 + km / 111.2).unwrap()
}

pub fn submission(report_type: ReportType, severity: Severity, attachments: usize) -> SubmitReport {
    SubmitReport {
        report_type,
        severity,
        title: "Sea water over the promenade".to_string(),
        description: "Waves are breaking over the wall and flooding the road".to_string(),
        location: coast(),
        attachments: (0..attachments)
            .map(|i| Attachment {
                filename: format!("photo-{i}.jpg"),
                mime_type: "image/jpeg".to_string(),
                size_bytes: 2048,
                url: format!("s3://reports/photo-{i}.jpg"),
            })
            .collect(),
    }
}

pub fn alert_spec(severity: Severity, radius_km: f64) -> CreateAlert {
    CreateAlert {
        threat_type: ThreatType::Cyclone,
        severity,
        title: "Cyclone approaching".to_string(),
        description: "Gale force winds expected along the coast tonight".to_string(),
        center: coast(),
        radius_km,
        confidence: 75.0,
        ai_prediction: false,
        related_alerts: Vec::new(),
        source_report: None,
        recommendations: vec!["Stay indoors".to_string()],
        evacuation_zones: Vec::new(),
        ttl_hours: None,
    }
}

/// Every frame currently buffered on a connection, decoded.
pub fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<serde_json::Value> {
    let mut frames = Vec::new();
    while let Ok(text) = rx.try_recv() {
        frames.push(serde_json::from_str(&text).unwrap());
    }
    frames
}

/// Frames of one event kind.
pub fn events_of(frames: &[serde_json::Value], event: &str) -> Vec<serde_json::Value> {
    frames
        .iter()
        .filter(|f| f["type"] == "event" && f["event"] == event)
        .cloned()
        .collect()
}

/// Let spawned background work run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}
