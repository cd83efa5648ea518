//! Alert lifecycle service.
//!
//! Alerts move from active to a terminal state (expired or deactivated) and
//! never come back. Expiry is never written: every read compares
//! `expires_at` with the clock.

use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use tidewatch_core::error::AppError;
use tidewatch_core::events::{EventKind, Room};
use tidewatch_core::result::AppResult;
use tidewatch_core::traits::{Clock, EventPublisher, Repository};
use tidewatch_core::types::geo::validate_radius;
use tidewatch_core::types::{AlertId, GeoPoint};
use tidewatch_database::repositories::AlertRepository;
use tidewatch_entity::alert::{Alert, AlertState, CreateAlert, UpdateAlert};
use tidewatch_entity::notification::{NotificationKind, NotificationPriority, OutboundMessage};
use tidewatch_oracle::content::{self, EvacuationRoute};

use super::correlation::HistoricalCorrelator;
use crate::notification::NotificationDispatcher;

/// Creates, patches and deactivates alerts, broadcasting every change.
#[derive(Debug, Clone)]
pub struct AlertService {
    alerts: Arc<AlertRepository>,
    correlator: HistoricalCorrelator,
    dispatcher: NotificationDispatcher,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    default_ttl_hours: i64,
}

impl AlertService {
    /// Creates a new alert service.
    pub fn new(
        alerts: Arc<AlertRepository>,
        correlator: HistoricalCorrelator,
        dispatcher: NotificationDispatcher,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        default_ttl_hours: i64,
    ) -> Self {
        Self {
            alerts,
            correlator,
            dispatcher,
            publisher,
            clock,
            default_ttl_hours,
        }
    }

    /// Create an alert, broadcast `new_alert` and notify users in the geofence.
    pub async fn create(&self, spec: CreateAlert) -> AppResult<Alert> {
        self.create_with(spec, None, EventKind::NewAlert).await
    }

    /// Create an alert escalated from a report under a pre-claimed id and
    /// broadcast `auto_alert_generated`.
    pub async fn create_escalated(&self, spec: CreateAlert, id: AlertId) -> AppResult<Alert> {
        self.create_with(spec, Some(id), EventKind::AutoAlertGenerated)
            .await
    }

    async fn create_with(
        &self,
        spec: CreateAlert,
        id: Option<AlertId>,
        kind: EventKind,
    ) -> AppResult<Alert> {
        spec.validate()?;
        let now = self.clock.now();

        let correlation = match self.correlator.correlate(&spec, now).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(error = %e, "Historical correlation unavailable");
                None
            }
        };

        let mut alert = spec.into_alert(now, self.default_ttl_hours, correlation);
        if let Some(id) = id {
            alert.id = id;
        }
        let alert = self.alerts.create(&alert).await?;

        info!(
            alert_id = %alert.id,
            threat = %alert.threat_type,
            severity = %alert.severity,
            radius_km = alert.radius_km,
            expires_at = %alert.expires_at,
            "Alert created"
        );

        self.broadcast(&alert, kind);
        let message = OutboundMessage::new(
            NotificationKind::Alert,
            alert.title.clone(),
            alert_body(&alert),
        )
        .with_priority(NotificationPriority::from_severity(alert.severity))
        .with_alert(alert.id);
        self.notify_affected(&alert, &message).await;

        Ok(alert)
    }

    /// Apply a partial update.
    ///
    /// Terminal alerts reject every patch. `active: false` deactivates;
    /// `active: true` is a no-op on a live alert.
    pub async fn update(&self, id: &AlertId, patch: UpdateAlert) -> AppResult<Alert> {
        patch.validate()?;
        if patch.is_empty() {
            return Err(AppError::validation("Alert update contains no fields"));
        }
        if patch.active == Some(false) && is_only_deactivation(&patch) {
            return self.deactivate(id).await;
        }

        let now = self.clock.now();
        let (deactivated, alert) = self
            .alerts
            .update_with(id, |alert| {
                match alert.state_at(now) {
                    AlertState::Active => {}
                    state => {
                        return Err(AppError::conflict(format!(
                            "Alert {} is {} and can no longer change",
                            alert.id,
                            state.as_str()
                        )));
                    }
                }

                patch.apply_to(alert);
                if alert.expires_at <= alert.created_at {
                    return Err(AppError::validation(
                        "Alert expiry must be after its creation time",
                    ));
                }
                alert.updated_at = now;

                let deactivate = patch.active == Some(false);
                if deactivate {
                    alert.active = false;
                    alert.deactivated_at = Some(now);
                }
                Ok(deactivate)
            })
            .await?;

        if deactivated {
            info!(alert_id = %alert.id, "Alert deactivated by update");
            self.announce_deactivation(&alert).await;
        } else {
            info!(alert_id = %alert.id, "Alert updated");
            self.broadcast(&alert, EventKind::AlertUpdated);
            let message = OutboundMessage::new(
                NotificationKind::Alert,
                format!("Updated: {}", alert.title),
                alert_body(&alert),
            )
            .with_priority(NotificationPriority::from_severity(alert.severity))
            .with_alert(alert.id);
            self.notify_affected(&alert, &message).await;
        }
        Ok(alert)
    }

    /// Deactivate an alert. Idempotent; a second call changes nothing and
    /// broadcasts nothing.
    pub async fn deactivate(&self, id: &AlertId) -> AppResult<Alert> {
        let now = self.clock.now();
        let (changed, alert) = self
            .alerts
            .update_with(id, |alert| {
                if !alert.active {
                    return Ok(false);
                }
                alert.active = false;
                alert.deactivated_at = Some(now);
                alert.updated_at = now;
                Ok(true)
            })
            .await?;

        if changed {
            info!(alert_id = %alert.id, "Alert deactivated");
            self.announce_deactivation(&alert).await;
        }
        Ok(alert)
    }

    /// Get one alert.
    pub async fn get(&self, id: &AlertId) -> AppResult<Alert> {
        self.alerts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Alert {id} not found")))
    }

    /// Alerts that are active and not expired, newest first.
    pub async fn list_active(&self) -> AppResult<Vec<Alert>> {
        self.alerts.find_active(self.clock.now()).await
    }

    /// Active alerts whose center lies within `radius_km` of `point`.
    pub async fn list_active_near(&self, point: &GeoPoint, radius_km: f64) -> AppResult<Vec<Alert>> {
        validate_radius(radius_km)?;
        self.alerts
            .find_active_near(point, radius_km, self.clock.now())
            .await
    }

    /// Routes out of `point`, empty unless an active alert covers it.
    pub async fn evacuation_routes(&self, point: &GeoPoint) -> AppResult<Vec<EvacuationRoute>> {
        let active = self.alerts.find_active(self.clock.now()).await?;
        if active.iter().any(|alert| alert.covers(point)) {
            Ok(content::evacuation_routes(point))
        } else {
            Ok(Vec::new())
        }
    }

    async fn announce_deactivation(&self, alert: &Alert) {
        self.broadcast(alert, EventKind::AlertDeactivated);
        let message = OutboundMessage::new(
            NotificationKind::Alert,
            format!("Lifted: {}", alert.title),
            "This alert is no longer in effect.",
        )
        .with_alert(alert.id);
        self.notify_affected(alert, &message).await;
    }

    fn broadcast(&self, alert: &Alert, kind: EventKind) {
        match serde_json::to_value(alert) {
            Ok(payload) => {
                let rooms = Room::covering(&alert.center, alert.radius_km);
                self.publisher.publish_many(&rooms, kind, payload);
            }
            Err(e) => warn!(alert_id = %alert.id, error = %e, "Failed to serialize alert event"),
        }
    }

    async fn notify_affected(&self, alert: &Alert, message: &OutboundMessage) {
        let audience = match self.dispatcher.rules().alert_audience(alert).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(alert_id = %alert.id, error = %e, "Alert audience lookup failed");
                return;
            }
        };
        if audience.is_empty() {
            return;
        }
        if let Err(e) = self.dispatcher.send_bulk(&audience, message).await {
            warn!(alert_id = %alert.id, error = %e, "Alert notification fan-out failed");
        }
    }
}

fn is_only_deactivation(patch: &UpdateAlert) -> bool {
    UpdateAlert {
        active: None,
        ..patch.clone()
    }
    .is_empty()
}

fn alert_body(alert: &Alert) -> String {
    if alert.description.is_empty() {
        format!(
            "{} within {:.0} km. In effect until {}.",
            alert.threat_type.title(),
            alert.radius_km,
            alert.expires_at.format("%Y-%m-%d %H:%M UTC")
        )
    } else {
        alert.description.clone()
    }
}
