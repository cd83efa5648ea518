//! Alert entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use tidewatch_core::types::{AlertId, GeoPoint, ReportId};

use super::state::AlertState;
use super::threat::ThreatType;
use crate::severity::Severity;

/// A geofenced threat alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Unique alert identifier.
    pub id: AlertId,
    /// Kind of threat.
    pub threat_type: ThreatType,
    /// Threat level.
    pub severity: Severity,
    /// Short headline.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Geofence center.
    pub center: GeoPoint,
    /// Geofence radius in km.
    pub radius_km: f64,
    /// Confidence score, 0 to 100.
    pub confidence: f64,
    /// Whether the alert came from a model rather than a human.
    pub ai_prediction: bool,
    /// Weak references to related alerts.
    #[serde(default)]
    pub related_alerts: Vec<AlertId>,
    /// Report this alert was escalated from.
    pub source_report: Option<ReportId>,
    /// Actions residents should take.
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Evacuation zone guidance.
    #[serde(default)]
    pub evacuation_zones: Vec<String>,
    /// Historical correlation summary, absent if the lookup failed.
    pub correlation: Option<HistoricalCorrelation>,
    /// Explicit activity flag. Expiry is evaluated separately.
    pub active: bool,
    /// When the alert was created.
    pub created_at: DateTime<Utc>,
    /// When the alert was last modified.
    pub updated_at: DateTime<Utc>,
    /// When the alert stops being active.
    pub expires_at: DateTime<Utc>,
    /// When the alert was deactivated.
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// Effective lifecycle state at `now`.
    pub fn state_at(&self, now: DateTime<Utc>) -> AlertState {
        if !self.active {
            AlertState::Deactivated
        } else if self.expires_at <= now {
            AlertState::Expired
        } else {
            AlertState::Active
        }
    }

    /// Active flag set and not yet expired.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.state_at(now) == AlertState::Active
    }

    /// Whether `point` lies inside the geofence.
    pub fn covers(&self, point: &GeoPoint) -> bool {
        self.center.within(point, self.radius_km)
    }
}

/// Summary of comparable past alerts near the same place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalCorrelation {
    /// Same type and severity alerts found in the window.
    pub matching_alerts: u64,
    /// Mean confidence of those alerts.
    pub mean_confidence: Option<f64>,
    /// Search radius in km.
    pub radius_km: f64,
    /// Look-back window in years.
    pub window_years: i64,
}

/// Data required to create an alert.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAlert {
    /// Kind of threat.
    pub threat_type: ThreatType,
    /// Threat level.
    pub severity: Severity,
    /// Short headline.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Longer description.
    #[validate(length(max = 5000))]
    pub description: String,
    /// Geofence center.
    pub center: GeoPoint,
    /// Geofence radius in km.
    #[validate(range(exclusive_min = 0.0, max = 2000.0))]
    pub radius_km: f64,
    /// Confidence score, 0 to 100.
    #[validate(custom(function = "crate::score::validate_score"))]
    pub confidence: f64,
    /// Whether the alert came from a model.
    #[serde(default)]
    pub ai_prediction: bool,
    /// Related alerts.
    #[serde(default)]
    pub related_alerts: Vec<AlertId>,
    /// Report this alert was escalated from.
    #[serde(default)]
    pub source_report: Option<ReportId>,
    /// Actions residents should take.
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Evacuation zone guidance.
    #[serde(default)]
    pub evacuation_zones: Vec<String>,
    /// Lifetime in hours. The configured default applies when absent.
    #[validate(range(min = 1, max = 720))]
    pub ttl_hours: Option<i64>,
}

impl CreateAlert {
    /// Materialize the alert at `now` with the given fallback lifetime.
    pub fn into_alert(
        self,
        now: DateTime<Utc>,
        default_ttl_hours: i64,
        correlation: Option<HistoricalCorrelation>,
    ) -> Alert {
        let ttl = Duration::hours(self.ttl_hours.unwrap_or(default_ttl_hours));
        Alert {
            id: AlertId::new(),
            threat_type: self.threat_type,
            severity: self.severity,
            title: self.title,
            description: self.description,
            center: self.center,
            radius_km: self.radius_km,
            confidence: self.confidence,
            ai_prediction: self.ai_prediction,
            related_alerts: self.related_alerts,
            source_report: self.source_report,
            recommendations: self.recommendations,
            evacuation_zones: self.evacuation_zones,
            correlation,
            active: true,
            created_at: now,
            updated_at: now,
            expires_at: now + ttl,
            deactivated_at: None,
        }
    }
}

/// Partial update of an alert. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateAlert {
    /// New headline.
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    /// New description.
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    /// New severity.
    pub severity: Option<Severity>,
    /// New geofence radius.
    #[validate(range(exclusive_min = 0.0, max = 2000.0))]
    pub radius_km: Option<f64>,
    /// New confidence.
    #[validate(custom(function = "crate::score::validate_score"))]
    pub confidence: Option<f64>,
    /// New expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// Replacement related-alert list.
    pub related_alerts: Option<Vec<AlertId>>,
    /// Replacement recommendations.
    pub recommendations: Option<Vec<String>>,
    /// Activity flag. `false` deactivates; `true` is only a no-op on an
    /// already active alert.
    pub active: Option<bool>,
}

impl UpdateAlert {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.severity.is_none()
            && self.radius_km.is_none()
            && self.confidence.is_none()
            && self.expires_at.is_none()
            && self.related_alerts.is_none()
            && self.recommendations.is_none()
            && self.active.is_none()
    }

    /// Apply every present field except `active` to `alert`.
    pub fn apply_to(&self, alert: &mut Alert) {
        if let Some(title) = &self.title {
            alert.title = title.clone();
        }
        if let Some(description) = &self.description {
            alert.description = description.clone();
        }
        if let Some(severity) = self.severity {
            alert.severity = severity;
        }
        if let Some(radius) = self.radius_km {
            alert.radius_km = radius;
        }
        if let Some(confidence) = self.confidence {
            alert.confidence = confidence;
        }
        if let Some(expires_at) = self.expires_at {
            alert.expires_at = expires_at;
        }
        if let Some(related) = &self.related_alerts {
            alert.related_alerts = related.clone();
        }
        if let Some(recommendations) = &self.recommendations {
            alert.recommendations = recommendations.clone();
        }
    }
}
