//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tidewatch_core::types::{AchievementId, AlertId, NotificationId, ReportId, UserId};

use super::delivery::ChannelDeliveries;
use super::kind::NotificationKind;
use super::priority::NotificationPriority;

/// A message stored for one user, with per-channel delivery outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// Recipient.
    pub user_id: UserId,
    /// Title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// What it is about.
    pub kind: NotificationKind,
    /// Delivery priority.
    pub priority: NotificationPriority,
    /// Owned per-channel delivery records.
    pub channels: ChannelDeliveries,
    /// Weak references to related aggregates.
    pub metadata: NotificationMetadata,
    /// Whether the user read it.
    pub is_read: bool,
    /// When the user read it.
    pub read_at: Option<DateTime<Utc>>,
    /// When it was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build the stored record for `message` addressed to `user_id`.
    pub fn new(
        user_id: UserId,
        message: &OutboundMessage,
        channels: ChannelDeliveries,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            title: message.title.clone(),
            message: message.body.clone(),
            kind: message.kind,
            priority: message.priority,
            channels,
            metadata: message.metadata.clone(),
            is_read: false,
            read_at: None,
            created_at: now,
        }
    }

    /// Mark as read. Returns `false` if it already was.
    pub fn mark_read(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_read {
            return false;
        }
        self.is_read = true;
        self.read_at = Some(now);
        true
    }
}

/// Ids of the aggregates a notification refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMetadata {
    /// Related alert.
    pub alert_id: Option<AlertId>,
    /// Related report.
    pub report_id: Option<ReportId>,
    /// Unlocked achievement.
    pub achievement_id: Option<AchievementId>,
}

/// A message to deliver, independent of recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// What it is about.
    pub kind: NotificationKind,
    /// Delivery priority.
    pub priority: NotificationPriority,
    /// Weak references to related aggregates.
    #[serde(default)]
    pub metadata: NotificationMetadata,
}

impl OutboundMessage {
    /// A normal-priority message.
    pub fn new(kind: NotificationKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            kind,
            priority: NotificationPriority::Normal,
            metadata: NotificationMetadata::default(),
        }
    }

    /// Override the priority.
    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Attach an alert reference.
    pub fn with_alert(mut self, alert_id: AlertId) -> Self {
        self.metadata.alert_id = Some(alert_id);
        self
    }

    /// Attach a report reference.
    pub fn with_report(mut self, report_id: ReportId) -> Self {
        self.metadata.report_id = Some(report_id);
        self
    }

    /// Attach an achievement reference.
    pub fn with_achievement(mut self, achievement_id: AchievementId) -> Self {
        self.metadata.achievement_id = Some(achievement_id);
        self
    }
}
