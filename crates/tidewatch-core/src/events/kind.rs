//! Event kinds published to realtime rooms.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of lifecycle event carried by a realtime message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A new environmental reading was ingested.
    EnvironmentalUpdate,
    /// An alert was created.
    NewAlert,
    /// An alert was modified.
    AlertUpdated,
    /// An alert was deactivated.
    AlertDeactivated,
    /// A community report was submitted.
    NewReport,
    /// A report was escalated into an alert.
    AutoAlertGenerated,
    /// A notification was stored for a user.
    Notification,
}

impl EventKind {
    /// Wire name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EnvironmentalUpdate => "environmental_update",
            Self::NewAlert => "new_alert",
            Self::AlertUpdated => "alert_updated",
            Self::AlertDeactivated => "alert_deactivated",
            Self::NewReport => "new_report",
            Self::AutoAlertGenerated => "auto_alert_generated",
            Self::Notification => "notification",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_name_matches_as_str() {
        for kind in [
            EventKind::EnvironmentalUpdate,
            EventKind::NewAlert,
            EventKind::AlertUpdated,
            EventKind::AlertDeactivated,
            EventKind::NewReport,
            EventKind::AutoAlertGenerated,
            EventKind::Notification,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
