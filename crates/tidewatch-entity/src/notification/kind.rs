//! Notification kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// An alert covering the user's location.
    Alert,
    /// A community report near the user.
    CommunityReport,
    /// The user's report was verified.
    Verification,
    /// Someone commented on the user's report.
    Comment,
    /// The user unlocked a badge.
    Achievement,
    /// Daily summary.
    Digest,
    /// Operational message.
    System,
}

impl NotificationKind {
    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::CommunityReport => "community_report",
            Self::Verification => "verification",
            Self::Comment => "comment",
            Self::Achievement => "achievement",
            Self::Digest => "digest",
            Self::System => "system",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
