//! Notification priority levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::severity::Severity;

/// Delivery priority, ordered `Low < Normal < High < Emergency`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    /// Informational.
    Low,
    /// Default.
    #[default]
    Normal,
    /// Important.
    High,
    /// Life safety. Bypasses every throttling rule.
    Emergency,
}

impl NotificationPriority {
    /// Priority matching an alert severity.
    pub fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Low => Self::Low,
            Severity::Medium => Self::Normal,
            Severity::High => Self::High,
            Severity::Critical => Self::Emergency,
        }
    }

    /// Whether every opted-in channel must be attempted.
    pub fn bypasses_throttling(&self) -> bool {
        matches!(self, Self::Emergency)
    }

    /// Return the priority as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Emergency => "emergency",
        }
    }
}

impl fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationPriority {
    type Err = tidewatch_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "emergency" | "critical" => Ok(Self::Emergency),
            _ => Err(tidewatch_core::AppError::validation(format!(
                "Invalid notification priority: '{s}'"
            ))),
        }
    }
}
