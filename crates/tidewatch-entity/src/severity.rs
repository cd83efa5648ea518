//! Threat severity shared by alerts and reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Totally ordered threat level: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Minor, localized impact.
    Low,
    /// Noticeable impact, caution advised.
    Medium,
    /// Significant danger.
    High,
    /// Life-threatening.
    Critical,
}

impl Severity {
    /// Every severity, lowest first.
    pub const ALL: [Severity; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Numeric rank, 1 (low) to 4 (critical).
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Adjective used in generated alert titles.
    pub fn adjective(&self) -> &'static str {
        match self {
            Self::Low => "Minor",
            Self::Medium => "Moderate",
            Self::High => "Severe",
            Self::Critical => "Critical",
        }
    }

    /// Return the severity as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = tidewatch_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(tidewatch_core::AppError::validation(format!(
                "Invalid severity: '{s}'. Expected one of: low, medium, high, critical"
            ))),
        }
    }
}
