//! Report verification status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verification workflow:
/// `pending → processing → verified | rejected → resolved`.
///
/// A pending report may also be decided directly when analysis never
/// arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Stored, awaiting analysis.
    Pending,
    /// Analysis attached, awaiting a human decision.
    Processing,
    /// Confirmed by an expert.
    Verified,
    /// Dismissed by an expert.
    Rejected,
    /// Closed out.
    Resolved,
}

impl ReportStatus {
    /// Whether an expert has decided the report.
    pub fn is_decided(&self) -> bool {
        matches!(self, Self::Verified | Self::Rejected | Self::Resolved)
    }

    /// Whether `next` is a legal successor.
    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Pending | Self::Processing, Self::Verified | Self::Rejected)
                | (Self::Verified | Self::Rejected, Self::Resolved)
        )
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
