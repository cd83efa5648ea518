//! Alert lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Effective state of an alert at a given instant.
///
/// `Expired` and `Deactivated` are terminal and absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
    /// Active and not yet expired.
    Active,
    /// Past its `expires_at`.
    Expired,
    /// Explicitly switched off.
    Deactivated,
}

impl AlertState {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Deactivated => "deactivated",
        }
    }
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
