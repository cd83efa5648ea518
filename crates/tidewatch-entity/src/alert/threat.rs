//! Threat type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of coastal threat an alert describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatType {
    /// Tropical cyclone.
    Cyclone,
    /// Tsunami.
    Tsunami,
    /// Coastal flooding.
    Flood,
    /// Marine pollution.
    Pollution,
    /// Storm surge.
    StormSurge,
    /// Coastal erosion.
    Erosion,
    /// Anything else.
    Other,
}

impl ThreatType {
    /// Human-readable noun phrase used in alert titles.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Cyclone => "Cyclonic Storm",
            Self::Tsunami => "Tsunami Warning",
            Self::Flood => "Coastal Flooding",
            Self::Pollution => "Marine Pollution",
            Self::StormSurge => "Storm Surge",
            Self::Erosion => "Coastal Erosion",
            Self::Other => "Coastal Threat",
        }
    }

    /// Return the threat type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cyclone => "cyclone",
            Self::Tsunami => "tsunami",
            Self::Flood => "flood",
            Self::Pollution => "pollution",
            Self::StormSurge => "storm_surge",
            Self::Erosion => "erosion",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ThreatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ThreatType {
    type Err = tidewatch_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cyclone" => Ok(Self::Cyclone),
            "tsunami" => Ok(Self::Tsunami),
            "flood" => Ok(Self::Flood),
            "pollution" => Ok(Self::Pollution),
            "storm_surge" => Ok(Self::StormSurge),
            "erosion" => Ok(Self::Erosion),
            "other" => Ok(Self::Other),
            _ => Err(tidewatch_core::AppError::validation(format!(
                "Invalid threat type: '{s}'. Expected one of: cyclone, tsunami, flood, \
                 pollution, storm_surge, erosion, other"
            ))),
        }
    }
}
