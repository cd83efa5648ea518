//! Report type enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a community member observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// Wind, rain, storm conditions.
    Weather,
    /// Water on land.
    Flood,
    /// Unusual sea withdrawal or waves.
    Tsunami,
    /// Storm-driven sea level rise.
    StormSurge,
    /// Oil, chemicals, waste.
    Pollution,
    /// Shoreline loss.
    Erosion,
    /// Damage to roads, sea walls, buildings.
    Infrastructure,
    /// Anything else.
    Other,
}

impl ReportType {
    /// Return the type as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Flood => "flood",
            Self::Tsunami => "tsunami",
            Self::StormSurge => "storm_surge",
            Self::Pollution => "pollution",
            Self::Erosion => "erosion",
            Self::Infrastructure => "infrastructure",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = tidewatch_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weather" => Ok(Self::Weather),
            "flood" => Ok(Self::Flood),
            "tsunami" => Ok(Self::Tsunami),
            "storm_surge" => Ok(Self::StormSurge),
            "pollution" => Ok(Self::Pollution),
            "erosion" => Ok(Self::Erosion),
            "infrastructure" => Ok(Self::Infrastructure),
            "other" => Ok(Self::Other),
            _ => Err(tidewatch_core::AppError::validation(format!(
                "Invalid report type: '{s}'"
            ))),
        }
    }
}
