//! Alert lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Alert lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Lifetime of an alert when the caller gives no duration, in hours.
    #[serde(default = "default_ttl_hours")]
    pub default_ttl_hours: i64,
    /// Radius for historical correlation lookups, in km.
    #[serde(default = "default_correlation_radius_km")]
    pub correlation_radius_km: f64,
    /// How far back historical correlation looks, in years.
    #[serde(default = "default_correlation_years")]
    pub correlation_years: i64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            default_ttl_hours: default_ttl_hours(),
            correlation_radius_km: default_correlation_radius_km(),
            correlation_years: default_correlation_years(),
        }
    }
}

fn default_ttl_hours() -> i64 {
    24
}

fn default_correlation_radius_km() -> f64 {
    100.0
}

fn default_correlation_years() -> i64 {
    5
}
