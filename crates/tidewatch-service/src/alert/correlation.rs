//! Historical correlation of a new alert with past ones.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use tidewatch_core::result::AppResult;
use tidewatch_database::repositories::AlertRepository;
use tidewatch_entity::alert::{CreateAlert, HistoricalCorrelation};

/// Summarises past alerts of the same type and severity near a new one.
#[derive(Debug, Clone)]
pub struct HistoricalCorrelator {
    alerts: Arc<AlertRepository>,
    radius_km: f64,
    window_years: i64,
}

impl HistoricalCorrelator {
    /// Creates a correlator looking `window_years` back within `radius_km`.
    pub fn new(alerts: Arc<AlertRepository>, radius_km: f64, window_years: i64) -> Self {
        Self {
            alerts,
            radius_km,
            window_years,
        }
    }

    /// Count and mean confidence of similar alerts.
    pub async fn correlate(
        &self,
        spec: &CreateAlert,
        now: DateTime<Utc>,
    ) -> AppResult<HistoricalCorrelation> {
        let since = now - Duration::days(365 * self.window_years);
        let similar = self
            .alerts
            .find_similar(spec.threat_type, spec.severity, &spec.center, self.radius_km, since)
            .await?;

        let mean_confidence = if similar.is_empty() {
            None
        } else {
            Some(similar.iter().map(|a| a.confidence).sum::<f64>() / similar.len() as f64)
        };

        Ok(HistoricalCorrelation {
            matching_alerts: similar.len() as u64,
            mean_confidence,
            radius_km: self.radius_km,
            window_years: self.window_years,
        })
    }
}
