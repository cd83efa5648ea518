//! Global threat sweep.
//!
//! Each sweep claims the readings it assesses, so two sweeps running at the
//! same time never turn one reading into two alerts.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use tidewatch_core::error::{AppError, ErrorKind};
use tidewatch_core::result::AppResult;
use tidewatch_core::traits::Clock;
use tidewatch_database::repositories::ReadingRepository;
use tidewatch_oracle::ScoringOracle;

use crate::alert::AlertService;

/// Counters for one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepOutcome {
    /// Readings claimed and handed to the oracle.
    pub assessed: usize,
    /// Alerts created from the oracle's output.
    pub alerts_created: usize,
}

/// Turns fresh readings into alerts through the scoring oracle.
#[derive(Debug, Clone)]
pub struct ThreatSweepService {
    readings: Arc<ReadingRepository>,
    oracle: Arc<dyn ScoringOracle>,
    alerts: AlertService,
    clock: Arc<dyn Clock>,
    oracle_timeout: Duration,
}

impl ThreatSweepService {
    /// Creates a new sweep service.
    pub fn new(
        readings: Arc<ReadingRepository>,
        oracle: Arc<dyn ScoringOracle>,
        alerts: AlertService,
        clock: Arc<dyn Clock>,
        oracle_timeout: Duration,
    ) -> Self {
        Self {
            readings,
            oracle,
            alerts,
            clock,
            oracle_timeout,
        }
    }

    /// Assess every unclaimed latest reading and create the alerts the oracle
    /// asks for.
    ///
    /// Claimed readings are not reassessed even when the oracle fails.
    pub async fn run_sweep(&self) -> AppResult<SweepOutcome> {
        let now = self.clock.now();
        let mut batch = Vec::new();
        for reading in self.readings.latest_all().await? {
            if self.readings.claim_for_assessment(reading.id, now).await? {
                batch.push(reading);
            }
        }

        let mut outcome = SweepOutcome {
            assessed: batch.len(),
            ..SweepOutcome::default()
        };
        if batch.is_empty() {
            debug!("Threat sweep found no new readings");
            return Ok(outcome);
        }

        let specs = match tokio::time::timeout(
            self.oracle_timeout,
            self.oracle.analyze_global_threats(&batch),
        )
        .await
        {
            Ok(Ok(specs)) => specs,
            Ok(Err(e)) => {
                warn!(oracle = self.oracle.name(), error = %e, "Threat assessment failed");
                return Err(AppError::with_source(
                    ErrorKind::DependencyDegraded,
                    "Threat assessment failed",
                    e,
                ));
            }
            Err(_) => {
                warn!(oracle = self.oracle.name(), "Threat assessment timed out");
                return Err(AppError::timeout("Threat assessment timed out"));
            }
        };

        for spec in specs {
            match self.alerts.create(spec).await {
                Ok(alert) => {
                    outcome.alerts_created += 1;
                    debug!(alert_id = %alert.id, "Sweep alert created");
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!(error = %e, "Sweep alert rejected"),
            }
        }

        info!(
            assessed = outcome.assessed,
            alerts_created = outcome.alerts_created,
            "Threat sweep finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use tidewatch_entity::Severity;

    use crate::testing::{Harness, ScriptedOracle, alert_spec, reading};

    #[tokio::test]
    async fn test_concurrent_sweeps_assess_each_reading_once() {
        let oracle = ScriptedOracle::with_confidence(50.0);
        *oracle.threats.lock().unwrap() = vec![alert_spec(Severity::High, 30.0)];
        let h = Harness::with_oracle(oracle).await;
        h.services
            .environment
            .record_reading(reading("station-1", 90.0, 985.0))
            .await
            .unwrap();

        let (a, b) = tokio::join!(h.services.sweep.run_sweep(), h.services.sweep.run_sweep());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.assessed + b.assessed, 1);
        assert_eq!(a.alerts_created + b.alerts_created, 1);

        let again = h.services.sweep.run_sweep().await.unwrap();
        assert_eq!(again.assessed, 0);
        assert_eq!(h.services.alerts.list_active().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_sweep_skips_oracle() {
        let h = Harness::new().await;
        let outcome = h.services.sweep.run_sweep().await.unwrap();
        assert_eq!(outcome, super::SweepOutcome::default());
    }
}
