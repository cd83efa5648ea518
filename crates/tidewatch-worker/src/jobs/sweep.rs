//! Global threat sweep job.

use async_trait::async_trait;
use serde_json::Value;

use tidewatch_service::environment::ThreatSweepService;

use crate::executor::{JobExecutionError, JobHandler, JobRun};

/// Job type key of the sweep.
pub const THREAT_SWEEP: &str = "threat_sweep";

/// Runs the global threat sweep
#[derive(Debug, Clone)]
pub struct ThreatSweepJobHandler {
    sweep: ThreatSweepService,
}

impl ThreatSweepJobHandler {
    pub fn new(sweep: ThreatSweepService) -> Self {
        Self { sweep }
    }
}

#[async_trait]
impl JobHandler for ThreatSweepJobHandler {
    fn job_type(&self) -> &str {
        THREAT_SWEEP
    }

    async fn execute(&self, run: &JobRun) -> Result<Option<Value>, JobExecutionError> {
        let outcome = self
            .sweep
            .run_sweep()
            .await
            .map_err(JobExecutionError::classify)?;

        tracing::info!(
            run_id = %run.id,
            assessed = outcome.assessed,
            alerts_created = outcome.alerts_created,
            "Threat sweep finished"
        );

        let summary = serde_json::to_value(outcome)
            .map_err(|e| JobExecutionError::Internal(e.into()))?;
        Ok(Some(summary))
    }
}
