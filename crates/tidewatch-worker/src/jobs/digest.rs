//! Daily digest job.

use async_trait::async_trait;
use serde_json::Value;

use tidewatch_service::environment::DigestService;

use crate::executor::{JobExecutionError, JobHandler, JobRun};

/// Job type key of the digest.
pub const DAILY_DIGEST: &str = "daily_digest";

/// Sends each user at most one digest of nearby active alerts per day
#[derive(Debug, Clone)]
pub struct DailyDigestJobHandler {
    digest: DigestService,
}

impl DailyDigestJobHandler {
    pub fn new(digest: DigestService) -> Self {
        Self { digest }
    }
}

#[async_trait]
impl JobHandler for DailyDigestJobHandler {
    fn job_type(&self) -> &str {
        DAILY_DIGEST
    }

    async fn execute(&self, run: &JobRun) -> Result<Option<Value>, JobExecutionError> {
        let outcome = self
            .digest
            .run_daily_digest()
            .await
            .map_err(JobExecutionError::classify)?;

        tracing::info!(
            run_id = %run.id,
            considered = outcome.users_considered,
            sent = outcome.sent,
            skipped = outcome.skipped,
            failed = outcome.failed,
            "Daily digest finished"
        );

        let summary = serde_json::to_value(outcome)
            .map_err(|e| JobExecutionError::Internal(e.into()))?;
        Ok(Some(summary))
    }
}
