//! Cron scheduler for the threat sweep and the daily digest.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use tidewatch_core::config::worker::WorkerConfig;
use tidewatch_core::error::AppError;
use tidewatch_service::state::Services;

use crate::executor::JobExecutor;
use crate::jobs::digest::DAILY_DIGEST;
use crate::jobs::sweep::THREAT_SWEEP;
use crate::jobs::{DailyDigestJobHandler, ThreatSweepJobHandler};

/// Cron-based scheduler for the periodic entry points
pub struct CronScheduler {
    scheduler: JobScheduler,
    executor: Arc<JobExecutor>,
    config: WorkerConfig,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("jobs", &self.executor.registered_types())
            .finish()
    }
}

impl CronScheduler {
    /// Create a scheduler over an executor
    pub async fn new(executor: Arc<JobExecutor>, config: WorkerConfig) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            executor,
            config,
        })
    }

    /// Create a scheduler with the sweep and digest handlers registered
    pub async fn for_services(services: &Services, config: WorkerConfig) -> Result<Self, AppError> {
        let mut executor = JobExecutor::new();
        executor.register(Arc::new(ThreatSweepJobHandler::new(services.sweep.clone())));
        executor.register(Arc::new(DailyDigestJobHandler::new(services.digest.clone())));
        Self::new(Arc::new(executor), config).await
    }

    /// Register the configured schedules
    pub async fn register_default_tasks(&self) -> Result<(), AppError> {
        let sweep = self.config.threat_sweep_schedule.clone();
        let digest = self.config.daily_digest_schedule.clone();
        self.register(THREAT_SWEEP, &sweep).await?;
        self.register(DAILY_DIGEST, &digest).await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Trigger `job_type` on a cron `schedule`
    pub async fn register(&self, job_type: &'static str, schedule: &str) -> Result<(), AppError> {
        if !self.executor.has_handler(job_type) {
            return Err(AppError::configuration(format!(
                "No handler registered for scheduled job '{job_type}'"
            )));
        }

        let executor = Arc::clone(&self.executor);
        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            Box::pin(async move {
                executor.run_logged(job_type).await;
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid schedule '{schedule}' for {job_type}: {e}"
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add {job_type} schedule: {}", e))
        })?;

        tracing::info!(job_type, schedule, "Registered scheduled job");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&self) -> Result<(), AppError> {
        let mut scheduler = self.scheduler.clone();
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use tidewatch_core::error::ErrorKind;
    use tidewatch_core::traits::ManualClock;

    use super::*;
    use crate::jobs::testing;

    #[tokio::test]
    async fn test_registers_configured_schedules() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 10, 6, 0, 0).unwrap()));
        let services = testing::services(clock).await;
        let scheduler = CronScheduler::for_services(&services, WorkerConfig::default())
            .await
            .unwrap();

        scheduler.register_default_tasks().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_bad_schedule_and_unknown_job() {
        let scheduler = CronScheduler::new(Arc::new(JobExecutor::new()), WorkerConfig::default())
            .await
            .unwrap();
        let err = scheduler.register(THREAT_SWEEP, "0 */15 * * * *").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);

        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 10, 6, 0, 0).unwrap()));
        let services = testing::services(clock).await;
        let scheduler = CronScheduler::for_services(&services, WorkerConfig::default())
            .await
            .unwrap();
        assert!(scheduler.register(THREAT_SWEEP, "every now and then").await.is_err());
    }
}
