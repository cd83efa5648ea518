//! Job executor that dispatches job runs to registered handlers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use tidewatch_core::error::{AppError, ErrorKind};

/// One triggered execution of a job type.
#[derive(Debug, Clone)]
pub struct JobRun {
    /// Run ID for log correlation
    pub id: Uuid,
    /// Handler key
    pub job_type: String,
    /// When the run was triggered
    pub triggered_at: DateTime<Utc>,
}

impl JobRun {
    /// A run of `job_type` triggered now.
    pub fn now(job_type: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_type: job_type.to_string(),
            triggered_at: Utc::now(),
        }
    }
}

/// Trait for job handler implementations
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Get the job type this handler processes
    fn job_type(&self) -> &str;

    /// Execute one run, returning an optional summary
    async fn execute(&self, run: &JobRun) -> Result<Option<Value>, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure, do not retry
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Transient failure; the next scheduled run may succeed
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

impl JobExecutionError {
    /// Classify a service error: degraded dependencies and timeouts are
    /// transient, everything else is carried as is.
    pub fn classify(err: AppError) -> Self {
        match err.kind {
            ErrorKind::DependencyDegraded | ErrorKind::ExternalService | ErrorKind::Timeout => {
                Self::Transient(err.to_string())
            }
            _ => Self::Internal(err),
        }
    }
}

/// Dispatches job runs to the appropriate handler based on job_type
#[derive(Debug, Default)]
pub struct JobExecutor {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl JobExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job handler
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        let job_type = handler.job_type().to_string();
        tracing::info!(job_type = %job_type, "Registered job handler");
        self.handlers.insert(job_type, handler);
    }

    /// Execute a run by dispatching to the correct handler
    pub async fn execute(&self, run: &JobRun) -> Result<Option<Value>, JobExecutionError> {
        let handler = self.handlers.get(&run.job_type).ok_or_else(|| {
            JobExecutionError::Permanent(format!(
                "No handler registered for job type '{}'",
                run.job_type
            ))
        })?;

        tracing::info!(run_id = %run.id, job_type = %run.job_type, "Executing job");

        handler.execute(run).await
    }

    /// Execute a run and log its outcome instead of returning it.
    pub async fn run_logged(&self, job_type: &str) {
        let run = JobRun::now(job_type);
        match self.execute(&run).await {
            Ok(summary) => {
                let summary = summary.unwrap_or_default();
                tracing::info!(
                    run_id = %run.id,
                    job_type,
                    summary = %summary,
                    "Job completed"
                );
            }
            Err(JobExecutionError::Transient(msg)) => {
                tracing::warn!(run_id = %run.id, job_type, error = %msg, "Job failed, will run again on schedule");
            }
            Err(e) => {
                tracing::error!(run_id = %run.id, job_type, error = %e, "Job failed");
            }
        }
    }

    /// Check if a handler is registered for a job type
    pub fn has_handler(&self, job_type: &str) -> bool {
        self.handlers.contains_key(job_type)
    }

    /// Get the list of registered job types
    pub fn registered_types(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Debug, Default)]
    struct CountingHandler {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl JobHandler for CountingHandler {
        fn job_type(&self) -> &str {
            "counting"
        }

        async fn execute(&self, _run: &JobRun) -> Result<Option<Value>, JobExecutionError> {
            let n = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Some(serde_json::json!({ "runs": n })))
        }
    }

    #[tokio::test]
    async fn test_dispatches_to_registered_handler() {
        let handler = Arc::new(CountingHandler::default());
        let mut executor = JobExecutor::new();
        executor.register(handler.clone());

        let summary = executor.execute(&JobRun::now("counting")).await.unwrap();
        assert_eq!(summary, Some(serde_json::json!({ "runs": 1 })));
        executor.run_logged("counting").await;
        assert_eq!(handler.runs.load(Ordering::SeqCst), 2);
        assert!(executor.has_handler("counting"));
        assert_eq!(executor.registered_types(), vec!["counting".to_string()]);
    }

    #[derive(Debug, Default)]
    struct QuietHandler {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl JobHandler for QuietHandler {
        fn job_type(&self) -> &str {
            "quiet"
        }

        async fn execute(&self, _run: &JobRun) -> Result<Option<Value>, JobExecutionError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_logged_run_without_summary() {
        let handler = Arc::new(QuietHandler::default());
        let mut executor = JobExecutor::new();
        executor.register(handler.clone());

        executor.run_logged("quiet").await;
        executor.run_logged("missing").await;

        assert_eq!(handler.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_job_type_is_permanent() {
        let executor = JobExecutor::new();
        let err = executor.execute(&JobRun::now("missing")).await.unwrap_err();
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }

    #[test]
    fn test_classify_service_errors() {
        assert!(matches!(
            JobExecutionError::classify(AppError::timeout("slow oracle")),
            JobExecutionError::Transient(_)
        ));
        assert!(matches!(
            JobExecutionError::classify(AppError::dependency_degraded("oracle down")),
            JobExecutionError::Transient(_)
        ));
        assert!(matches!(
            JobExecutionError::classify(AppError::database("store offline")),
            JobExecutionError::Internal(e) if e.is_fatal()
        ));
    }
}
