//! Oracle trait and the manager that dispatches to the configured provider.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use tidewatch_core::config::oracle::OracleConfig;
use tidewatch_core::error::AppError;
use tidewatch_core::result::AppResult;
use tidewatch_entity::alert::CreateAlert;
use tidewatch_entity::environment::EnvironmentalReading;
use tidewatch_entity::report::{AiAnalysis, Report};

use crate::heuristic::HeuristicOracle;
use crate::http::HttpOracle;

/// Black-box scoring contract used by report ingestion and the threat sweep.
#[async_trait]
pub trait ScoringOracle: Send + Sync + fmt::Debug {
    /// Score one community report.
    async fn analyze_report(&self, report: &Report) -> AppResult<AiAnalysis>;

    /// Turn the given readings into zero or more alert specs.
    async fn analyze_global_threats(
        &self,
        readings: &[EnvironmentalReading],
    ) -> AppResult<Vec<CreateAlert>>;

    /// Provider name for logs.
    fn name(&self) -> &'static str;
}

/// Oracle manager that wraps the configured provider.
#[derive(Clone)]
pub struct OracleManager {
    inner: Arc<dyn ScoringOracle>,
}

impl fmt::Debug for OracleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleManager")
            .field("provider", &self.inner.name())
            .finish()
    }
}

impl OracleManager {
    /// Create a manager from configuration.
    pub fn new(config: &OracleConfig) -> AppResult<Self> {
        let inner: Arc<dyn ScoringOracle> = match config.provider.as_str() {
            "heuristic" => {
                info!("Initializing heuristic scoring oracle");
                Arc::new(HeuristicOracle::new(config))
            }
            "http" => {
                info!(base_url = %config.base_url, "Initializing HTTP scoring oracle");
                Arc::new(HttpOracle::new(config)?)
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown oracle provider: '{other}'. Supported: heuristic, http"
                )));
            }
        };
        Ok(Self { inner })
    }

    /// Create a manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn ScoringOracle>) -> Self {
        Self { inner: provider }
    }
}

#[async_trait]
impl ScoringOracle for OracleManager {
    async fn analyze_report(&self, report: &Report) -> AppResult<AiAnalysis> {
        self.inner.analyze_report(report).await
    }

    async fn analyze_global_threats(
        &self,
        readings: &[EnvironmentalReading],
    ) -> AppResult<Vec<CreateAlert>> {
        self.inner.analyze_global_threats(readings).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewatch_core::error::ErrorKind;

    #[test]
    fn test_unknown_provider_is_configuration_error() {
        let config = OracleConfig {
            provider: "tarot".to_string(),
            ..OracleConfig::default()
        };
        let err = OracleManager::new(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_default_provider_is_heuristic() {
        let manager = OracleManager::new(&OracleConfig::default()).unwrap();
        assert_eq!(manager.name(), "heuristic");
    }
}
