//! Remote AI service provider.

mod wire;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use tidewatch_core::config::oracle::OracleConfig;
use tidewatch_core::error::{AppError, ErrorKind};
use tidewatch_core::result::AppResult;
use tidewatch_entity::alert::CreateAlert;
use tidewatch_entity::environment::EnvironmentalReading;
use tidewatch_entity::report::{AiAnalysis, Report};

use crate::provider::ScoringOracle;

use self::wire::{AlertDecision, GenerateAlertRequest, ReportAnalysisRequest, ReportAnalysisResponse};

/// Oracle backed by the remote AI service's `/analyze-report` and
/// `/generate-alert` endpoints.
#[derive(Debug, Clone)]
pub struct HttpOracle {
    client: reqwest::Client,
    base_url: String,
    alert_radius_km: f64,
}

impl HttpOracle {
    /// Build the client with the configured per-request timeout.
    pub fn new(config: &OracleConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build oracle HTTP client", e)
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            alert_radius_km: config.sweep_alert_radius_km,
        })
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> AppResult<R> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(format!(
                "Oracle returned HTTP {} for {url}",
                status.as_u16()
            )));
        }

        response.json::<R>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Invalid oracle response from {url}"),
                e,
            )
        })
    }
}

fn request_error(url: &str, e: reqwest::Error) -> AppError {
    let kind = if e.is_timeout() {
        ErrorKind::Timeout
    } else {
        ErrorKind::ExternalService
    };
    AppError::with_source(kind, format!("Oracle request to {url} failed"), e)
}

#[async_trait]
impl ScoringOracle for HttpOracle {
    async fn analyze_report(&self, report: &Report) -> AppResult<AiAnalysis> {
        let request = ReportAnalysisRequest::from_report(report);
        let response: ReportAnalysisResponse = self.post("/analyze-report", &request).await?;
        debug!(report_id = %report.id, confidence = response.confidence, "Remote report analysis received");
        Ok(response.into_analysis(Utc::now()))
    }

    async fn analyze_global_threats(
        &self,
        readings: &[EnvironmentalReading],
    ) -> AppResult<Vec<CreateAlert>> {
        let mut alerts = Vec::new();
        let mut failures = 0usize;
        let mut last_error = None;

        for reading in readings {
            let request = GenerateAlertRequest::from_reading(reading);
            let outcome = self
                .post::<_, AlertDecision>("/generate-alert", &request)
                .await
                .and_then(|decision| decision.into_alert(reading, self.alert_radius_km));
            match outcome {
                Ok(Some(alert)) => alerts.push(alert),
                Ok(None) => {}
                Err(e) => {
                    warn!(station_id = %reading.station_id, error = %e, "Remote threat analysis failed");
                    failures += 1;
                    last_error = Some(e);
                }
            }
        }

        // Only a sweep where every call failed is an error.
        match last_error {
            Some(e) if failures == readings.len() => Err(e),
            _ => Ok(alerts),
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
