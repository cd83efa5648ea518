//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod alert;
pub mod app;
pub mod logging;
pub mod notification;
pub mod oracle;
pub mod realtime;
pub mod report;
pub mod worker;

use serde::{Deserialize, Serialize};

use self::alert::AlertsConfig;
use self::app::ServerConfig;
use self::logging::LoggingConfig;
use self::notification::NotificationsConfig;
use self::oracle::OracleConfig;
use self::realtime::RealtimeConfig;
use self::report::{GamificationConfig, ReportsConfig};
use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Realtime fanout settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Notification dispatch settings.
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Alert lifecycle settings.
    #[serde(default)]
    pub alerts: AlertsConfig,
    /// Report pipeline settings.
    #[serde(default)]
    pub reports: ReportsConfig,
    /// Gamification settings.
    #[serde(default)]
    pub gamification: GamificationConfig,
    /// Scoring oracle settings.
    #[serde(default)]
    pub oracle: OracleConfig,
    /// Cron scheduler settings.
    #[serde(default)]
    pub worker: WorkerConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `TIDEWATCH_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TIDEWATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
