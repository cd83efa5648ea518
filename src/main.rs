//! Tidewatch server: coastal threat alerting
//!
//! Main entry point that wires all crates together and runs until interrupted.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use tidewatch_core::config::AppConfig;
use tidewatch_core::error::AppError;
use tidewatch_core::traits::SystemClock;
use tidewatch_database::Database;
use tidewatch_oracle::OracleManager;
use tidewatch_realtime::RealtimeEngine;
use tidewatch_service::notification::Gateways;
use tidewatch_service::state::Services;
use tidewatch_worker::CronScheduler;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("TIDEWATCH_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Tidewatch");

    // ── Step 1: Store and scoring oracle ─────────────────────────
    let db = Database::in_memory();
    let oracle = Arc::new(OracleManager::new(&config.oracle)?);

    // ── Step 2: Realtime engine ──────────────────────────────────
    let engine = Arc::new(RealtimeEngine::new(config.realtime.clone()));
    engine.start();

    // ── Step 3: Services ─────────────────────────────────────────
    let services = Services::build(
        config.clone(),
        db,
        oracle,
        Gateways::logging(),
        engine.clone(),
        Arc::new(SystemClock),
    )
    .await?;
    tracing::info!("Services initialized");

    let shutdown = CancellationToken::new();

    // ── Step 4: WebSocket listener ───────────────────────────────
    let ws_handle = if config.server.websocket_enabled {
        let addr = config.server.bind_address();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;
        let engine = engine.clone();
        let token = shutdown.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = tidewatch_realtime::ws::serve(listener, engine, token).await {
                tracing::error!(error = %e, "WebSocket listener failed");
            }
        }))
    } else {
        tracing::info!("WebSocket listener disabled");
        None
    };

    // ── Step 5: Cron scheduler ───────────────────────────────────
    let scheduler = if config.worker.enabled {
        let scheduler = CronScheduler::for_services(&services, config.worker.clone()).await?;
        scheduler.register_default_tasks().await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Cron scheduler disabled");
        None
    };

    // ── Step 6: Wait for shutdown, then stop in reverse order ────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    if let Some(scheduler) = scheduler {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!(error = %e, "Cron scheduler did not shut down cleanly");
        }
    }

    shutdown.cancel();
    if let Some(handle) = ws_handle {
        let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
        let _ = tokio::time::timeout(grace, handle).await;
    }

    engine.stop();

    tracing::info!("Tidewatch shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
