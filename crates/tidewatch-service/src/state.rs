//! The wired set of services shared by the server, the worker and tests.

use std::sync::Arc;
use std::time::Duration;

use tidewatch_core::config::AppConfig;
use tidewatch_core::result::AppResult;
use tidewatch_core::traits::{Clock, EventPublisher};
use tidewatch_database::Database;
use tidewatch_oracle::ScoringOracle;

use crate::alert::{AlertService, HistoricalCorrelator};
use crate::environment::{DigestService, EnvironmentService, ThreatSweepService};
use crate::gamification::GamificationService;
use crate::notification::{Gateways, NotificationDispatcher, NotificationService};
use crate::report::ReportService;
use crate::user::UserService;

/// Every service, built once from one configuration.
///
/// All fields are cheap to clone: they hold `Arc`s to the shared store,
/// oracle, publisher and clock.
#[derive(Debug, Clone)]
pub struct Services {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Entity store.
    pub db: Database,

    /// Multi-channel delivery.
    pub dispatcher: NotificationDispatcher,
    /// Inbox management.
    pub notifications: NotificationService,
    /// Points, streaks and badges.
    pub gamification: GamificationService,
    /// Alert lifecycle.
    pub alerts: AlertService,
    /// Report pipeline.
    pub reports: ReportService,
    /// Environmental readings.
    pub environment: EnvironmentService,
    /// Global threat sweep entry point.
    pub sweep: ThreatSweepService,
    /// Daily digest entry point.
    pub digest: DigestService,
    /// Accounts and profiles.
    pub users: UserService,
}

impl Services {
    /// Wire every service and seed the achievement catalog.
    pub async fn build(
        config: AppConfig,
        db: Database,
        oracle: Arc<dyn ScoringOracle>,
        gateways: Gateways,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let config = Arc::new(config);
        let oracle_timeout = Duration::from_millis(config.oracle.timeout_ms);

        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&db.users),
            Arc::clone(&db.notifications),
            gateways,
            Arc::clone(&publisher),
            Arc::clone(&clock),
            &config.notifications,
        )?;
        let notifications =
            NotificationService::new(Arc::clone(&db.notifications), Arc::clone(&clock));

        let gamification = GamificationService::new(
            Arc::clone(&db.users),
            Arc::clone(&db.achievements),
            dispatcher.clone(),
            Arc::clone(&clock),
            config.gamification.badge_bonus,
        );
        gamification.seed_catalog().await?;

        let correlator = HistoricalCorrelator::new(
            Arc::clone(&db.alerts),
            config.alerts.correlation_radius_km,
            config.alerts.correlation_years,
        );
        let alerts = AlertService::new(
            Arc::clone(&db.alerts),
            correlator,
            dispatcher.clone(),
            Arc::clone(&publisher),
            Arc::clone(&clock),
            config.alerts.default_ttl_hours,
        );

        let reports = ReportService::new(
            Arc::clone(&db.reports),
            Arc::clone(&db.users),
            alerts.clone(),
            gamification.clone(),
            Arc::clone(&oracle),
            dispatcher.clone(),
            Arc::clone(&publisher),
            Arc::clone(&clock),
            config.reports.clone(),
            oracle_timeout,
        );

        let environment = EnvironmentService::new(Arc::clone(&db.readings), Arc::clone(&publisher));
        let sweep = ThreatSweepService::new(
            Arc::clone(&db.readings),
            oracle,
            alerts.clone(),
            Arc::clone(&clock),
            oracle_timeout,
        );
        let digest = DigestService::new(
            Arc::clone(&db.users),
            Arc::clone(&db.alerts),
            Arc::clone(&db.notifications),
            dispatcher.clone(),
            Arc::clone(&clock),
            config.notifications.digest_radius_km,
        );
        let users = UserService::new(
            Arc::clone(&db.users),
            Arc::clone(&db.achievements),
            clock,
        );

        Ok(Self {
            config,
            db,
            dispatcher,
            notifications,
            gamification,
            alerts,
            reports,
            environment,
            sweep,
            digest,
            users,
        })
    }
}
