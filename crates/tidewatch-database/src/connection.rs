//! Store handle and availability switch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use tidewatch_core::error::AppError;
use tidewatch_core::result::AppResult;

use crate::repositories::{
    AchievementRepository, AlertRepository, NotificationRepository, ReadingRepository,
    ReportRepository, UserRepository,
};

/// Shared availability flag checked by every table operation.
#[derive(Debug)]
pub struct StoreHealth {
    available: AtomicBool,
}

impl StoreHealth {
    /// A store that starts online.
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
        }
    }

    /// Fail with a database error while offline.
    pub fn check(&self) -> AppResult<()> {
        if self.available.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(AppError::database("Entity store is unavailable"))
        }
    }

    /// Whether the store is online.
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Flip the availability flag.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }
}

impl Default for StoreHealth {
    fn default() -> Self {
        Self::new()
    }
}

/// All repositories sharing one health flag.
#[derive(Debug, Clone)]
pub struct Database {
    health: Arc<StoreHealth>,
    /// User accounts.
    pub users: Arc<UserRepository>,
    /// Alerts.
    pub alerts: Arc<AlertRepository>,
    /// Community reports.
    pub reports: Arc<ReportRepository>,
    /// Stored notifications.
    pub notifications: Arc<NotificationRepository>,
    /// Achievement catalog and unlocks.
    pub achievements: Arc<AchievementRepository>,
    /// Environmental readings.
    pub readings: Arc<ReadingRepository>,
}

impl Database {
    /// Create an empty in-memory store.
    pub fn in_memory() -> Self {
        let health = Arc::new(StoreHealth::new());
        let db = Self {
            users: Arc::new(UserRepository::new(Arc::clone(&health))),
            alerts: Arc::new(AlertRepository::new(Arc::clone(&health))),
            reports: Arc::new(ReportRepository::new(Arc::clone(&health))),
            notifications: Arc::new(NotificationRepository::new(Arc::clone(&health))),
            achievements: Arc::new(AchievementRepository::new(Arc::clone(&health))),
            readings: Arc::new(ReadingRepository::new(Arc::clone(&health))),
            health,
        };
        info!("In-memory entity store initialised");
        db
    }

    /// Check store availability.
    pub fn health_check(&self) -> AppResult<()> {
        self.health.check()
    }

    /// Take the store online or offline.
    pub fn set_available(&self, available: bool) {
        if !available {
            warn!("Entity store marked unavailable");
        }
        self.health.set_available(available);
    }
}
