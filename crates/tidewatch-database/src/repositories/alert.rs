//! Alert repository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tidewatch_core::result::AppResult;
use tidewatch_core::traits::Repository;
use tidewatch_core::types::{AlertId, GeoPoint};
use tidewatch_entity::Severity;
use tidewatch_entity::alert::{Alert, ThreatType};

use crate::connection::StoreHealth;
use crate::geo::GeoIndex;
use crate::table::MemoryTable;

/// Repository for alerts, indexed by geofence center.
#[derive(Debug)]
pub struct AlertRepository {
    table: MemoryTable<AlertId, Alert>,
    geo: GeoIndex<AlertId>,
}

impl AlertRepository {
    /// Create an empty alert repository.
    pub fn new(health: Arc<StoreHealth>) -> Self {
        Self {
            table: MemoryTable::new("Alert", health),
            geo: GeoIndex::new(),
        }
    }

    /// Atomically modify one alert.
    pub async fn update_with<R>(
        &self,
        id: &AlertId,
        f: impl FnOnce(&mut Alert) -> AppResult<R>,
    ) -> AppResult<(R, Alert)> {
        let (result, alert) = self.table.update_with(id, f)?;
        self.geo.upsert(alert.id, alert.center);
        Ok((result, alert))
    }

    /// Alerts that are active and unexpired at `now`, newest first.
    pub async fn find_active(&self, now: DateTime<Utc>) -> AppResult<Vec<Alert>> {
        let mut alerts = self.table.scan(|a| a.active && a.expires_at > now)?;
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }

    /// Active alerts whose center lies within `radius_km` of `point`.
    pub async fn find_active_near(
        &self,
        point: &GeoPoint,
        radius_km: f64,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Alert>> {
        let mut alerts = Vec::new();
        for id in self.geo.nearby(point, radius_km)? {
            if let Some(alert) = self.table.get(&id)? {
                if alert.is_active_at(now) {
                    alerts.push(alert);
                }
            }
        }
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }

    /// Alerts of the same type and severity centered within `radius_km`
    /// of `center`, created at or after `since`.
    pub async fn find_similar(
        &self,
        threat_type: ThreatType,
        severity: Severity,
        center: &GeoPoint,
        radius_km: f64,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<Alert>> {
        let mut alerts = Vec::new();
        for id in self.geo.nearby(center, radius_km)? {
            let Some(alert) = self.table.get(&id)? else {
                continue;
            };
            if alert.threat_type == threat_type
                && alert.severity == severity
                && alert.created_at >= since
            {
                alerts.push(alert);
            }
        }
        Ok(alerts)
    }
}

#[async_trait]
impl Repository<Alert, AlertId> for AlertRepository {
    async fn find_by_id(&self, id: &AlertId) -> AppResult<Option<Alert>> {
        self.table.get(id)
    }

    async fn create(&self, alert: &Alert) -> AppResult<Alert> {
        let stored = self.table.insert_new(alert.id, alert.clone())?;
        self.geo.upsert(alert.id, alert.center);
        Ok(stored)
    }

    async fn update(&self, alert: &Alert) -> AppResult<Alert> {
        let stored = self.table.replace(&alert.id, alert.clone())?;
        self.geo.upsert(alert.id, alert.center);
        Ok(stored)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.table.len() as u64)
    }
}
