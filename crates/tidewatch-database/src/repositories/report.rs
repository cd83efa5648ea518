//! Report repository implementation.

use std::sync::Arc;

use async_trait::async_trait;

use tidewatch_core::result::AppResult;
use tidewatch_core::traits::Repository;
use tidewatch_core::types::{GeoPoint, ReportId, UserId};
use tidewatch_entity::report::Report;

use crate::connection::StoreHealth;
use crate::geo::GeoIndex;
use crate::table::MemoryTable;

/// Repository for community reports, indexed by location.
#[derive(Debug)]
pub struct ReportRepository {
    table: MemoryTable<ReportId, Report>,
    geo: GeoIndex<ReportId>,
}

impl ReportRepository {
    /// Create an empty report repository.
    pub fn new(health: Arc<StoreHealth>) -> Self {
        Self {
            table: MemoryTable::new("Report", health),
            geo: GeoIndex::new(),
        }
    }

    /// Atomically modify one report (vote dedup, escalation guard, status
    /// transitions all rely on this).
    pub async fn update_with<R>(
        &self,
        id: &ReportId,
        f: impl FnOnce(&mut Report) -> AppResult<R>,
    ) -> AppResult<(R, Report)> {
        self.table.update_with(id, f)
    }

    /// Reports located within `radius_km` of `center`, newest first.
    pub async fn find_nearby(&self, center: &GeoPoint, radius_km: f64) -> AppResult<Vec<Report>> {
        let mut reports = Vec::new();
        for id in self.geo.nearby(center, radius_km)? {
            if let Some(report) = self.table.get(&id)? {
                reports.push(report);
            }
        }
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }

    /// Reports by one author, newest first.
    pub async fn find_by_author(&self, author_id: &UserId) -> AppResult<Vec<Report>> {
        let mut reports = self.table.scan(|r| r.author_id == *author_id)?;
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }
}

#[async_trait]
impl Repository<Report, ReportId> for ReportRepository {
    async fn find_by_id(&self, id: &ReportId) -> AppResult<Option<Report>> {
        self.table.get(id)
    }

    async fn create(&self, report: &Report) -> AppResult<Report> {
        let stored = self.table.insert_new(report.id, report.clone())?;
        self.geo.upsert(report.id, report.location);
        Ok(stored)
    }

    async fn update(&self, report: &Report) -> AppResult<Report> {
        self.table.replace(&report.id, report.clone())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.table.len() as u64)
    }
}
