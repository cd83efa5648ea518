//! Environmental reading repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use tidewatch_core::result::AppResult;
use tidewatch_core::types::ReadingId;
use tidewatch_entity::environment::EnvironmentalReading;

use crate::connection::StoreHealth;

/// Latest reading per station plus the set of readings already assessed by
/// a threat sweep.
#[derive(Debug)]
pub struct ReadingRepository {
    latest: DashMap<String, EnvironmentalReading>,
    assessed: DashMap<ReadingId, DateTime<Utc>>,
    health: Arc<StoreHealth>,
}

impl ReadingRepository {
    /// Create an empty repository.
    pub fn new(health: Arc<StoreHealth>) -> Self {
        Self {
            latest: DashMap::new(),
            assessed: DashMap::new(),
            health,
        }
    }

    /// Store a reading. Returns `false` when the station already has a newer
    /// one, in which case nothing changes.
    pub async fn record(&self, reading: &EnvironmentalReading) -> AppResult<bool> {
        self.health.check()?;
        match self.latest.entry(reading.station_id.clone()) {
            Entry::Occupied(mut slot) => {
                if slot.get().recorded_at > reading.recorded_at {
                    return Ok(false);
                }
                slot.insert(reading.clone());
                Ok(true)
            }
            Entry::Vacant(slot) => {
                slot.insert(reading.clone());
                Ok(true)
            }
        }
    }

    /// Latest reading of every station.
    pub async fn latest_all(&self) -> AppResult<Vec<EnvironmentalReading>> {
        self.health.check()?;
        Ok(self.latest.iter().map(|e| e.value().clone()).collect())
    }

    /// Latest reading of one station.
    pub async fn latest_for(&self, station_id: &str) -> AppResult<Option<EnvironmentalReading>> {
        self.health.check()?;
        Ok(self.latest.get(station_id).map(|e| e.value().clone()))
    }

    /// Claim a reading for assessment. Returns `false` if another sweep
    /// already claimed it.
    pub async fn claim_for_assessment(&self, id: ReadingId, now: DateTime<Utc>) -> AppResult<bool> {
        self.health.check()?;
        match self.assessed.entry(id) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(now);
                Ok(true)
            }
        }
    }
}
