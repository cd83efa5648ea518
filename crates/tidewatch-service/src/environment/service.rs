//! Environmental reading ingestion.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use tidewatch_core::events::{EventKind, Room};
use tidewatch_core::result::AppResult;
use tidewatch_core::traits::EventPublisher;
use tidewatch_database::repositories::ReadingRepository;
use tidewatch_entity::environment::EnvironmentalReading;
use tidewatch_oracle::heuristic::{Anomaly, DataQuality, data_quality, detect_anomalies};

/// Result of ingesting one reading.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedReading {
    /// The reading as received.
    pub reading: EnvironmentalReading,
    /// Whether it replaced the station's latest reading. Older readings are
    /// ignored.
    pub stored: bool,
    /// Out-of-range measurements.
    pub anomalies: Vec<Anomaly>,
    /// Parameter coverage of the reading.
    pub quality: DataQuality,
}

/// Validates readings, keeps the latest per station and broadcasts them.
#[derive(Debug, Clone)]
pub struct EnvironmentService {
    readings: Arc<ReadingRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl EnvironmentService {
    /// Creates a new environment service.
    pub fn new(readings: Arc<ReadingRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            readings,
            publisher,
        }
    }

    /// Ingest a reading and publish `environmental_update` to its cell.
    pub async fn record_reading(&self, reading: EnvironmentalReading) -> AppResult<RecordedReading> {
        reading.validate()?;
        let quality = data_quality(&reading);
        let stored = self.readings.record(&reading).await?;
        if !stored {
            debug!(
                station_id = %reading.station_id,
                recorded_at = %reading.recorded_at,
                "Ignoring reading older than the station's latest"
            );
            return Ok(RecordedReading {
                reading,
                stored,
                anomalies: Vec::new(),
                quality,
            });
        }

        let anomalies = detect_anomalies(&reading);
        for anomaly in &anomalies {
            warn!(
                station_id = %reading.station_id,
                parameter = anomaly.parameter,
                value = anomaly.value,
                threshold = anomaly.threshold,
                severity = %anomaly.severity,
                "Environmental anomaly"
            );
        }

        let recorded = RecordedReading {
            reading,
            stored,
            anomalies,
            quality,
        };
        match serde_json::to_value(&recorded) {
            Ok(payload) => self.publisher.publish(
                &Room::for_point(&recorded.reading.location),
                EventKind::EnvironmentalUpdate,
                payload,
            ),
            Err(e) => warn!(error = %e, "Failed to serialize environmental update"),
        }
        info!(
            station_id = %recorded.reading.station_id,
            anomalies = recorded.anomalies.len(),
            completeness = recorded.quality.completeness,
            "Environmental reading recorded"
        );
        Ok(recorded)
    }

    /// Latest reading of every station.
    pub async fn latest(&self) -> AppResult<Vec<EnvironmentalReading>> {
        self.readings.latest_all().await
    }

    /// Latest reading of one station.
    pub async fn latest_for(&self, station_id: &str) -> AppResult<Option<EnvironmentalReading>> {
        self.readings.latest_for(station_id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use tidewatch_core::error::ErrorKind;
    use tidewatch_core::events::EventKind;

    use tidewatch_oracle::heuristic::Reliability;

    use crate::testing::{Harness, reading};

    #[tokio::test]
    async fn test_record_flags_anomalies_and_broadcasts() {
        let h = Harness::new().await;
        let recorded = h
            .services
            .environment
            .record_reading(reading("buoy-7", 120.0, 975.0))
            .await
            .unwrap();

        assert!(recorded.stored);
        assert_eq!(recorded.anomalies.len(), 2);
        assert_eq!(recorded.quality.completeness, 50.0);
        assert_eq!(recorded.quality.reliability, Reliability::Low);
        assert_eq!(h.publisher.count(EventKind::EnvironmentalUpdate), 1);
        assert!(h.services.environment.latest_for("buoy-7").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_older_reading_is_ignored() {
        let h = Harness::new().await;
        let newer = reading("buoy-8", 20.0, 1012.0);
        let mut older = reading("buoy-8", 200.0, 950.0);
        older.recorded_at = newer.recorded_at - Duration::minutes(10);

        h.services.environment.record_reading(newer.clone()).await.unwrap();
        let stale = h.services.environment.record_reading(older).await.unwrap();

        assert!(!stale.stored);
        assert_eq!(h.publisher.count(EventKind::EnvironmentalUpdate), 1);
        let latest = h.services.environment.latest_for("buoy-8").await.unwrap().unwrap();
        assert_eq!(latest.id, newer.id);
    }

    #[tokio::test]
    async fn test_impossible_values_are_rejected() {
        let h = Harness::new().await;
        let mut bad = reading("buoy-9", 20.0, 1012.0);
        bad.schema_version = 99;
        let err = h.services.environment.record_reading(bad).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = h
            .services
            .environment
            .record_reading(reading("buoy-9", -5.0, 1012.0))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(h.services.environment.latest().await.unwrap().is_empty());
    }
}
