//! Radius index over located entities.

use std::fmt;
use std::hash::Hash;

use dashmap::DashMap;

use tidewatch_core::result::AppResult;
use tidewatch_core::types::GeoPoint;
use tidewatch_core::types::geo::{km_to_degrees, validate_radius};

/// Maps entity ids to their stored point and answers spherical-cap queries.
///
/// A latitude-band check discards far-away entries before the exact
/// haversine test, so membership is always decided by great-circle
/// distance.
pub struct GeoIndex<Id> {
    points: DashMap<Id, GeoPoint>,
}

impl<Id: Eq + Hash> fmt::Debug for GeoIndex<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoIndex")
            .field("entries", &self.points.len())
            .finish()
    }
}

impl<Id> Default for GeoIndex<Id>
where
    Id: Eq + Hash + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Id> GeoIndex<Id>
where
    Id: Eq + Hash + Copy,
{
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            points: DashMap::new(),
        }
    }

    /// Insert or move an entity.
    pub fn upsert(&self, id: Id, point: GeoPoint) {
        self.points.insert(id, point);
    }

    /// Remove an entity.
    pub fn remove(&self, id: &Id) {
        self.points.remove(id);
    }

    /// Ids whose point lies within `radius_km` of `center`. Unordered.
    pub fn nearby(&self, center: &GeoPoint, radius_km: f64) -> AppResult<Vec<Id>> {
        validate_radius(radius_km)?;
        // Slack keeps float rounding in the prefilter from excluding boundary points.
        let band = km_to_degrees(radius_km) + 1e-6;

        Ok(self
            .points
            .iter()
            .filter(|entry| (entry.value().latitude() - center.latitude()).abs() <= band)
            .filter(|entry| center.within(entry.value(), radius_km))
            .map(|entry| *entry.key())
            .collect())
    }

    /// Number of indexed entities.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lon: f64, lat: f64) -> GeoPoint {
        GeoPoint::new(lon, lat).unwrap()
    }

    #[test]
    fn test_nearby_matches_exact_distance_on_a_grid() {
        let index = GeoIndex::new();
        let center = point(80.27, 13.08);
        let mut expected_inside = Vec::new();
        let mut id = 0u32;

        for dx in -20..=20 {
            for dy in -20..=20 {
                let p = point(80.27 + f64::from(dx) * 0.02, 13.08 + f64::from(dy) * 0.02);
                index.upsert(id, p);
                if center.distance_km(&p) <= 25.0 {
                    expected_inside.push(id);
                }
                id += 1;
            }
        }

        let mut found = index.nearby(&center, 25.0).unwrap();
        found.sort_unstable();
        assert_eq!(found, expected_inside);
        assert!(!found.is_empty());
        assert!(found.len() < index.len());
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let index = GeoIndex::new();
        let center = point(0.0, 0.0);
        let edge = point(0.0, 0.5);
        index.upsert(1u8, edge);

        let radius = center.distance_km(&edge);
        assert_eq!(index.nearby(&center, radius).unwrap(), vec![1]);
        assert!(index.nearby(&center, radius - 0.001).unwrap().is_empty());
    }

    #[test]
    fn test_upsert_moves_entity() {
        let index = GeoIndex::new();
        index.upsert(7u8, point(10.0, 10.0));
        index.upsert(7u8, point(50.0, 50.0));
        assert!(index.nearby(&point(10.0, 10.0), 10.0).unwrap().is_empty());
        assert_eq!(index.nearby(&point(50.0, 50.0), 1.0).unwrap(), vec![7]);
        index.remove(&7);
        assert!(index.is_empty());
    }

    #[test]
    fn test_rejects_negative_radius() {
        let index: GeoIndex<u8> = GeoIndex::new();
        assert!(index.nearby(&point(0.0, 0.0), -5.0).is_err());
    }

    #[test]
    fn test_debug_reports_entry_count() {
        let index = GeoIndex::new();
        index.upsert(1u8, point(80.0, 13.0));
        assert_eq!(format!("{index:?}"), "GeoIndex { entries: 1 }");
    }
}
