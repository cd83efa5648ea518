//! Geographic primitives shared by every geospatial caller.
//!
//! Points are stored as (longitude, latitude) in degrees. All distances are
//! great-circle distances on a sphere of radius [`EARTH_RADIUS_KM`]; every
//! radius-to-angle conversion in the workspace goes through this module so
//! callers agree on what "within r km" means.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Mean Earth radius (IUGG), in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A validated (longitude, latitude) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint", into = "RawPoint")]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
}

#[derive(Serialize, Deserialize)]
struct RawPoint {
    longitude: f64,
    latitude: f64,
}

impl TryFrom<RawPoint> for GeoPoint {
    type Error = AppError;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.longitude, raw.latitude)
    }
}

impl From<GeoPoint> for RawPoint {
    fn from(point: GeoPoint) -> Self {
        RawPoint {
            longitude: point.longitude,
            latitude: point.latitude,
        }
    }
}

impl GeoPoint {
    /// Build a point, rejecting out-of-range or non-finite coordinates.
    pub fn new(longitude: f64, latitude: f64) -> AppResult<Self> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::validation(format!(
                "Longitude {longitude} is outside [-180, 180]"
            )));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::validation(format!(
                "Latitude {latitude} is outside [-90, 90]"
            )));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Great-circle (haversine) distance to `other`, in kilometres.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }

    /// Whether `other` lies inside the spherical cap of `radius_km` around this point.
    pub fn within(&self, other: &GeoPoint, radius_km: f64) -> bool {
        self.distance_km(other) <= radius_km
    }

    /// The coarse cell this point falls in.
    pub fn cell(&self) -> GeoCell {
        GeoCell::containing(self)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.longitude, self.latitude)
    }
}

/// Reject negative or non-finite radii.
pub fn validate_radius(radius_km: f64) -> AppResult<()> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(AppError::validation(format!(
            "Radius {radius_km} km must be a finite, non-negative number"
        )));
    }
    Ok(())
}

/// Convert a surface distance to the central angle it subtends, in degrees.
pub fn km_to_degrees(radius_km: f64) -> f64 {
    (radius_km / EARTH_RADIUS_KM).to_degrees()
}

/// A one-degree cell keyed by (floor latitude, floor longitude).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeoCell {
    /// Floor of the latitude.
    pub lat: i32,
    /// Floor of the longitude.
    pub lon: i32,
}

impl GeoCell {
    /// The cell containing `point`.
    pub fn containing(point: &GeoPoint) -> Self {
        Self {
            lat: (point.latitude.floor() as i32).min(89),
            lon: (point.longitude.floor() as i32).min(179),
        }
    }

    /// Every cell touched by the bounding box of the cap around `center`.
    pub fn covering(center: &GeoPoint, radius_km: f64) -> Vec<GeoCell> {
        let d_lat = km_to_degrees(radius_km);
        let cos_lat = center.latitude.to_radians().cos().abs().max(0.01);
        let d_lon = (d_lat / cos_lat).min(180.0);

        let lat_lo = ((center.latitude - d_lat).floor() as i32).max(-90);
        let lat_hi = ((center.latitude + d_lat).floor() as i32).min(89);
        let lon_lo = (center.longitude - d_lon).floor() as i32;
        let lon_hi = (center.longitude + d_lon).floor() as i32;

        // Near the poles the longitude span can pass 360 degrees and wrap onto itself.
        let mut seen = HashSet::new();
        let mut cells = Vec::new();
        for lat in lat_lo..=lat_hi {
            for raw_lon in lon_lo..=lon_hi {
                let lon = (raw_lon + 180).rem_euclid(360) - 180;
                let cell = GeoCell { lat, lon };
                if seen.insert(cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }
}

impl fmt::Display for GeoCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.lat, self.lon)
    }
}
