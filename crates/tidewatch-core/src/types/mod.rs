//! Shared value types: typed identifiers and geographic primitives.

pub mod geo;
pub mod id;

pub use geo::{EARTH_RADIUS_KM, GeoCell, GeoPoint};
pub use id::*;
