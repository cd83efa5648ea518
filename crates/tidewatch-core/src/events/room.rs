//! Room addressing for realtime fanout.
//!
//! Rooms are either private to a single user or cover one coarse
//! geographic cell. On the wire they are plain strings:
//!
//! - `user:{uuid}`
//! - `geo:{lat}:{lon}` where both parts are integer degrees

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::{GeoCell, GeoPoint, UserId};

/// A realtime room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Room {
    /// A user's private room.
    User(UserId),
    /// All listeners of one geographic cell.
    Geo(GeoCell),
}

impl Room {
    /// The geographic room containing `point`.
    pub fn for_point(point: &GeoPoint) -> Self {
        Self::Geo(point.cell())
    }

    /// Geographic rooms touched by a geofence.
    pub fn covering(center: &GeoPoint, radius_km: f64) -> Vec<Self> {
        GeoCell::covering(center, radius_km)
            .into_iter()
            .map(Self::Geo)
            .collect()
    }

    /// Parse a wire room name.
    pub fn parse(s: &str) -> Result<Self, AppError> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            ["user", id] => id
                .parse::<UserId>()
                .map(Self::User)
                .map_err(|_| AppError::validation(format!("Invalid user room: {s}"))),
            ["geo", lat, lon] => {
                let lat: i32 = lat
                    .parse()
                    .map_err(|_| AppError::validation(format!("Invalid latitude in room: {s}")))?;
                let lon: i32 = lon
                    .parse()
                    .map_err(|_| AppError::validation(format!("Invalid longitude in room: {s}")))?;
                if !(-90..=89).contains(&lat) || !(-180..=179).contains(&lon) {
                    return Err(AppError::validation(format!("Room cell out of range: {s}")));
                }
                Ok(Self::Geo(GeoCell { lat, lon }))
            }
            _ => Err(AppError::validation(format!("Unknown room: {s}"))),
        }
    }

    /// Wire name of the room.
    pub fn to_channel_string(&self) -> String {
        match self {
            Self::User(id) => format!("user:{id}"),
            Self::Geo(cell) => format!("geo:{}:{}", cell.lat, cell.lon),
        }
    }

    /// Whether only the owning user may subscribe.
    pub fn is_private(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_channel_string())
    }
}

impl TryFrom<String> for Room {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Room> for String {
    fn from(room: Room) -> Self {
        room.to_channel_string()
    }
}
