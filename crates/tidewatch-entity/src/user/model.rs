//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use tidewatch_core::types::{GeoPoint, UserId};

use super::preference::NotificationPreferences;
use super::role::UserRole;
use super::stats::UserStats;

/// A registered community member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, unique across users (case-insensitive).
    pub email: String,
    /// Phone number for SMS delivery.
    pub phone: Option<String>,
    /// Push device token.
    pub device_token: Option<String>,
    /// Role (verification rights).
    pub role: UserRole,
    /// Home location used for geofenced notifications.
    pub location: GeoPoint,
    /// Channel opt-ins.
    pub preferences: NotificationPreferences,
    /// Reward counters.
    pub stats: UserStats,
    /// Last time the user was seen.
    pub last_active_at: DateTime<Utc>,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a new user from registration data.
    pub fn new(input: CreateUser, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            device_token: input.device_token,
            role: input.role,
            location: input.location,
            preferences: input.preferences,
            stats: UserStats::default(),
            last_active_at: now,
            created_at: now,
        }
    }

    /// Lowercased email used for uniqueness checks.
    pub fn email_key(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// Data required to register a user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUser {
    /// Display name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Email address.
    #[validate(email)]
    pub email: String,
    /// Phone number.
    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,
    /// Push device token.
    pub device_token: Option<String>,
    /// Assigned role.
    pub role: UserRole,
    /// Home location.
    pub location: GeoPoint,
    /// Channel opt-ins.
    #[serde(default)]
    pub preferences: NotificationPreferences,
}
