//! User domain entities.

pub mod model;
pub mod preference;
pub mod role;
pub mod stats;

pub use model::{CreateUser, User};
pub use preference::NotificationPreferences;
pub use role::UserRole;
pub use stats::UserStats;
