//! Alert domain entities.

pub mod model;
pub mod state;
pub mod threat;

pub use model::{Alert, CreateAlert, HistoricalCorrelation, UpdateAlert};
pub use state::AlertState;
pub use threat::ThreatType;
