//! Built-in job handler implementations.

pub mod digest;
pub mod sweep;

pub use digest::DailyDigestJobHandler;
pub use sweep::ThreatSweepJobHandler;
