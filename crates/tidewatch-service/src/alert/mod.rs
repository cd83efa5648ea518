//! Alert lifecycle: creation, patching, deactivation and lookups.

pub mod correlation;
pub mod service;

pub use correlation::HistoricalCorrelator;
pub use service::AlertService;
