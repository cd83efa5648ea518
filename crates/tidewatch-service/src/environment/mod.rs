//! Environmental readings and the two scheduled entry points built on them.

pub mod digest;
pub mod service;
pub mod sweep;

pub use digest::{DigestOutcome, DigestService};
pub use service::{EnvironmentService, RecordedReading};
pub use sweep::{SweepOutcome, ThreatSweepService};
