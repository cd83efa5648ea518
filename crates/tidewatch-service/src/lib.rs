//! # tidewatch-service
//!
//! Business logic for Tidewatch. Each service orchestrates repositories, the
//! scoring oracle, the notification dispatcher and the realtime publisher to
//! implement one part of the alerting pipeline.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time via `Arc` references. [`Services::build`] wires the
//! whole set.

pub mod alert;
pub mod context;
pub mod environment;
pub mod gamification;
pub mod notification;
pub mod report;
pub mod state;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use alert::{AlertService, HistoricalCorrelator};
pub use context::RequestContext;
pub use environment::{
    DigestOutcome, DigestService, EnvironmentService, RecordedReading, SweepOutcome,
    ThreatSweepService,
};
pub use gamification::{GamificationService, Rewards};
pub use notification::{
    BulkOutcome, Gateways, LogGateway, NotificationDispatcher, NotificationRules,
    NotificationService,
};
pub use report::{ReportService, SubmissionReceipt};
pub use state::Services;
pub use user::UserService;
