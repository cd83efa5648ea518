//! Notification dispatch, audience rules and inbox management.

pub mod dispatcher;
pub mod gateway;
pub mod rules;
pub mod service;

pub use dispatcher::{BulkOutcome, NotificationDispatcher};
pub use gateway::{Gateways, LogGateway};
pub use rules::NotificationRules;
pub use service::NotificationService;
