//! Community report ingestion, scoring and moderation.

pub mod escalation;
pub mod service;

pub use service::{ReportService, SubmissionReceipt};
