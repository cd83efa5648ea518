//! Scheduled entry points for Tidewatch.
//!
//! This crate provides:
//! - A job executor that dispatches runs to registered handlers
//! - Handlers for the global threat sweep and the daily digest
//! - A cron scheduler that triggers them on the configured schedules
//!
//! The services never depend on this crate; both entry points remain plain
//! callable operations.

pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler, JobRun};
pub use scheduler::CronScheduler;
