//! # tidewatch-entity
//!
//! Domain entity models for Tidewatch. Every aggregate here owns its
//! sub-documents (attachments, vote tallies, comment logs, per-channel
//! delivery records) by value; references to other aggregates are stored
//! as typed ids and resolved by explicit lookup.

pub mod achievement;
pub mod alert;
pub mod environment;
pub mod notification;
pub mod report;
pub mod score;
pub mod severity;
pub mod user;

pub use severity::Severity;
