//! # tidewatch-core
//!
//! Core crate for Tidewatch. Contains configuration schemas, typed
//! identifiers, geographic primitives, realtime room and event types,
//! capability traits for gateways and publishers, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other Tidewatch crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
