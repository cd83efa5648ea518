//! # tidewatch-oracle
//!
//! Scoring oracle for Tidewatch. Two providers implement [`ScoringOracle`]:
//!
//! - **heuristic**: deterministic keyword and threshold scoring, no network
//! - **http**: forwards requests to a remote AI service with a bounded timeout
//!
//! The provider is selected at runtime from [`OracleConfig`](tidewatch_core::config::oracle::OracleConfig).

pub mod content;
pub mod heuristic;
pub mod http;
pub mod provider;

pub use heuristic::HeuristicOracle;
pub use http::HttpOracle;
pub use provider::{OracleManager, ScoringOracle};
