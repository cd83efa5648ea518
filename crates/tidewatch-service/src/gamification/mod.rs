//! Points, streaks and badges.

pub mod catalog;
pub mod engine;
pub mod service;

pub use service::{GamificationService, Rewards};
