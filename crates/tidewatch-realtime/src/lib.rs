//! # tidewatch-realtime
//!
//! Realtime fanout for Tidewatch. Provides:
//!
//! - Room registry keyed by private user rooms and geographic cells
//! - Connection handles with bounded outbound buffers
//! - The [`RealtimeEngine`], which implements the services' `EventPublisher`
//! - A WebSocket listener binding sockets to connections

pub mod channel;
pub mod connection;
pub mod engine;
pub mod message;
pub mod metrics;
pub mod ws;

pub use channel::RoomRegistry;
pub use connection::ConnectionManager;
pub use engine::RealtimeEngine;
pub use metrics::MetricsSnapshot;
