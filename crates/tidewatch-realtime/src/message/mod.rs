//! Wire messages exchanged over a realtime connection.

pub mod types;
pub mod validator;

pub use types::{InboundMessage, OutboundMessage};
