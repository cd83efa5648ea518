//! Inbound and outbound message type definitions.
//!
//! Every frame is a JSON object tagged by `type`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tidewatch_core::events::{EventKind, Room};

/// Messages sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Subscribe to a room.
    Subscribe {
        /// Wire room name, e.g. `geo:13:80`.
        room: String,
    },
    /// Unsubscribe from a room.
    Unsubscribe {
        /// Wire room name.
        room: String,
    },
    /// Keepalive ping.
    Ping {
        /// Client timestamp, echoed back.
        #[serde(default)]
        timestamp: Option<i64>,
    },
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// A lifecycle event published to a room.
    Event {
        /// Room the event was published to.
        room: Room,
        /// Per-room sequence number.
        seq: u64,
        /// Event kind.
        event: EventKind,
        /// Event payload.
        payload: serde_json::Value,
        /// When the event was fanned out.
        timestamp: DateTime<Utc>,
    },
    /// Subscription confirmed.
    Subscribed {
        /// Room name.
        room: Room,
    },
    /// Unsubscription confirmed.
    Unsubscribed {
        /// Room name.
        room: Room,
    },
    /// Keepalive answer.
    Pong {
        /// Echoed client timestamp, or the server time when absent.
        timestamp: i64,
    },
    /// Error reply.
    Error {
        /// Machine readable error code.
        code: String,
        /// Error description.
        message: String,
    },
}

impl OutboundMessage {
    /// Build an error reply.
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Encode as a JSON text frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_ping_timestamp_is_optional() {
        let msg: InboundMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(msg, InboundMessage::Ping { timestamp: None }));
    }

    #[test]
    fn test_event_frame_uses_wire_names() {
        let frame = OutboundMessage::Event {
            room: Room::parse("geo:13:80").unwrap(),
            seq: 4,
            event: EventKind::NewAlert,
            payload: serde_json::json!({"id": "a"}),
            timestamp: Utc::now(),
        };
        let value: serde_json::Value = serde_json::from_str(&frame.encode().unwrap()).unwrap();
        assert_eq!(value["type"], "event");
        assert_eq!(value["room"], "geo:13:80");
        assert_eq!(value["event"], "new_alert");
        assert_eq!(value["seq"], 4);
    }
}
