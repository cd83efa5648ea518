//! Realtime publish capability.

use crate::events::{EventKind, Room};

/// Fire-and-forget publisher into realtime rooms.
///
/// Implementations must not block and give no delivery signal back to the
/// caller. Services receive this as an injected `Arc<dyn EventPublisher>`.
pub trait EventPublisher: Send + Sync + std::fmt::Debug + 'static {
    /// Publish one event to every current subscriber of `room`.
    fn publish(&self, room: &Room, kind: EventKind, payload: serde_json::Value);

    /// Publish the same event to several rooms.
    fn publish_many(&self, rooms: &[Room], kind: EventKind, payload: serde_json::Value) {
        for room in rooms {
            self.publish(room, kind, payload.clone());
        }
    }
}
