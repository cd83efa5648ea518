//! A single room with its subscribers and sequence counter.

use std::collections::HashSet;

use tidewatch_core::events::Room;

use crate::connection::handle::ConnectionId;

/// Subscribers of one room.
#[derive(Debug, Clone)]
pub struct RoomChannel {
    /// The room address.
    pub room: Room,
    /// Subscribed connection IDs.
    pub subscribers: HashSet<ConnectionId>,
    /// Sequence number of the last event published to the room.
    pub seq: u64,
}

impl RoomChannel {
    /// Creates an empty room.
    pub fn new(room: Room) -> Self {
        Self {
            room,
            subscribers: HashSet::new(),
            seq: 0,
        }
    }

    /// Adds a subscriber. Returns false if it was already present.
    pub fn subscribe(&mut self, conn_id: ConnectionId) -> bool {
        self.subscribers.insert(conn_id)
    }

    /// Removes a subscriber.
    pub fn unsubscribe(&mut self, conn_id: ConnectionId) -> bool {
        self.subscribers.remove(&conn_id)
    }

    /// Advances and returns the sequence number.
    pub fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
