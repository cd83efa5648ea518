//! Reverse index from connections to the rooms they joined.

use std::collections::HashSet;

use dashmap::DashMap;

use tidewatch_core::events::Room;

use crate::connection::handle::ConnectionId;

/// Connection → rooms.
#[derive(Debug, Default)]
pub struct SubscriptionTracker {
    conn_to_rooms: DashMap<ConnectionId, HashSet<Room>>,
}

impl SubscriptionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a subscription.
    pub fn add(&self, conn_id: ConnectionId, room: Room) {
        self.conn_to_rooms.entry(conn_id).or_default().insert(room);
    }

    /// Removes a subscription.
    pub fn remove(&self, conn_id: ConnectionId, room: &Room) {
        if let Some(mut rooms) = self.conn_to_rooms.get_mut(&conn_id) {
            rooms.remove(room);
        }
    }

    /// Rooms a connection is subscribed to.
    pub fn rooms(&self, conn_id: ConnectionId) -> HashSet<Room> {
        self.conn_to_rooms
            .get(&conn_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn count(&self, conn_id: ConnectionId) -> usize {
        self.conn_to_rooms
            .get(&conn_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }

    /// Drops every subscription of a connection and returns the rooms.
    pub fn remove_all(&self, conn_id: ConnectionId) -> HashSet<Room> {
        self.conn_to_rooms
            .remove(&conn_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default()
    }
}
