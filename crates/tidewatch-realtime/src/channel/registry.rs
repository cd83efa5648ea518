//! Registry of rooms and their subscriptions.
//!
//! The registry entry of a room doubles as that room's lock: subscription
//! changes and publishes for the same room are serialised on the entry,
//! which is what keeps per-room sequence numbers gap-free and in order.

use std::collections::HashSet;

use dashmap::DashMap;

use tidewatch_core::events::Room;

use crate::connection::handle::ConnectionId;

use super::room::RoomChannel;
use super::subscription::SubscriptionTracker;

/// Registry of all rooms with at least one subscriber.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: DashMap<Room, RoomChannel>,
    subscriptions: SubscriptionTracker,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to a room. Returns false if it already was.
    pub fn subscribe(&self, room: Room, conn_id: ConnectionId) -> bool {
        let added = self
            .rooms
            .entry(room)
            .or_insert_with(|| RoomChannel::new(room))
            .subscribe(conn_id);
        self.subscriptions.add(conn_id, room);
        added
    }

    /// Unsubscribes a connection from a room. Empty rooms are dropped.
    pub fn unsubscribe(&self, room: &Room, conn_id: ConnectionId) -> bool {
        let removed = self.detach(room, conn_id);
        self.subscriptions.remove(conn_id, room);
        removed
    }

    /// Unsubscribes a connection from every room it joined.
    pub fn unsubscribe_all(&self, conn_id: ConnectionId) -> HashSet<Room> {
        let rooms = self.subscriptions.remove_all(conn_id);
        for room in &rooms {
            self.detach(room, conn_id);
        }
        rooms
    }

    fn detach(&self, room: &Room, conn_id: ConnectionId) -> bool {
        let mut removed = false;
        if let Some(mut channel) = self.rooms.get_mut(room) {
            removed = channel.unsubscribe(conn_id);
            if channel.is_empty() {
                drop(channel);
                self.rooms.remove_if(room, |_, channel| channel.is_empty());
            }
        }
        removed
    }

    /// Runs `deliver` under the room's lock with the next sequence number
    /// and the current subscribers. Returns `None` if nobody is listening.
    pub fn with_next_seq<F, T>(&self, room: &Room, deliver: F) -> Option<T>
    where
        F: FnOnce(u64, &HashSet<ConnectionId>) -> T,
    {
        let mut channel = self.rooms.get_mut(room)?;
        let seq = channel.next_seq();
        Some(deliver(seq, &channel.subscribers))
    }

    /// Subscriber IDs of a room.
    pub fn subscribers(&self, room: &Room) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|channel| channel.subscribers.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_subscribed(&self, room: &Room, conn_id: ConnectionId) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|channel| channel.subscribers.contains(&conn_id))
    }

    /// Number of rooms a connection has joined.
    pub fn subscription_count(&self, conn_id: ConnectionId) -> usize {
        self.subscriptions.count(conn_id)
    }

    /// Rooms a connection has joined.
    pub fn rooms_of(&self, conn_id: ConnectionId) -> HashSet<Room> {
        self.subscriptions.rooms(conn_id)
    }

    /// Number of rooms with at least one subscriber.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
