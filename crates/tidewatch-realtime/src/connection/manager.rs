//! Connection lifecycle and inbound message routing.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use tidewatch_core::config::realtime::RealtimeConfig;
use tidewatch_core::error::AppError;
use tidewatch_core::events::{EventKind, Room};
use tidewatch_core::types::UserId;

use crate::channel::RoomRegistry;
use crate::message::types::{InboundMessage, OutboundMessage};
use crate::message::validator;
use crate::metrics::EngineMetrics;

use super::handle::{ConnectionHandle, ConnectionId, SendOutcome};
use super::pool::ConnectionPool;

/// Manages all active connections and their room subscriptions.
#[derive(Debug)]
pub struct ConnectionManager {
    pool: ConnectionPool,
    rooms: Arc<RoomRegistry>,
    metrics: Arc<EngineMetrics>,
    config: RealtimeConfig,
}

impl ConnectionManager {
    pub fn new(config: RealtimeConfig, rooms: Arc<RoomRegistry>, metrics: Arc<EngineMetrics>) -> Self {
        Self {
            pool: ConnectionPool::new(),
            rooms,
            metrics,
            config,
        }
    }

    /// Registers a new connection for `user_id`.
    ///
    /// Returns the handle and the receiver the socket writer drains. The
    /// connection starts subscribed to the user's private room. When the user
    /// is already at the connection limit their oldest connection is closed.
    pub fn register(&self, user_id: UserId) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.connection_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(user_id, tx));

        let existing = self.pool.user_connections(&user_id);
        if existing.len() >= self.config.max_connections_per_user {
            warn!(
                user_id = %user_id,
                count = existing.len(),
                max = self.config.max_connections_per_user,
                "User at max connections, oldest will be replaced"
            );
            if let Some(oldest) = existing.first() {
                self.unregister(&oldest.id);
            }
        }

        self.pool.add(handle.clone());
        self.metrics.record_connect();
        self.rooms.subscribe(Room::User(user_id), handle.id);

        info!(conn_id = %handle.id, user_id = %user_id, "Realtime connection registered");

        (handle, rx)
    }

    /// Unregisters a connection and drops its subscriptions.
    pub fn unregister(&self, conn_id: &ConnectionId) -> bool {
        let Some(handle) = self.pool.remove(conn_id) else {
            return false;
        };
        handle.close();
        self.rooms.unsubscribe_all(*conn_id);
        self.metrics.record_disconnect();

        info!(conn_id = %conn_id, user_id = %handle.user_id, "Realtime connection unregistered");
        true
    }

    /// Processes one inbound text frame from a client.
    pub fn handle_inbound(&self, conn_id: &ConnectionId, raw: &str) {
        let Some(handle) = self.pool.get(conn_id) else {
            warn!(conn_id = %conn_id, "Message from unknown connection");
            return;
        };
        self.metrics.record_received();

        let parsed = validator::validate_inbound(raw, self.config.max_message_size)
            .and_then(|_| validator::parse_inbound(raw));
        let msg = match parsed {
            Ok(msg) => msg,
            Err(e) => {
                self.reply(&handle, OutboundMessage::error("INVALID_MESSAGE", e.message));
                return;
            }
        };

        match msg {
            InboundMessage::Subscribe { room } => {
                let reply = match self.subscribe(&handle, &room) {
                    Ok(room) => OutboundMessage::Subscribed { room },
                    Err((code, message)) => OutboundMessage::error(code, message),
                };
                self.reply(&handle, reply);
            }
            InboundMessage::Unsubscribe { room } => {
                let reply = match validator::validate_room_name(&room) {
                    Ok(room) => {
                        self.rooms.unsubscribe(&room, handle.id);
                        debug!(conn_id = %conn_id, room = %room, "Unsubscribed from room");
                        OutboundMessage::Unsubscribed { room }
                    }
                    Err(e) => OutboundMessage::error("INVALID_ROOM", e.message),
                };
                self.reply(&handle, reply);
            }
            InboundMessage::Ping { timestamp } => {
                let timestamp = timestamp.unwrap_or_else(|| Utc::now().timestamp_millis());
                self.reply(&handle, OutboundMessage::Pong { timestamp });
            }
        }
    }

    /// Subscription with limit and permission checks.
    fn subscribe(&self, handle: &ConnectionHandle, name: &str) -> Result<Room, (&'static str, String)> {
        let room = validator::validate_room_name(name).map_err(|e| ("INVALID_ROOM", e.message))?;

        if !Self::may_join(handle, &room) {
            return Err((
                "FORBIDDEN",
                format!("Not authorized to subscribe to room: {room}"),
            ));
        }

        let current = self.rooms.subscription_count(handle.id);
        if current >= self.config.max_subscriptions_per_connection
            && !self.rooms.is_subscribed(&room, handle.id)
        {
            return Err((
                "MAX_SUBSCRIPTIONS",
                format!(
                    "Maximum subscriptions ({}) reached",
                    self.config.max_subscriptions_per_connection
                ),
            ));
        }

        self.rooms.subscribe(room, handle.id);
        debug!(conn_id = %handle.id, room = %room, "Subscribed to room");
        Ok(room)
    }

    /// Subscribes a registered connection to a room on the server's behalf.
    pub fn join(&self, conn_id: &ConnectionId, room: Room) -> Result<(), AppError> {
        let handle = self
            .pool
            .get(conn_id)
            .ok_or_else(|| AppError::not_found(format!("Connection {conn_id} not found")))?;
        if !Self::may_join(&handle, &room) {
            return Err(AppError::authorization(format!(
                "Not authorized to subscribe to room: {room}"
            )));
        }
        self.rooms.subscribe(room, handle.id);
        Ok(())
    }

    /// Removes a connection from a room. Returns whether it was subscribed.
    pub fn leave(&self, conn_id: &ConnectionId, room: &Room) -> bool {
        self.rooms.unsubscribe(room, *conn_id)
    }

    fn may_join(handle: &ConnectionHandle, room: &Room) -> bool {
        match room {
            Room::User(owner) => *owner == handle.user_id,
            Room::Geo(_) => true,
        }
    }

    /// Fans one event out to the current subscribers of `room`.
    ///
    /// Runs under the room's lock so events of one room reach every
    /// subscriber in publish order. Subscribers whose buffer is full are
    /// disconnected once the lock is released. Returns the number of frames
    /// queued.
    pub fn broadcast_to_room(&self, room: &Room, kind: EventKind, payload: serde_json::Value) -> usize {
        let mut slow = Vec::new();
        let mut lost = 0u64;

        let delivered = self
            .rooms
            .with_next_seq(room, |seq, subscribers| {
                let frame = OutboundMessage::Event {
                    room: *room,
                    seq,
                    event: kind,
                    payload,
                    timestamp: Utc::now(),
                };
                let text = match frame.encode() {
                    Ok(text) => text,
                    Err(e) => {
                        error!(room = %room, error = %e, "Failed to serialize event");
                        return 0;
                    }
                };

                let mut sent = 0usize;
                for conn_id in subscribers {
                    let Some(handle) = self.pool.get(conn_id) else {
                        continue;
                    };
                    match handle.send(text.clone()) {
                        SendOutcome::Queued => sent += 1,
                        SendOutcome::Full => {
                            lost += 1;
                            slow.push(*conn_id);
                        }
                        SendOutcome::Closed => lost += 1,
                    }
                }
                sent
            })
            .unwrap_or(0);

        for conn_id in slow {
            self.disconnect_slow(&conn_id);
        }

        self.metrics.record_delivered(delivered as u64);
        if lost > 0 {
            self.metrics.record_dropped(lost);
        }
        delivered
    }

    fn disconnect_slow(&self, conn_id: &ConnectionId) {
        if self.unregister(conn_id) {
            self.metrics.record_slow_consumer();
            warn!(conn_id = %conn_id, "Disconnected slow consumer");
        }
    }

    fn reply(&self, handle: &ConnectionHandle, message: OutboundMessage) {
        let text = match message.encode() {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Failed to serialize outbound message");
                return;
            }
        };
        if handle.send(text) == SendOutcome::Full {
            self.disconnect_slow(&handle.id);
        }
    }

    /// Closes all connections.
    pub fn close_all(&self) {
        let all = self.pool.all_connections();
        for conn in &all {
            self.unregister(&conn.id);
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Returns a connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.pool.get(conn_id)
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns the number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.pool.user_count()
    }
}
