//! Top-level realtime engine that ties the subsystems together.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use tidewatch_core::config::realtime::RealtimeConfig;
use tidewatch_core::events::{EventKind, Room};
use tidewatch_core::traits::EventPublisher;

use crate::channel::RoomRegistry;
use crate::connection::ConnectionManager;
use crate::metrics::{EngineMetrics, MetricsSnapshot};

/// Room-based fanout engine.
///
/// Created stopped. Publishes made while stopped are counted as dropped
/// and otherwise ignored.
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Room registry.
    pub rooms: Arc<RoomRegistry>,
    metrics: Arc<EngineMetrics>,
    running: AtomicBool,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("running", &self.is_running())
            .finish()
    }
}

impl RealtimeEngine {
    pub fn new(config: RealtimeConfig) -> Self {
        let metrics = Arc::new(EngineMetrics::new());
        let rooms = Arc::new(RoomRegistry::new());
        let connections = Arc::new(ConnectionManager::new(config, rooms.clone(), metrics.clone()));

        Self {
            connections,
            rooms,
            metrics,
            running: AtomicBool::new(false),
        }
    }

    /// Starts accepting publishes.
    pub fn start(&self) {
        if !self.running.swap(true, Ordering::SeqCst) {
            info!("Realtime engine started");
        }
    }

    /// Stops accepting publishes and closes every connection.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            self.connections.close_all();
            info!("Realtime engine stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl EventPublisher for RealtimeEngine {
    fn publish(&self, room: &Room, kind: EventKind, payload: serde_json::Value) {
        if !self.is_running() {
            self.metrics.record_dropped(1);
            debug!(room = %room, event = %kind, "Engine stopped, event dropped");
            return;
        }
        self.metrics.record_published();
        let delivered = self.connections.broadcast_to_room(room, kind, payload);
        debug!(room = %room, event = %kind, delivered, "Event published");
    }
}
