//! Realtime fanout configuration.

use serde::{Deserialize, Serialize};

/// Realtime fanout router configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound buffer per connection. A connection whose buffer is full is
    /// disconnected as a slow consumer.
    #[serde(default = "default_connection_buffer")]
    pub connection_buffer_size: usize,
    /// Maximum concurrent connections per user.
    #[serde(default = "default_max_connections_per_user")]
    pub max_connections_per_user: usize,
    /// Maximum room subscriptions per connection.
    #[serde(default = "default_max_subscriptions")]
    pub max_subscriptions_per_connection: usize,
    /// Maximum size of an inbound frame in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            connection_buffer_size: default_connection_buffer(),
            max_connections_per_user: default_max_connections_per_user(),
            max_subscriptions_per_connection: default_max_subscriptions(),
            max_message_size: default_max_message_size(),
        }
    }
}

fn default_connection_buffer() -> usize {
    256
}

fn default_max_connections_per_user() -> usize {
    5
}

fn default_max_subscriptions() -> usize {
    64
}

fn default_max_message_size() -> usize {
    16 * 1024
}
