//! Individual realtime connection handle.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

use tidewatch_core::types::UserId;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// Result of queueing a frame on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The frame is in the outbound buffer.
    Queued,
    /// The outbound buffer is full.
    Full,
    /// The connection is gone.
    Closed,
}

/// A handle to a single connection.
///
/// Holds the bounded sender feeding the socket writer plus the token the
/// writer watches to learn that the server dropped the connection.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// User who owns this connection
    pub user_id: UserId,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<String>,
    closed: CancellationToken,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(user_id: UserId, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            connected_at: Utc::now(),
            sender,
            closed: CancellationToken::new(),
        }
    }

    /// Queue a text frame without waiting.
    pub fn send(&self, frame: String) -> SendOutcome {
        if !self.is_alive() {
            return SendOutcome::Closed;
        }
        match self.sender.try_send(frame) {
            Ok(()) => SendOutcome::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => SendOutcome::Full,
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.close();
                SendOutcome::Closed
            }
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.closed.is_cancelled()
    }

    /// Mark the connection closed and wake its socket task.
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Resolves once the connection has been closed.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.closed.cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_buffer_and_closed_receiver() {
        let (tx, rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new(UserId::new(), tx);

        assert_eq!(handle.send("a".into()), SendOutcome::Queued);
        assert_eq!(handle.send("b".into()), SendOutcome::Full);
        assert!(handle.is_alive());

        drop(rx);
        assert_eq!(handle.send("c".into()), SendOutcome::Closed);
        assert!(!handle.is_alive());
    }
}
