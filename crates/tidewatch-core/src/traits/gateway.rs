//! Delivery gateway capabilities for push, SMS and email.
//!
//! The three channels share no transport. Each call returns success or a
//! typed [`DeliveryFailure`]; callers record the outcome and never treat a
//! failure as fatal.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single channel delivery failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum DeliveryFailure {
    /// The gateway could not be reached.
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
    /// The gateway refused the message.
    #[error("rejected by gateway: {0}")]
    Rejected(String),
    /// The target address, number or token is unusable.
    #[error("invalid target: {0}")]
    InvalidTarget(String),
    /// The gateway did not answer within the time budget (milliseconds).
    #[error("timed out after {0} ms")]
    Timeout(u64),
}

/// Payload of a push notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushContent {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Extra key/value data for the client.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Mobile push delivery.
#[async_trait]
pub trait PushGateway: Send + Sync + 'static {
    /// Send `content` to the device identified by `target`.
    async fn send_push(&self, target: &str, content: &PushContent) -> Result<(), DeliveryFailure>;
}

/// SMS delivery.
#[async_trait]
pub trait SmsGateway: Send + Sync + 'static {
    /// Send `text` to `number`.
    async fn send_sms(&self, number: &str, text: &str) -> Result<(), DeliveryFailure>;
}

/// Email delivery.
#[async_trait]
pub trait EmailGateway: Send + Sync + 'static {
    /// Send a message to `address`.
    async fn send_email(&self, address: &str, subject: &str, body: &str)
    -> Result<(), DeliveryFailure>;
}
