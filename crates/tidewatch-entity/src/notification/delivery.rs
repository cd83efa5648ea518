//! Per-channel delivery records owned by a notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An outbound delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Mobile push.
    Push,
    /// SMS.
    Sms,
    /// Email.
    Email,
}

impl Channel {
    /// Every channel.
    pub const ALL: [Channel; 3] = [Self::Push, Self::Sms, Self::Email];

    /// Return the channel as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Sms => "sms",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDelivery {
    /// Whether an attempt was planned.
    pub requested: bool,
    /// Whether the gateway accepted the message.
    pub sent: bool,
    /// When the gateway accepted it.
    pub sent_at: Option<DateTime<Utc>>,
    /// Failure reason.
    pub error: Option<String>,
}

impl ChannelDelivery {
    /// A channel that will be attempted.
    pub fn requested() -> Self {
        Self {
            requested: true,
            ..Self::default()
        }
    }

    /// Record success.
    pub fn mark_sent(&mut self, at: DateTime<Utc>) {
        self.sent = true;
        self.sent_at = Some(at);
        self.error = None;
    }

    /// Record failure.
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.sent = false;
        self.sent_at = None;
        self.error = Some(error.into());
    }

    /// Not requested, or requested and finished either way.
    pub fn is_resolved(&self) -> bool {
        !self.requested || self.sent || self.error.is_some()
    }
}

/// Delivery records for all three channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDeliveries {
    /// Push record.
    pub push: ChannelDelivery,
    /// SMS record.
    pub sms: ChannelDelivery,
    /// Email record.
    pub email: ChannelDelivery,
}

impl ChannelDeliveries {
    /// Records with the given channels marked as requested.
    pub fn planned(channels: &[Channel]) -> Self {
        let mut deliveries = Self::default();
        for channel in channels {
            *deliveries.get_mut(*channel) = ChannelDelivery::requested();
        }
        deliveries
    }

    /// The record for `channel`.
    pub fn get(&self, channel: Channel) -> &ChannelDelivery {
        match channel {
            Channel::Push => &self.push,
            Channel::Sms => &self.sms,
            Channel::Email => &self.email,
        }
    }

    /// Mutable record for `channel`.
    pub fn get_mut(&mut self, channel: Channel) -> &mut ChannelDelivery {
        match channel {
            Channel::Push => &mut self.push,
            Channel::Sms => &mut self.sms,
            Channel::Email => &mut self.email,
        }
    }

    /// Channels that were planned.
    pub fn requested_channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.get(*c).requested)
            .collect()
    }

    /// Channels the gateway accepted.
    pub fn sent_channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.get(*c).sent)
            .collect()
    }

    /// Whether every planned channel has an outcome.
    pub fn all_resolved(&self) -> bool {
        Channel::ALL.into_iter().all(|c| self.get(c).is_resolved())
    }
}
