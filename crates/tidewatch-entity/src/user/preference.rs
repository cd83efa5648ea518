//! Per-user channel opt-ins.

use serde::{Deserialize, Serialize};

use crate::notification::Channel;

/// Which delivery channels and notification streams a user accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    /// Mobile push.
    #[serde(default = "default_true")]
    pub push: bool,
    /// SMS.
    #[serde(default)]
    pub sms: bool,
    /// Email.
    #[serde(default = "default_true")]
    pub email: bool,
    /// Notifications about community reports near the user.
    #[serde(default = "default_true")]
    pub community_reports: bool,
}

impl NotificationPreferences {
    /// Whether the user opted into `channel`.
    pub fn opted_in(&self, channel: Channel) -> bool {
        match channel {
            Channel::Push => self.push,
            Channel::Sms => self.sms,
            Channel::Email => self.email,
        }
    }
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            push: true,
            sms: false,
            email: true,
            community_reports: true,
        }
    }
}

fn default_true() -> bool {
    true
}
