//! Notification domain entities.

pub mod delivery;
pub mod kind;
pub mod model;
pub mod priority;

pub use delivery::{Channel, ChannelDeliveries, ChannelDelivery};
pub use kind::NotificationKind;
pub use model::{Notification, NotificationMetadata, OutboundMessage};
pub use priority::NotificationPriority;
