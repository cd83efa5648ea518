//! Core traits defined in `tidewatch-core` and implemented by other crates.

pub mod clock;
pub mod gateway;
pub mod publisher;
pub mod repository;

pub use clock::{Clock, ManualClock, SystemClock};
pub use gateway::{DeliveryFailure, EmailGateway, PushContent, PushGateway, SmsGateway};
pub use publisher::EventPublisher;
pub use repository::Repository;
