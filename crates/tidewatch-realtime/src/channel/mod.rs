//! Room channels and subscription bookkeeping.

pub mod registry;
pub mod room;
pub mod subscription;

pub use registry::RoomRegistry;
