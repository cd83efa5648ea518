//! Realtime room addressing and the event kinds emitted by the services.

pub mod kind;
pub mod room;

pub use kind::EventKind;
pub use room::Room;
