//! Connection handles, the connection pool and inbound routing.

pub mod handle;
pub mod manager;
pub mod pool;

pub use handle::{ConnectionHandle, ConnectionId, SendOutcome};
pub use manager::ConnectionManager;
pub use pool::ConnectionPool;
