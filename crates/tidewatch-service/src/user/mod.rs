//! User registration and profile updates.

pub mod service;

pub use service::UserService;
