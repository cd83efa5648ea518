//! Convenience result type alias for Tidewatch.

use crate::error::AppError;

/// A specialized `Result` type for Tidewatch operations.
pub type AppResult<T> = Result<T, AppError>;
