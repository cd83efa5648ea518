//! Inbound frame validation.

use tidewatch_core::error::AppError;
use tidewatch_core::events::Room;

use super::types::InboundMessage;

/// Check raw frame size and content before parsing.
pub fn validate_inbound(raw: &str, max_size: usize) -> Result<(), AppError> {
    if raw.len() > max_size {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {max_size} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

/// Parse a validated frame.
pub fn parse_inbound(raw: &str) -> Result<InboundMessage, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::validation(format!("Failed to parse message: {e}")))
}

/// Validate a wire room name and resolve it.
pub fn validate_room_name(name: &str) -> Result<Room, AppError> {
    if name.is_empty() || name.len() > 64 {
        return Err(AppError::validation("Invalid room name length"));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ':' || c == '-')
    {
        return Err(AppError::validation("Room name contains invalid characters"));
    }

    Room::parse(name)
}
