//! Report attachment value object.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Reference to an uploaded file. The bytes live in external storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Attachment {
    /// Original file name.
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    /// MIME type, e.g. `image/jpeg`.
    #[validate(length(min = 1, max = 100))]
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Location in external storage.
    #[validate(length(min = 1))]
    pub url: String,
}

impl Attachment {
    /// Whether the attachment is a photo.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}
