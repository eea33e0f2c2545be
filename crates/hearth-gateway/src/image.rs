//! Image host interface.

use crate::GatewayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Content types accepted for upload.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/avif",
];

/// A file received from the admin panel.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.bytes.is_empty() {
            return Err(GatewayError::InvalidInput("Uploaded file is empty".into()));
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(GatewayError::InvalidInput(format!(
                "Uploaded file exceeds {} MB",
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }
        if !ALLOWED_CONTENT_TYPES.contains(&self.content_type.as_str()) {
            return Err(GatewayError::InvalidInput(format!(
                "Unsupported image type: {}",
                self.content_type
            )));
        }
        Ok(())
    }
}

/// Where an uploaded image ended up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, file: UploadFile) -> Result<UploadedImage, GatewayError>;

    /// Remove an image. Unknown ids are `NotFound`.
    async fn destroy(&self, public_id: &str) -> Result<(), GatewayError>;
}
