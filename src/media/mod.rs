/*!
 * Media Storage
 * Object storage for uploaded files, returning a public URL per object
 */
pub mod gallery;
pub mod local;
pub mod upload;

use async_trait::async_trait;
use std::sync::Arc;

pub use gallery::Gallery;
pub use local::LocalMediaStorage;
pub use upload::{upload, UploadFile, UploadPolicy, UploadTarget};

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Empty file")]
    Empty,

    #[error("File too large: {size} bytes (maximum is {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("{0} is not part of the gallery")]
    NotInGallery(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Stores `bytes` at `path` and returns the object's public URL.
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<String, MediaError>;
}

pub type SharedMedia = Arc<dyn MediaStorage>;
