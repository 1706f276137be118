//! Media storage port - where uploaded post images live.

use async_trait::async_trait;

use crate::forms::UploadedFile;

#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store an upload and return its media-relative path.
    async fn save(&self, file: &UploadedFile) -> Result<String, MediaError>;

    /// Read a stored file back; `None` if nothing lives at `path`.
    async fn load(&self, path: &str) -> Result<Option<Vec<u8>>, MediaError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Invalid media path: {0}")]
    InvalidPath(String),

    #[error("Storage I/O failed: {0}")]
    Io(String),
}
