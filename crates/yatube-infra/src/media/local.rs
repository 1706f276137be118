//! Media storage on the local filesystem.

use std::path::PathBuf;

use async_trait::async_trait;

use yatube_core::forms::UploadedFile;
use yatube_core::ports::{MediaError, MediaStorage};

use super::{check_media_path, new_media_path};

/// Stores uploads below a root directory (`MEDIA_ROOT`).
pub struct LocalMediaStorage {
    root: PathBuf,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn save(&self, file: &UploadedFile) -> Result<String, MediaError> {
        let path = new_media_path(file);
        let target = self.root.join(&path);

        if let Some(dir) = target.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| MediaError::Io(e.to_string()))?;
        }
        tokio::fs::write(&target, &file.data)
            .await
            .map_err(|e| MediaError::Io(e.to_string()))?;

        tracing::debug!(path = %path, bytes = file.data.len(), "Stored upload");
        Ok(path)
    }

    async fn load(&self, path: &str) -> Result<Option<Vec<u8>>, MediaError> {
        check_media_path(path)?;

        match tokio::fs::read(self.root.join(path)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MediaError::Io(e.to_string())),
        }
    }
}
