//! In-memory media storage - used in tests and throwaway runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use yatube_core::forms::UploadedFile;
use yatube_core::ports::{MediaError, MediaStorage};

use super::{check_media_path, new_media_path};

#[derive(Default)]
pub struct InMemoryMediaStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryMediaStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MediaStorage for InMemoryMediaStorage {
    async fn save(&self, file: &UploadedFile) -> Result<String, MediaError> {
        let path = new_media_path(file);
        self.files
            .write()
            .await
            .insert(path.clone(), file.data.clone());
        Ok(path)
    }

    async fn load(&self, path: &str) -> Result<Option<Vec<u8>>, MediaError> {
        check_media_path(path)?;
        Ok(self.files.read().await.get(path).cloned())
    }
}
