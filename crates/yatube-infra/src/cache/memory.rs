//! In-memory cache implementation - used when Redis is not configured.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use yatube_core::ports::{Cache, CacheError};

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// Process-local cache: a HashMap behind an async RwLock.
///
/// Entries expire on a wall-clock timer only; nothing invalidates them on
/// writes. Data is lost on process restart.
pub struct InMemoryCache {
    store: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored entries, expired ones not yet purged included.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        {
            let store = self.store.read().await;
            let entry = store.get(key)?;
            if !entry.is_expired(now) {
                return Some(entry.value.clone());
            }
        }

        let mut store = self.store.write().await;
        if store.get(key).is_some_and(|e| e.is_expired(now)) {
            store.remove(key);
        }
        None
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let now = Instant::now();
        let expires_at = ttl.map(|d| now + d);

        // Purge on write: a page key may never be read again.
        let mut store = self.store.write().await;
        store.retain(|_, entry| !entry.is_expired(now));
        store.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );

        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        self.get(key).await.is_some()
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        let dropped = store.len();
        store.clear();
        tracing::debug!(dropped, "In-memory cache cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();
        cache.set("key1", "value1", None).await.unwrap();
        assert_eq!(cache.get("key1").await, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = InMemoryCache::new();
        cache
            .set("page:/", "<ul></ul>", Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert!(cache.exists("page:/").await);

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(cache.get("page:/").await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_set_purges_expired_entries() {
        let cache = InMemoryCache::new();
        for i in 0..1000 {
            cache
                .set(&format!("page:/?junk={i}"), "<ul></ul>", Some(Duration::from_millis(1)))
                .await
                .unwrap();
        }
        cache.set("page:/?kept", "old", None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        cache
            .set("page:/", "<ul></ul>", Some(Duration::from_secs(20)))
            .await
            .unwrap();

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("page:/?kept").await, Some("old".to_string()));
    }

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let cache = InMemoryCache::new();
        cache.set("page:/", "a", None).await.unwrap();
        cache.set("page:/?page=2", "b", None).await.unwrap();

        cache.clear().await.unwrap();

        assert!(!cache.exists("page:/").await);
        assert!(!cache.exists("page:/?page=2").await);
    }
}
