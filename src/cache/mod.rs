//! Result cache used by `search`.
//!
//! Best effort only: reads and writes are unsynchronised with the store and
//! there is no invalidation, so a cached result lives until it expires.

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use std::time::{Duration, Instant};

const DEFAULT_CAPACITY: u64 = 10_000;

#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value` for `ttl` unless a live entry already exists for `key`.
    async fn add(&self, key: &str, value: String, ttl: Duration);
}

#[derive(Debug, Clone)]
struct CachedValue {
    payload: String,
    ttl: Duration,
}

struct PerEntryExpiry;

impl Expiry<String, CachedValue> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache with a per-entry time to live.
#[derive(Clone)]
pub struct MemoryCache {
    inner: Cache<String, CachedValue>,
}

impl MemoryCache {
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(PerEntryExpiry)
                .build(),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.map(|v| v.payload)
    }

    async fn add(&self, key: &str, value: String, ttl: Duration) {
        self.inner
            .entry(key.to_string())
            .or_insert(CachedValue {
                payload: value,
                ttl,
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_added_value() {
        let cache = MemoryCache::default();
        cache
            .add("k", "v".to_string(), Duration::from_secs(30))
            .await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
        assert!(cache.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_add_does_not_overwrite_live_entry() {
        let cache = MemoryCache::default();
        cache
            .add("k", "first".to_string(), Duration::from_secs(30))
            .await;
        cache
            .add("k", "second".to_string(), Duration::from_secs(30))
            .await;
        assert_eq!(cache.get("k").await.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let cache = MemoryCache::default();
        cache
            .add("k", "v".to_string(), Duration::from_millis(50))
            .await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(cache.get("k").await.is_none());
    }
}
