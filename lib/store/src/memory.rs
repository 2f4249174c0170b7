//! In-process store backed by a moka cache with per-entry expiry.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use rootcause::Report;

use crate::{EphemeralStore, StoreError};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with. A replacing put
/// restarts the clock with the new TTL.
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Bounded in-process [`EphemeralStore`].
///
/// State lives only in this process; run Redis when more than one gateway
/// instance serves the callback and token routes.
#[derive(Clone)]
pub struct MemoryStore {
    cache: Cache<String, Entry>,
}

impl MemoryStore {
    /// Creates a store holding at most `max_capacity` entries.
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();
        Self { cache }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl EphemeralStore for MemoryStore {
    async fn put(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), Report<StoreError>> {
        self.cache.insert(key.to_string(), Entry { value, ttl }).await;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Report<StoreError>> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn delete(&self, key: &str) -> Result<(), Report<StoreError>> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_returns_value() {
        let store = MemoryStore::default();
        store
            .put("zoho:code:abc", "v1".to_string(), Duration::from_secs(60))
            .await
            .expect("put");

        assert_eq!(
            store.get("zoho:code:abc").await.expect("get"),
            Some("v1".to_string())
        );
        assert_eq!(store.get("zoho:code:other").await.expect("get"), None);
    }

    #[tokio::test]
    async fn put_replaces_existing_entry() {
        let store = MemoryStore::default();
        store
            .put("k", "old".to_string(), Duration::from_secs(60))
            .await
            .expect("put");
        store
            .put("k", "new".to_string(), Duration::from_secs(60))
            .await
            .expect("put");

        assert_eq!(store.get("k").await.expect("get"), Some("new".to_string()));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::default();
        store
            .put("k", "v".to_string(), Duration::from_secs(60))
            .await
            .expect("put");

        store.delete("k").await.expect("first delete");
        store.delete("k").await.expect("second delete");
        assert_eq!(store.get("k").await.expect("get"), None);
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let store = MemoryStore::default();
        store
            .put("short", "v".to_string(), Duration::from_millis(300))
            .await
            .expect("put");
        store
            .put("long", "v".to_string(), Duration::from_secs(60))
            .await
            .expect("put");

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(store.get("short").await.expect("get").is_some());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(store.get("short").await.expect("get").is_none());
        assert!(store.get("long").await.expect("get").is_some());
    }

    #[tokio::test]
    async fn replacing_put_applies_the_new_ttl() {
        let store = MemoryStore::default();
        store
            .put("k", "v".to_string(), Duration::from_secs(60))
            .await
            .expect("put");
        store
            .put("k", "v2".to_string(), Duration::from_millis(200))
            .await
            .expect("put");

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(store.get("k").await.expect("get").is_none());
    }
}
