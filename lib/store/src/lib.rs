//! Ephemeral keyed store for short-lived routing state.
//!
//! The gateway hands routing state across requests through a shared store
//! with per-key expiry. Two backends implement [`EphemeralStore`]:
//! - [`RedisStore`]: shared across gateway instances, expiry handled by Redis
//! - [`MemoryStore`]: bounded in-process cache for single-instance use and tests
//!
//! Callers treat [`StoreError::BackendUnavailable`] like an absent key on any
//! security-relevant lookup.

mod config;
mod error;
mod memory;
mod redis_store;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rootcause::Report;

pub use config::StoreConfig;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Key/value backend with independent per-key expiry.
///
/// Every operation touches exactly one key and is atomic for that key.
#[async_trait]
pub trait EphemeralStore: Send + Sync {
    /// Stores `value` under `key`, replacing any existing entry. The entry
    /// disappears once `ttl` has elapsed.
    async fn put(&self, key: &str, value: String, ttl: Duration)
    -> Result<(), Report<StoreError>>;

    /// Returns the live value for `key`, or `None` if missing or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, Report<StoreError>>;

    /// Removes `key`. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), Report<StoreError>>;
}

/// Shared handle to a store backend.
pub type SharedStore = Arc<dyn EphemeralStore>;

/// Connects the backend selected by `config`.
///
/// # Errors
///
/// Returns an error if the Redis URL is invalid or the server is unreachable.
pub async fn connect(config: &StoreConfig) -> Result<SharedStore, Report<StoreError>> {
    match config.redis_url.as_deref() {
        Some(url) => {
            let store = RedisStore::connect(url).await?;
            tracing::info!("Using Redis ephemeral store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!(
                max_capacity = config.max_capacity,
                "No Redis URL configured; using in-process store (state is not shared across instances)"
            );
            Ok(Arc::new(MemoryStore::new(config.max_capacity)))
        }
    }
}
