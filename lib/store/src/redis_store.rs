//! Redis-backed store shared by every gateway instance.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use rootcause::Report;
use tracing::instrument;

use crate::{EphemeralStore, StoreError};

/// [`EphemeralStore`] over a multiplexed, auto-reconnecting Redis connection.
///
/// Expiry is delegated to Redis (`PSETEX`), so unread entries are reclaimed
/// without any in-process timer.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Opens a connection manager for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfiguration`] for a malformed URL and
    /// [`StoreError::BackendUnavailable`] if the initial connection fails.
    pub async fn connect(url: &str) -> Result<Self, Report<StoreError>> {
        let client =
            redis::Client::open(url).map_err(|e| StoreError::InvalidConfiguration {
                details: e.to_string(),
            })?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(unavailable)?;

        Ok(Self { conn })
    }
}

fn unavailable(e: redis::RedisError) -> StoreError {
    StoreError::BackendUnavailable {
        details: e.to_string(),
    }
}

/// Redis expiry in whole milliseconds, never zero (a zero TTL is rejected).
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl EphemeralStore for RedisStore {
    #[instrument(skip(self, key, value), fields(ttl_ms = ttl_millis(ttl)))]
    async fn put(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> Result<(), Report<StoreError>> {
        let mut conn = self.conn.clone();
        conn.pset_ex::<_, _, ()>(key, value, ttl_millis(ttl))
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, Report<StoreError>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await.map_err(unavailable)?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<(), Report<StoreError>> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(unavailable)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_is_rounded_to_millis_with_floor_of_one() {
        assert_eq!(ttl_millis(Duration::from_secs(180)), 180_000);
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
        assert_eq!(ttl_millis(Duration::ZERO), 1);
    }

    #[tokio::test]
    async fn malformed_url_is_a_configuration_error() {
        let err = match RedisStore::connect("not a url").await {
            Ok(_) => panic!("connect should fail"),
            Err(err) => err,
        };
        assert!(matches!(
            err.current_context(),
            StoreError::InvalidConfiguration { .. }
        ));
    }
}
