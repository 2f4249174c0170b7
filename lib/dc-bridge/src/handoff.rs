//! Two-phase handoff of the DC record: bound to the code, then to the token.
//!
//! Keys are `<provider>:code:<code>` and `<provider>:token:<token>`; values
//! are JSON-encoded [`DcRecord`]s. Each transition touches one key at a time.
//! Read-then-delete is best effort: the provider's single-use codes are the
//! real replay guarantee.

use std::time::Duration;

use authgate_core::{AccessToken, AuthorizationCode, DcRecord};
use authgate_store::{SharedStore, StoreError};
use rootcause::Report;
use tracing::{debug, warn};

/// Store-backed DC routing state for one provider.
#[derive(Clone)]
pub struct DcHandoff {
    store: SharedStore,
    provider: String,
    code_ttl: Duration,
    token_ttl_ceiling: Duration,
}

impl DcHandoff {
    /// Creates a handoff over `store`, namespacing keys with `provider`.
    pub fn new(
        store: SharedStore,
        provider: impl Into<String>,
        code_ttl: Duration,
        token_ttl_ceiling: Duration,
    ) -> Self {
        Self {
            store,
            provider: provider.into(),
            code_ttl,
            token_ttl_ceiling,
        }
    }

    fn code_key(&self, code: &AuthorizationCode) -> String {
        format!("{}:code:{}", self.provider, code.expose())
    }

    fn token_key(&self, token: &AccessToken) -> String {
        format!("{}:token:{}", self.provider, token.expose())
    }

    /// TTL for a token-keyed entry: the provider-declared lifetime capped at
    /// the ceiling. A missing lifetime uses the ceiling.
    #[must_use]
    pub fn token_ttl(&self, expires_in: Option<u64>) -> Duration {
        expires_in
            .map(Duration::from_secs)
            .map_or(self.token_ttl_ceiling, |d| d.min(self.token_ttl_ceiling))
    }

    /// `NoEntry → CodeBound`. Callers must have checked the endpoint against
    /// the registry.
    pub async fn bind_code(
        &self,
        code: &AuthorizationCode,
        dc: &DcRecord,
    ) -> Result<(), Report<StoreError>> {
        self.store
            .put(&self.code_key(code), encode(dc), self.code_ttl)
            .await?;
        debug!(code = %code.fingerprint(), endpoint = dc.endpoint(), "DC bound to code");
        Ok(())
    }

    /// Returns the DC bound to `code`, or `None` if unbound or expired.
    pub async fn code_dc(
        &self,
        code: &AuthorizationCode,
    ) -> Result<Option<DcRecord>, Report<StoreError>> {
        let key = self.code_key(code);
        let raw = self.store.get(&key).await?;
        Ok(raw.and_then(|raw| decode(&key, &raw)))
    }

    /// `CodeBound → TokenBound`.
    ///
    /// Binds `dc` to `token` and then retires the code entry, whether or not
    /// the bind succeeded: the provider has already consumed the code.
    /// Returns the TTL applied to the token entry.
    pub async fn rebind_to_token(
        &self,
        code: &AuthorizationCode,
        token: &AccessToken,
        dc: &DcRecord,
        expires_in: Option<u64>,
    ) -> Result<Duration, Report<StoreError>> {
        let ttl = self.token_ttl(expires_in);
        let bound = self
            .store
            .put(&self.token_key(token), encode(dc), ttl)
            .await;

        if let Err(e) = self.store.delete(&self.code_key(code)).await {
            warn!(error = %e, code = %code.fingerprint(), "Failed to retire code entry");
        }

        bound?;
        debug!(
            token = %token.fingerprint(),
            ttl_seconds = ttl.as_secs(),
            "DC rebound to access token"
        );
        Ok(ttl)
    }

    /// Returns the DC bound to `token`, or `None` if unbound or expired.
    pub async fn token_dc(
        &self,
        token: &AccessToken,
    ) -> Result<Option<DcRecord>, Report<StoreError>> {
        let key = self.token_key(token);
        let raw = self.store.get(&key).await?;
        Ok(raw.and_then(|raw| decode(&key, &raw)))
    }

    /// `TokenBound → Consumed`.
    pub async fn consume_token(&self, token: &AccessToken) -> Result<(), Report<StoreError>> {
        self.store.delete(&self.token_key(token)).await
    }
}

fn encode(dc: &DcRecord) -> String {
    // A struct of two strings always serializes.
    serde_json::to_string(dc).unwrap_or_default()
}

fn decode(key: &str, raw: &str) -> Option<DcRecord> {
    match serde_json::from_str(raw) {
        Ok(dc) => Some(dc),
        Err(e) => {
            let namespace = key.rsplit_once(':').map_or(key, |(ns, _)| ns);
            warn!(error = %e, namespace, "Discarding undecodable DC record");
            None
        }
    }
}
