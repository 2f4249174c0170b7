//! Multi-datacenter OAuth bridging.
//!
//! Providers that shard accounts by region tell the client which data center
//! issued an authorization code only on the browser callback
//! (`accounts-server`). The token exchange and userinfo calls that follow
//! carry no such hint, so this crate carries the routing state across the
//! handshake:
//!
//! ```text
//! NoEntry ──callback──▶ CodeBound(code) ──exchange──▶ TokenBound(token) ──userinfo──▶ Consumed
//!                            │                              │
//!                            └──────── TTL ──▶ Expired ◀────┘
//! ```
//!
//! - [`CallbackCapture`] validates the callback's endpoint against the
//!   [`DcRegistry`](authgate_core::DcRegistry) and binds it to the code.
//! - [`TokenExchangeBridge`] resolves the code, exchanges it at the right data
//!   center and rebinds the DC to the access token.
//! - [`ProfileFetchBridge`] resolves the token, fetches and normalizes the
//!   profile and retires the binding.
//!
//! All state lives in an [`EphemeralStore`](authgate_store::EphemeralStore);
//! transitions attempted out of order fail with [`BridgeError::DcNotFound`].

mod capture;
mod config;
mod error;
mod exchange;
mod handoff;
mod upstream;
mod userinfo;

#[cfg(test)]
mod test_support;

use authgate_store::SharedStore;
use rootcause::Report;
use std::sync::Arc;

pub use capture::{CallbackCapture, CallbackParams, CaptureOutcome};
pub use config::BridgeConfig;
pub use error::BridgeError;
pub use exchange::TokenExchangeBridge;
pub use handoff::DcHandoff;
pub use upstream::{UpstreamClient, UpstreamReply};
pub use userinfo::{ProfileFetchBridge, bearer_token};

/// The three bridge components wired to one store and registry.
#[derive(Clone)]
pub struct DcBridge {
    /// Callback interceptor logic.
    pub capture: CallbackCapture,
    /// Token exchange handler logic.
    pub exchange: TokenExchangeBridge,
    /// Userinfo handler logic.
    pub userinfo: ProfileFetchBridge,
}

impl DcBridge {
    /// Builds all components from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidConfiguration`] if the allow-list is
    /// invalid or the HTTP client cannot be constructed.
    pub fn new(config: &BridgeConfig, store: SharedStore) -> Result<Self, Report<BridgeError>> {
        let registry = config
            .registry()
            .map_err(|e| BridgeError::InvalidConfiguration {
                details: e.to_string(),
            })?;

        let handoff = DcHandoff::new(
            store,
            config.provider_id.clone(),
            config.code_ttl(),
            config.token_ttl_ceiling(),
        );
        let upstream = UpstreamClient::new(config.upstream_timeout())?;

        tracing::info!(
            provider = %config.provider_id,
            allowed_endpoints = registry.len(),
            code_ttl_seconds = config.code_ttl_seconds,
            token_ttl_ceiling_seconds = config.token_ttl_ceiling_seconds,
            "DC bridge configured"
        );

        Ok(Self {
            capture: CallbackCapture::new(Arc::new(registry), handoff.clone()),
            exchange: TokenExchangeBridge::new(
                handoff.clone(),
                upstream.clone(),
                config.token_path.clone(),
            ),
            userinfo: ProfileFetchBridge::new(handoff, upstream, config.userinfo_path.clone()),
        })
    }
}
