//! Capture of the DC from the provider's OAuth callback.
//!
//! Capture is best effort. A callback without a usable, allow-listed
//! endpoint stores nothing and still proceeds to the OAuth handler; the token
//! exchange then fails with [`BridgeError::DcNotFound`](crate::BridgeError)
//! instead of ever talking to an unvalidated host.

use std::sync::Arc;

use authgate_core::{AuthorizationCode, DcRecord, DcRegistry};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::handoff::DcHandoff;

/// Query parameters the provider appends to the callback redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    /// Authorization code.
    #[serde(default)]
    pub code: Option<String>,
    /// Base URL of the data center that issued the code.
    #[serde(default, rename = "accounts-server")]
    pub accounts_server: Option<String>,
    /// Region hint (`us`, `eu`, `in`, ...).
    #[serde(default)]
    pub location: Option<String>,
}

/// What the interceptor did with a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The DC was stored under the code.
    Captured,
    /// `code` or `accounts-server` was absent or empty.
    MissingParameters,
    /// The endpoint is not on the allow-list.
    Rejected,
    /// The store write failed.
    StoreFailed,
}

/// Validates and stores the DC carried by a callback.
#[derive(Clone)]
pub struct CallbackCapture {
    registry: Arc<DcRegistry>,
    handoff: DcHandoff,
}

impl CallbackCapture {
    /// Creates a capture step over `registry` and `handoff`.
    pub fn new(registry: Arc<DcRegistry>, handoff: DcHandoff) -> Self {
        Self { registry, handoff }
    }

    /// Checks the callback's endpoint against the registry and, when it
    /// passes, binds it to the code.
    pub async fn capture(&self, params: &CallbackParams) -> CaptureOutcome {
        let (Some(code), Some(endpoint)) = (
            params.code.as_deref().filter(|c| !c.is_empty()),
            params.accounts_server.as_deref().filter(|e| !e.is_empty()),
        ) else {
            debug!("Callback without code or accounts-server; nothing captured");
            return CaptureOutcome::MissingParameters;
        };

        if !self.registry.is_allowed(endpoint) {
            warn!(
                target: "audit",
                endpoint,
                location = params.location.as_deref(),
                "Rejected DC not on allow-list"
            );
            return CaptureOutcome::Rejected;
        }

        let code = AuthorizationCode::new(code);
        let dc = DcRecord::new(endpoint, params.location.clone());
        match self.handoff.bind_code(&code, &dc).await {
            Ok(()) => CaptureOutcome::Captured,
            Err(e) => {
                error!(error = %e, code = %code.fingerprint(), "Failed to store DC for code");
                CaptureOutcome::StoreFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::DownStore;
    use authgate_store::{EphemeralStore, MemoryStore};
    use std::time::Duration;

    fn capture_with(store: Arc<dyn EphemeralStore>) -> (CallbackCapture, DcHandoff) {
        let registry = DcRegistry::new(["https://accounts.zoho.com", "https://accounts.zoho.eu"])
            .expect("registry");
        let handoff = DcHandoff::new(
            store,
            "zoho",
            Duration::from_secs(180),
            Duration::from_secs(3600),
        );
        (
            CallbackCapture::new(Arc::new(registry), handoff.clone()),
            handoff,
        )
    }

    fn params(code: &str, server: &str) -> CallbackParams {
        CallbackParams {
            code: Some(code.to_string()),
            accounts_server: Some(server.to_string()),
            location: Some("eu".to_string()),
        }
    }

    #[tokio::test]
    async fn allow_listed_endpoint_is_captured() {
        let (capture, handoff) = capture_with(Arc::new(MemoryStore::default()));

        let outcome = capture
            .capture(&params("c1", "https://accounts.zoho.eu"))
            .await;

        assert_eq!(outcome, CaptureOutcome::Captured);
        let dc = handoff
            .code_dc(&AuthorizationCode::new("c1"))
            .await
            .expect("lookup")
            .expect("bound");
        assert_eq!(dc.endpoint(), "https://accounts.zoho.eu");
        assert_eq!(dc.region_hint(), Some("eu"));
    }

    #[tokio::test]
    async fn foreign_endpoint_is_never_stored() {
        let (capture, handoff) = capture_with(Arc::new(MemoryStore::default()));

        let outcome = capture
            .capture(&params("c1", "https://attacker.example"))
            .await;

        assert_eq!(outcome, CaptureOutcome::Rejected);
        assert_eq!(
            handoff
                .code_dc(&AuthorizationCode::new("c1"))
                .await
                .expect("lookup"),
            None
        );
    }

    #[tokio::test]
    async fn missing_or_empty_parameters_store_nothing() {
        let (capture, _) = capture_with(Arc::new(MemoryStore::default()));

        assert_eq!(
            capture.capture(&CallbackParams::default()).await,
            CaptureOutcome::MissingParameters
        );
        assert_eq!(
            capture.capture(&params("", "https://accounts.zoho.eu")).await,
            CaptureOutcome::MissingParameters
        );
        assert_eq!(
            capture.capture(&params("c1", "")).await,
            CaptureOutcome::MissingParameters
        );
    }

    #[tokio::test]
    async fn store_failure_is_reported_not_raised() {
        let (capture, _) = capture_with(Arc::new(DownStore));
        assert_eq!(
            capture
                .capture(&params("c1", "https://accounts.zoho.com"))
                .await,
            CaptureOutcome::StoreFailed
        );
    }
}
