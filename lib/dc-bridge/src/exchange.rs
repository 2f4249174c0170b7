//! Token exchange against the data center that issued the code.

use authgate_core::{AccessToken, AuthorizationCode};
use rootcause::Report;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::error::BridgeError;
use crate::handoff::DcHandoff;
use crate::upstream::{UpstreamClient, UpstreamReply};

/// Handles the token request issued by the generic OAuth flow.
#[derive(Clone)]
pub struct TokenExchangeBridge {
    handoff: DcHandoff,
    upstream: UpstreamClient,
    token_path: String,
}

impl TokenExchangeBridge {
    /// Creates a bridge that POSTs to `<dc>/<token_path>`.
    pub fn new(handoff: DcHandoff, upstream: UpstreamClient, token_path: String) -> Self {
        Self {
            handoff,
            upstream,
            token_path,
        }
    }

    /// Exchanges the code in `form` at its originating data center.
    ///
    /// The form is forwarded unchanged. On success the DC is rebound to the
    /// issued access token and the provider's response is returned verbatim.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::MissingCode`]: no `code` field
    /// - [`BridgeError::DcNotFound`]: code never captured, already exchanged, or expired
    /// - [`BridgeError::BackendUnavailable`]: the store failed
    /// - [`BridgeError::UpstreamUnreachable`]: the provider could not be reached
    /// - [`BridgeError::UpstreamExchangeFailed`]: the provider rejected the code
    #[instrument(skip_all)]
    pub async fn exchange(
        &self,
        form: &[(String, String)],
    ) -> Result<UpstreamReply, Report<BridgeError>> {
        let code = form
            .iter()
            .find(|(name, _)| name == "code")
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
            .map(AuthorizationCode::new)
            .ok_or(BridgeError::MissingCode)?;

        let dc = match self.handoff.code_dc(&code).await {
            Ok(Some(dc)) => dc,
            Ok(None) => {
                warn!(code = %code.fingerprint(), "No DC bound to authorization code");
                return Err(BridgeError::DcNotFound.into());
            }
            Err(e) => {
                error!(error = %e, "Store lookup failed during token exchange");
                return Err(BridgeError::BackendUnavailable {
                    details: e.to_string(),
                }
                .into());
            }
        };

        let reply = self
            .upstream
            .post_form(&dc.url_for(&self.token_path), form)
            .await?;

        if !reply.is_success() {
            warn!(status = reply.status, endpoint = dc.endpoint(), "Token exchange rejected");
            return Err(BridgeError::UpstreamExchangeFailed {
                status: reply.status,
                body: reply.body,
            }
            .into());
        }

        // The provider reports some failures (e.g. `invalid_code`) with a 200.
        let Some((token, expires_in)) = reply.json().as_ref().and_then(token_fields) else {
            warn!(endpoint = dc.endpoint(), "Token response carried no access token");
            return Err(BridgeError::UpstreamExchangeFailed {
                status: reply.status,
                body: reply.body,
            }
            .into());
        };

        let ttl = self
            .handoff
            .rebind_to_token(&code, &token, &dc, expires_in)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to bind DC to access token");
                BridgeError::BackendUnavailable {
                    details: e.to_string(),
                }
            })?;

        info!(
            endpoint = dc.endpoint(),
            token_binding_ttl_seconds = ttl.as_secs(),
            "Token exchanged at regional endpoint"
        );
        Ok(reply)
    }
}

/// Pulls `access_token` and `expires_in` (number or numeric string).
fn token_fields(body: &Value) -> Option<(AccessToken, Option<u64>)> {
    let token = body
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())?;
    let expires_in = body.get("expires_in").and_then(|v| {
        v.as_u64()
            .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
    });
    Some((AccessToken::new(token), expires_in))
}
