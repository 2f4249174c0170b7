//! Profile fetch against the data center bound to an access token.

use authgate_core::{AccessToken, CanonicalProfile};
use rootcause::Report;
use tracing::{error, info, instrument, warn};

use crate::error::BridgeError;
use crate::handoff::DcHandoff;
use crate::upstream::UpstreamClient;

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively; anything else yields `None`.
#[must_use]
pub fn bearer_token(header: Option<&str>) -> Option<AccessToken> {
    let (scheme, token) = header?.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty())
        .then(|| AccessToken::new(token))
}

/// Handles the userinfo request issued by the generic OAuth flow.
#[derive(Clone)]
pub struct ProfileFetchBridge {
    handoff: DcHandoff,
    upstream: UpstreamClient,
    userinfo_path: String,
}

impl ProfileFetchBridge {
    /// Creates a bridge that GETs `<dc>/<userinfo_path>`.
    pub fn new(handoff: DcHandoff, upstream: UpstreamClient, userinfo_path: String) -> Self {
        Self {
            handoff,
            upstream,
            userinfo_path,
        }
    }

    /// Fetches and normalizes the profile for the bearer token in
    /// `authorization`, then retires the token's DC binding.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::MissingToken`]: no usable bearer credential
    /// - [`BridgeError::DcNotFound`]: token not bound, already used, or expired
    /// - [`BridgeError::BackendUnavailable`]: the store failed
    /// - [`BridgeError::UpstreamUnreachable`]: the provider could not be reached
    /// - [`BridgeError::UpstreamUserinfoFailed`]: the provider rejected the
    ///   token or returned an unusable profile
    #[instrument(skip_all)]
    pub async fn fetch_profile(
        &self,
        authorization: Option<&str>,
    ) -> Result<CanonicalProfile, Report<BridgeError>> {
        let token = bearer_token(authorization).ok_or(BridgeError::MissingToken)?;

        let dc = match self.handoff.token_dc(&token).await {
            Ok(Some(dc)) => dc,
            Ok(None) => {
                warn!(token = %token.fingerprint(), "No DC bound to access token");
                return Err(BridgeError::DcNotFound.into());
            }
            Err(e) => {
                error!(error = %e, "Store lookup failed during userinfo");
                return Err(BridgeError::BackendUnavailable {
                    details: e.to_string(),
                }
                .into());
            }
        };

        let reply = self
            .upstream
            .get_bearer(&dc.url_for(&self.userinfo_path), token.expose())
            .await?;

        if !reply.is_success() {
            warn!(status = reply.status, endpoint = dc.endpoint(), "Userinfo rejected");
            return Err(BridgeError::UpstreamUserinfoFailed {
                status: reply.status,
                body: reply.body,
            }
            .into());
        }

        let profile = reply
            .json()
            .ok_or_else(|| "profile is not JSON".to_string())
            .and_then(|raw| CanonicalProfile::from_provider(&raw).map_err(|e| e.to_string()));
        let profile = match profile {
            Ok(profile) => profile,
            Err(reason) => {
                warn!(%reason, endpoint = dc.endpoint(), "Unusable userinfo payload");
                return Err(BridgeError::UpstreamUserinfoFailed {
                    status: reply.status,
                    body: reply.body,
                }
                .into());
            }
        };

        if let Err(e) = self.handoff.consume_token(&token).await {
            warn!(error = %e, token = %token.fingerprint(), "Failed to retire token entry");
        }

        info!(endpoint = dc.endpoint(), subject = %profile.id, "Profile fetched");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::DownStore;
    use authgate_core::{AuthorizationCode, DcRecord};
    use authgate_store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn handoff() -> DcHandoff {
        DcHandoff::new(
            Arc::new(MemoryStore::default()),
            "zoho",
            Duration::from_secs(180),
            Duration::from_secs(3600),
        )
    }

    fn bridge(handoff: &DcHandoff) -> ProfileFetchBridge {
        ProfileFetchBridge::new(
            handoff.clone(),
            UpstreamClient::new(Duration::from_secs(5)).expect("client"),
            "/oauth/user/info".to_string(),
        )
    }

    async fn bind_token(handoff: &DcHandoff, token: &str, endpoint: &str) {
        let code = AuthorizationCode::new(format!("code-for-{token}"));
        let dc = DcRecord::new(endpoint, None);
        handoff.bind_code(&code, &dc).await.expect("bind");
        handoff
            .rebind_to_token(&code, &AccessToken::new(token), &dc, Some(3600))
            .await
            .expect("rebind");
    }

    async fn userinfo_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth/user/info"))
            .and(header("authorization", "Bearer t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ZUID": 123,
                "Email": "Ada@Example.COM",
                "Display_Name": "Ada Lovelace",
            })))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(
            bearer_token(Some("Bearer abc")).map(|t| t.expose().to_string()),
            Some("abc".to_string())
        );
        assert!(bearer_token(Some("bearer abc")).is_some());
        assert!(bearer_token(Some("Basic abc")).is_none());
        assert!(bearer_token(Some("Bearer ")).is_none());
        assert!(bearer_token(Some("Bearer")).is_none());
        assert!(bearer_token(None).is_none());
    }

    #[tokio::test]
    async fn profile_is_fetched_once_per_token() {
        let handoff = handoff();
        let server = userinfo_server().await;
        bind_token(&handoff, "t1", &server.uri()).await;
        let bridge = bridge(&handoff);

        let profile = bridge
            .fetch_profile(Some("Bearer t1"))
            .await
            .expect("profile");
        assert_eq!(profile.id, "123");
        assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
        assert_eq!(profile.name, "Ada Lovelace");
        assert!(profile.email_verified);
        assert_eq!(profile.image, None);

        let err = bridge
            .fetch_profile(Some("Bearer t1"))
            .await
            .expect_err("second fetch must fail");
        assert_eq!(err.current_context(), &BridgeError::DcNotFound);
    }

    #[tokio::test]
    async fn missing_header_is_missing_token() {
        let handoff = handoff();
        let err = bridge(&handoff)
            .fetch_profile(None)
            .await
            .expect_err("fail");
        assert_eq!(err.current_context(), &BridgeError::MissingToken);
    }

    #[tokio::test]
    async fn unbound_token_is_dc_not_found() {
        let handoff = handoff();
        let err = bridge(&handoff)
            .fetch_profile(Some("Bearer unknown"))
            .await
            .expect_err("fail");
        assert_eq!(err.current_context(), &BridgeError::DcNotFound);
    }

    #[tokio::test]
    async fn provider_rejection_keeps_binding_and_surfaces_body() {
        let handoff = handoff();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"code": "INVALID_OAUTHTOKEN"})))
            .mount(&server)
            .await;
        bind_token(&handoff, "t1", &server.uri()).await;

        let err = bridge(&handoff)
            .fetch_profile(Some("Bearer t1"))
            .await
            .expect_err("fail");
        match err.current_context() {
            BridgeError::UpstreamUserinfoFailed { status, body } => {
                assert_eq!(*status, 401);
                assert!(body.contains("INVALID_OAUTHTOKEN"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(
            handoff
                .token_dc(&AccessToken::new("t1"))
                .await
                .expect("lookup")
                .is_some()
        );
    }

    #[tokio::test]
    async fn profile_without_subject_is_rejected() {
        let handoff = handoff();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Email": "a@b.com"})))
            .mount(&server)
            .await;
        bind_token(&handoff, "t1", &server.uri()).await;

        let err = bridge(&handoff)
            .fetch_profile(Some("Bearer t1"))
            .await
            .expect_err("fail");
        assert!(matches!(
            err.current_context(),
            BridgeError::UpstreamUserinfoFailed { status: 200, .. }
        ));
    }

    #[tokio::test]
    async fn store_outage_fails_closed_without_calling_provider() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let handoff = DcHandoff::new(
            Arc::new(DownStore),
            "zoho",
            Duration::from_secs(180),
            Duration::from_secs(3600),
        );
        let err = bridge(&handoff)
            .fetch_profile(Some("Bearer t1"))
            .await
            .expect_err("fail");
        assert!(matches!(
            err.current_context(),
            BridgeError::BackendUnavailable { .. }
        ));
    }
}
