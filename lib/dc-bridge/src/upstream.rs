//! HTTP client for the provider's regional endpoints.

use std::time::Duration;

use rootcause::Report;

use crate::error::BridgeError;

/// Raw provider response relayed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl UpstreamReply {
    /// True for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the body as JSON, if it is JSON.
    #[must_use]
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Thin wrapper over a shared [`reqwest::Client`].
///
/// Redirects are never followed: a 3xx from a token endpoint would otherwise
/// carry the code and client secret to a host the registry never saw.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
}

impl UpstreamClient {
    /// Creates a client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidConfiguration`] if the TLS backend
    /// cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, Report<BridgeError>> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeError::InvalidConfiguration {
                details: format!("HTTP client error: {e}"),
            })?;
        Ok(Self { http })
    }

    /// POSTs `form` to `url` as `application/x-www-form-urlencoded`.
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<UpstreamReply, Report<BridgeError>> {
        let request = self
            .http
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(form);
        send(request).await
    }

    /// GETs `url` with `Authorization: Bearer <token>`.
    pub async fn get_bearer(
        &self,
        url: &str,
        token: &str,
    ) -> Result<UpstreamReply, Report<BridgeError>> {
        let request = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(token);
        send(request).await
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<UpstreamReply, Report<BridgeError>> {
    let response = request
        .send()
        .await
        .map_err(|e| BridgeError::UpstreamUnreachable {
            details: e.without_url().to_string(),
        })?;

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response
        .text()
        .await
        .map_err(|e| BridgeError::UpstreamUnreachable {
            details: e.without_url().to_string(),
        })?;

    Ok(UpstreamReply {
        status,
        content_type,
        body,
    })
}
