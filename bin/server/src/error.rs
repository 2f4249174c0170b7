//! HTTP rendering of bridge failures.
//!
//! Every bridge failure becomes a 4xx JSON body: `{error}` for local
//! failures and `{error, err}` when the provider's response is relayed for
//! diagnostics. Internal details are logged, not returned.

use authgate_dc_bridge::BridgeError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rootcause::Report;
use serde_json::{Value, json};

/// Message returned whenever routing state is unknown.
const DC_NOT_FOUND: &str = "Zoho DC not found";

/// Wrapper that renders a [`BridgeError`] report as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub Report<BridgeError>);

impl From<Report<BridgeError>> for ApiError {
    fn from(report: Report<BridgeError>) -> Self {
        Self(report)
    }
}

/// Relays the provider's body as JSON when it is JSON, else as a string.
fn upstream_detail(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0.current_context() {
            BridgeError::MissingToken => (StatusCode::UNAUTHORIZED, json!({"error": "Missing token"})),
            BridgeError::MissingCode => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Missing authorization code"}),
            ),
            BridgeError::DcNotFound => (StatusCode::BAD_REQUEST, json!({"error": DC_NOT_FOUND})),
            BridgeError::BackendUnavailable { details } => {
                tracing::error!(%details, "Routing store unavailable; failing closed");
                (StatusCode::BAD_REQUEST, json!({"error": DC_NOT_FOUND}))
            }
            BridgeError::UpstreamExchangeFailed { body, .. } => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Token exchange failed", "err": upstream_detail(body)}),
            ),
            BridgeError::UpstreamUserinfoFailed { body, .. } => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Userinfo fetch failed", "err": upstream_detail(body)}),
            ),
            BridgeError::UpstreamUnreachable { details } => {
                tracing::error!(%details, "Provider unreachable");
                (
                    StatusCode::FAILED_DEPENDENCY,
                    json!({"error": "Provider unreachable"}),
                )
            }
            BridgeError::InvalidConfiguration { details } => {
                tracing::error!(%details, "Bridge misconfigured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Internal server error"}),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
