//! Token exchange and userinfo endpoints for the sign-in flow.

use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::AppState;
use crate::error::ApiError;

/// Exchanges an authorization code at the data center that issued it.
///
/// On success the provider's token payload is returned verbatim.
pub async fn token(
    State(state): State<Arc<AppState>>,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let reply = state.bridge.exchange.exchange(&form).await?;

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::OK);
    let content_type = reply
        .content_type
        .as_deref()
        .and_then(|v| HeaderValue::from_str(v).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    Ok((
        status,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        reply.body,
    )
        .into_response())
}

/// Fetches the normalized profile for the bearer token.
pub async fn userinfo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let profile = state.bridge.userinfo.fetch_profile(authorization).await?;
    Ok(Json(profile).into_response())
}
