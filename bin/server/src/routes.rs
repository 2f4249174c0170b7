//! Liveness endpoints.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// Landing route.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to the auth gateway" }))
}

/// Health probe.
pub async fn ping() -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Server running" })),
    )
}
