//! Callback interceptor.
//!
//! Runs ahead of every route, but only acts on `GET <callback path>`. It
//! captures the data center from the query string and then always hands the
//! request on unchanged; it never answers the client itself.

use axum::{
    extract::{Query, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use authgate_dc_bridge::{CallbackParams, CaptureOutcome};
use std::sync::Arc;

use super::AppState;

/// Axum middleware that records the callback's DC before the OAuth handler runs.
pub async fn intercept_callback(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::GET && request.uri().path() == state.callback_path {
        let params = Query::<CallbackParams>::try_from_uri(request.uri())
            .map(|Query(params)| params)
            .unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Unparseable callback query; skipping DC capture");
                CallbackParams::default()
            });

        let outcome = state.bridge.capture.capture(&params).await;
        if outcome != CaptureOutcome::Captured {
            tracing::debug!(?outcome, "Callback forwarded without DC capture");
        }
    }

    next.run(request).await
}
