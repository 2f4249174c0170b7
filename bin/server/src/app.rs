//! Router assembly.

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{self, AppState, SIGN_IN_ROUTE, TOKEN_ROUTE, USERINFO_ROUTE};
use crate::routes;

/// Builds the application router.
///
/// The callback interceptor wraps every route so that it sees the provider
/// callback before the sign-in handler does.
pub fn router(state: Arc<AppState>, cors_origins: &[&str]) -> Router {
    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .route("/", get(routes::root))
        .route("/api/ping", get(routes::ping))
        .route(TOKEN_ROUTE, post(auth::token))
        .route(USERINFO_ROUTE, get(auth::userinfo))
        .route(SIGN_IN_ROUTE, get(auth::sign_in))
        .route(&state.callback_path, get(auth::callback))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::intercept_callback,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
