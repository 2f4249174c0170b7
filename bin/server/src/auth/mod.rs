//! Authentication module for the authgate server.
//!
//! This module provides:
//! - The callback interceptor that captures the provider data center
//! - Token exchange and userinfo endpoints that route to that data center
//! - A generic OAuth sign-in flow that consumes those endpoints over HTTP
//!
//! # Routing Model
//!
//! The provider serves each account from one regional data center and names
//! it only on the browser callback (`accounts-server`). The sign-in flow is
//! written against fixed token and userinfo URLs, so those URLs point back at
//! this server, which forwards each call to the data center recorded for the
//! code (and later the token). Session and JWT issuance happen downstream of
//! the sign-in callback.

pub mod middleware;
pub mod routes;
pub mod zoho;

use authgate_dc_bridge::DcBridge;

pub use middleware::intercept_callback;
pub use routes::{token, userinfo};
pub use zoho::{ZohoOAuthClient, callback, sign_in};

/// Route the sign-in flow posts token requests to.
pub const TOKEN_ROUTE: &str = "/auth/zoho/token";

/// Route the sign-in flow fetches the profile from.
pub const USERINFO_ROUTE: &str = "/auth/zoho/userinfo";

/// Route that starts a sign-in.
pub const SIGN_IN_ROUTE: &str = "/api/auth/sign-in/zoho";

/// Shared application state.
pub struct AppState {
    /// DC routing bridge.
    pub bridge: DcBridge,
    /// OAuth client for the sign-in flow.
    pub zoho: ZohoOAuthClient,
    /// Path of the provider callback route.
    pub callback_path: String,
    /// Whether cookies carry the Secure flag.
    pub secure_cookies: bool,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        bridge: DcBridge,
        zoho: ZohoOAuthClient,
        callback_path: String,
        secure_cookies: bool,
    ) -> Self {
        Self {
            bridge,
            zoho,
            callback_path,
            secure_cookies,
        }
    }
}
