//! Zoho sign-in flow.
//!
//! This module handles the OAuth 2.0 authorization code flow:
//! - `/api/auth/sign-in/zoho` - Redirects the browser to the provider
//! - `/api/auth/oauth2/callback/zoho` - Handles the provider callback
//!
//! The token and userinfo URLs the client uses are this gateway's own
//! endpoints, so each call reaches the data center the callback named.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use authgate_core::CanonicalProfile;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EmptyExtraTokenFields, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope,
    StandardTokenResponse, TokenResponse, TokenUrl,
    basic::{BasicClient, BasicTokenType},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use time::Duration as TimeDuration;

use super::{AppState, TOKEN_ROUTE, USERINFO_ROUTE};
use crate::config::ZohoClientConfig;

/// Cookie name for sign-in state.
const ZOHO_AUTH_STATE_COOKIE: &str = "zoho_auth_state";

/// Timeout for the calls the client makes to this gateway.
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

type ZohoTokenResponse = StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>;

/// OAuth client for the sign-in flow.
#[derive(Clone)]
pub struct ZohoOAuthClient {
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
    userinfo_url: String,
    scopes: Vec<String>,
    http: reqwest::Client,
}

impl ZohoOAuthClient {
    /// Creates a new client from configuration.
    ///
    /// `public_base_url` is where this gateway is reachable; the token and
    /// userinfo routes are resolved against it.
    ///
    /// # Errors
    ///
    /// Returns an error if any URL is invalid.
    pub fn new(config: &ZohoClientConfig, public_base_url: &str) -> Result<Self, SignInError> {
        let base = public_base_url.trim_end_matches('/');

        let auth_url = AuthUrl::new(config.authorization_url.clone())
            .map_err(|e| SignInError::Configuration(format!("invalid authorization URL: {e}")))?;
        let token_url = TokenUrl::new(format!("{base}{TOKEN_ROUTE}"))
            .map_err(|e| SignInError::Configuration(format!("invalid token URL: {e}")))?;
        let redirect_url = RedirectUrl::new(config.redirect_uri.clone())
            .map_err(|e| SignInError::Configuration(format!("invalid redirect URL: {e}")))?;

        // Token responses must not be followed anywhere.
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| SignInError::Configuration(format!("HTTP client error: {e}")))?;

        Ok(Self {
            client_id: ClientId::new(config.client_id.clone()),
            client_secret: ClientSecret::new(config.client_secret.clone()),
            auth_url,
            token_url,
            redirect_url,
            userinfo_url: format!("{base}{USERINFO_ROUTE}"),
            scopes: config.scopes().into_iter().map(str::to_string).collect(),
            http,
        })
    }

    /// Generates the authorization URL.
    ///
    /// Returns the URL to redirect the user to, along with auth state to store.
    pub fn authorization_url(&self) -> (String, ZohoAuthState) {
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_redirect_uri(self.redirect_url.clone());

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge)
            .add_extra_param("access_type", "offline");

        for scope in &self.scopes {
            auth_request = auth_request.add_scope(Scope::new(scope.clone()));
        }

        let (auth_url, csrf_token) = auth_request.url();

        let state = ZohoAuthState {
            csrf_token: csrf_token.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        };

        (auth_url.to_string(), state)
    }

    /// Exchanges the authorization code through the gateway's token route.
    ///
    /// # Errors
    ///
    /// Returns [`SignInError::TokenExchange`] when the exchange is refused.
    pub async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<String, SignInError> {
        // Zoho expects client credentials in the form body.
        let client = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
            .set_auth_type(AuthType::RequestBody);

        let token_result: ZohoTokenResponse = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| SignInError::TokenExchange(e.to_string()))?;

        Ok(token_result.access_token().secret().clone())
    }

    /// Fetches the normalized profile through the gateway's userinfo route.
    ///
    /// # Errors
    ///
    /// Returns [`SignInError::Userinfo`] when the profile cannot be fetched.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<CanonicalProfile, SignInError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| SignInError::Userinfo(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SignInError::Userinfo(format!("{status}: {body}")));
        }

        response
            .json::<CanonicalProfile>()
            .await
            .map_err(|e| SignInError::Userinfo(e.to_string()))
    }
}

/// State stored in a cookie between sign-in start and callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZohoAuthState {
    pub csrf_token: String,
    pub pkce_verifier: String,
}

/// Sign-in flow errors.
#[derive(Debug)]
pub enum SignInError {
    /// Configuration error.
    Configuration(String),
    /// The provider redirected back with an error instead of a code.
    ProviderDenied(String),
    /// Callback arrived without a code.
    MissingCode,
    /// Missing or unreadable auth state cookie.
    MissingAuthState,
    /// CSRF token mismatch.
    CsrfMismatch,
    /// Token exchange failed.
    TokenExchange(String),
    /// Profile fetch failed.
    Userinfo(String),
}

impl std::fmt::Display for SignInError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "Configuration error: {msg}"),
            Self::ProviderDenied(msg) => write!(f, "Provider returned error: {msg}"),
            Self::MissingCode => write!(f, "Missing authorization code"),
            Self::MissingAuthState => write!(f, "Missing auth state"),
            Self::CsrfMismatch => write!(f, "CSRF token mismatch"),
            Self::TokenExchange(msg) => write!(f, "Token exchange error: {msg}"),
            Self::Userinfo(msg) => write!(f, "Userinfo error: {msg}"),
        }
    }
}

impl std::error::Error for SignInError {}

impl IntoResponse for SignInError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Configuration(msg) => {
                tracing::error!("Sign-in misconfigured: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error")
            }
            Self::ProviderDenied(msg) => {
                tracing::warn!("Provider denied sign-in: {}", msg);
                (StatusCode::BAD_REQUEST, "Sign-in was denied")
            }
            Self::MissingCode => (StatusCode::BAD_REQUEST, "Missing authorization code"),
            Self::MissingAuthState => (StatusCode::BAD_REQUEST, "Missing authentication state"),
            Self::CsrfMismatch => (StatusCode::BAD_REQUEST, "Invalid request state"),
            Self::TokenExchange(msg) => {
                tracing::warn!("Sign-in token exchange failed: {}", msg);
                (StatusCode::BAD_REQUEST, "Authentication failed")
            }
            Self::Userinfo(msg) => {
                tracing::warn!("Sign-in profile fetch failed: {}", msg);
                (StatusCode::BAD_REQUEST, "Authentication failed")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Query parameters for the provider callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code from the provider.
    pub code: Option<String>,
    /// CSRF state token.
    pub state: Option<String>,
    /// Error code when the user declined or the request was invalid.
    pub error: Option<String>,
}

/// Starts a sign-in by redirecting to the provider.
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, SignInError> {
    let (auth_url, auth_state) = state.zoho.authorization_url();

    let state_json = serde_json::to_string(&auth_state)
        .map_err(|e| SignInError::Configuration(format!("auth state encoding: {e}")))?;

    let cookie = Cookie::build((ZOHO_AUTH_STATE_COOKIE, state_json))
        .path("/")
        .http_only(true)
        .secure(state.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(10));

    Ok((jar.add(cookie), Redirect::to(&auth_url)))
}

/// Completes a sign-in and returns the user's profile.
///
/// The interceptor has already recorded the callback's data center by the
/// time this runs.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, SignInError> {
    if let Some(error) = query.error {
        return Err(SignInError::ProviderDenied(error));
    }
    let code = query.code.ok_or(SignInError::MissingCode)?;

    let state_cookie = jar
        .get(ZOHO_AUTH_STATE_COOKIE)
        .ok_or(SignInError::MissingAuthState)?;

    let auth_state: ZohoAuthState = serde_json::from_str(state_cookie.value())
        .map_err(|_| SignInError::MissingAuthState)?;

    if query.state.as_deref() != Some(auth_state.csrf_token.as_str()) {
        return Err(SignInError::CsrfMismatch);
    }

    let access_token = state
        .zoho
        .exchange_code(&code, &auth_state.pkce_verifier)
        .await?;
    let profile = state.zoho.fetch_profile(&access_token).await?;

    tracing::info!(user_id = %profile.id, "Sign-in completed");

    let remove_state = Cookie::build((ZOHO_AUTH_STATE_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO);

    Ok((jar.add(remove_state), Json(json!({ "user": profile }))))
}
