//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! Nested sections use `__` as the separator: `ZOHO__CLIENT_ID`,
//! `BRIDGE__ALLOWED_ENDPOINTS`, `STORE__REDIS_URL`. See
//! [`BridgeConfig`](authgate_dc_bridge::BridgeConfig) for routing settings.

use authgate_dc_bridge::BridgeConfig;
use authgate_store::StoreConfig;
use serde::Deserialize;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Externally reachable base URL of this gateway. The sign-in flow
    /// reaches its own token and userinfo endpoints through it.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Allowed CORS origins as a comma-separated string.
    #[serde(default = "default_cors_origins")]
    cors_origins: String,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,

    /// Ephemeral store backend.
    #[serde(default)]
    pub store: StoreConfig,

    /// DC routing bridge.
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// OAuth client registration with the provider.
    pub zoho: ZohoClientConfig,
}

/// OAuth client settings for the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ZohoClientConfig {
    /// The OAuth2 client ID registered with the provider.
    pub client_id: String,
    /// The OAuth2 client secret.
    pub client_secret: String,
    /// The redirect URI registered for the callback route.
    pub redirect_uri: String,
    /// Authorization endpoint the browser is sent to. The provider routes
    /// the user to their home data center from there.
    #[serde(default = "default_authorization_url")]
    pub authorization_url: String,
    /// Scopes to request as a comma-separated string.
    #[serde(default = "default_scopes")]
    scopes: String,
}

impl ZohoClientConfig {
    /// Returns the OAuth2 scopes to request, parsed from comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        split_list(&self.scopes)
    }

    /// Creates a configuration with defaults for optional fields.
    #[must_use]
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            authorization_url: default_authorization_url(),
            scopes: default_scopes(),
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_cors_origins() -> String {
    "http://localhost:3000,http://localhost:5173".to_string()
}

fn default_secure_cookies() -> bool {
    true
}

fn default_authorization_url() -> String {
    "https://accounts.zoho.com/oauth/v2/auth".to_string()
}

fn default_scopes() -> String {
    "Aaaserver.profile.READ".to_string()
}

fn split_list(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns the allowed CORS origins.
    #[must_use]
    pub fn cors_origins(&self) -> Vec<&str> {
        split_list(&self.cors_origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_has_correct_defaults() {
        let config = ZohoClientConfig::new(
            "cid".to_string(),
            "secret".to_string(),
            "http://localhost:3000/api/auth/oauth2/callback/zoho".to_string(),
        );
        assert_eq!(
            config.authorization_url,
            "https://accounts.zoho.com/oauth/v2/auth"
        );
        assert_eq!(config.scopes(), vec!["Aaaserver.profile.READ"]);
    }

    #[test]
    fn lists_are_split_and_trimmed() {
        assert_eq!(
            split_list("http://a, http://b ,,"),
            vec!["http://a", "http://b"]
        );
    }

    #[test]
    fn loads_from_config_source() {
        let config: ServerConfig = config::Config::builder()
            .set_override("zoho.client_id", "cid")
            .and_then(|b| b.set_override("zoho.client_secret", "secret"))
            .and_then(|b| b.set_override("zoho.redirect_uri", "http://localhost/cb"))
            .and_then(|b| b.set_override("bridge.code_ttl_seconds", 60))
            .expect("overrides")
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize");

        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert!(config.secure_cookies);
        assert_eq!(config.bridge.code_ttl_seconds, 60);
        assert_eq!(config.bridge.token_ttl_ceiling_seconds, 3600);
        assert!(config.store.redis_url.is_none());
        assert_eq!(
            config.cors_origins(),
            vec!["http://localhost:3000", "http://localhost:5173"]
        );
    }
}
