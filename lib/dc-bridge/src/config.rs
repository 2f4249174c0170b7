//! Bridge configuration.
//!
//! Loaded by the server from `BRIDGE__*` environment variables. Every field
//! has a default matching the provider's published endpoints.

use std::time::Duration;

use authgate_core::{DcRegistry, RegistryError};
use rootcause::Report;
use serde::Deserialize;

/// Regional accounts servers published by the provider.
const DEFAULT_ALLOWED_ENDPOINTS: &str = "https://accounts.zoho.com,\
https://accounts.zoho.eu,\
https://accounts.zoho.in,\
https://accounts.zoho.com.au,\
https://accounts.zoho.jp,\
https://accounts.zoho.com.cn,\
https://accounts.zoho.sa,\
https://accounts.zohocloud.ca";

/// Routing bridge settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Provider identifier, used as the store key namespace.
    #[serde(default = "default_provider_id")]
    pub provider_id: String,

    /// Allow-listed DC endpoints as a comma-separated string.
    #[serde(default = "default_allowed_endpoints")]
    pub allowed_endpoints: String,

    /// Lifetime of a code-keyed entry, in seconds.
    #[serde(default = "default_code_ttl_seconds")]
    pub code_ttl_seconds: u64,

    /// Upper bound on the lifetime of a token-keyed entry, in seconds.
    #[serde(default = "default_token_ttl_ceiling_seconds")]
    pub token_ttl_ceiling_seconds: u64,

    /// Token endpoint path relative to the DC endpoint.
    #[serde(default = "default_token_path")]
    pub token_path: String,

    /// Userinfo endpoint path relative to the DC endpoint.
    #[serde(default = "default_userinfo_path")]
    pub userinfo_path: String,

    /// Path of the generic OAuth callback route this provider redirects to.
    #[serde(default = "default_callback_path")]
    pub callback_path: String,

    /// Timeout for calls to the provider, in seconds.
    #[serde(default = "default_upstream_timeout_seconds")]
    pub upstream_timeout_seconds: u64,
}

fn default_provider_id() -> String {
    "zoho".to_string()
}

fn default_allowed_endpoints() -> String {
    DEFAULT_ALLOWED_ENDPOINTS.to_string()
}

fn default_code_ttl_seconds() -> u64 {
    180
}

fn default_token_ttl_ceiling_seconds() -> u64 {
    3600
}

fn default_token_path() -> String {
    "/oauth/v2/token".to_string()
}

fn default_userinfo_path() -> String {
    "/oauth/user/info".to_string()
}

fn default_callback_path() -> String {
    "/api/auth/oauth2/callback/zoho".to_string()
}

fn default_upstream_timeout_seconds() -> u64 {
    10
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            provider_id: default_provider_id(),
            allowed_endpoints: default_allowed_endpoints(),
            code_ttl_seconds: default_code_ttl_seconds(),
            token_ttl_ceiling_seconds: default_token_ttl_ceiling_seconds(),
            token_path: default_token_path(),
            userinfo_path: default_userinfo_path(),
            callback_path: default_callback_path(),
            upstream_timeout_seconds: default_upstream_timeout_seconds(),
        }
    }
}

impl BridgeConfig {
    /// Returns the allow-listed endpoints, parsed from the comma-separated string.
    #[must_use]
    pub fn allowed_endpoints(&self) -> Vec<&str> {
        self.allowed_endpoints
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Builds the DC registry from the allow-list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty or an entry is not a valid URL.
    pub fn registry(&self) -> Result<DcRegistry, Report<RegistryError>> {
        DcRegistry::new(self.allowed_endpoints())
    }

    #[must_use]
    pub fn code_ttl(&self) -> Duration {
        Duration::from_secs(self.code_ttl_seconds)
    }

    #[must_use]
    pub fn token_ttl_ceiling(&self) -> Duration {
        Duration::from_secs(self.token_ttl_ceiling_seconds)
    }

    #[must_use]
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }
}
