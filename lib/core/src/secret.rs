//! Wrappers for the one-time credentials that key the DC handoff.
//!
//! Authorization codes and access tokens are bearer secrets. These wrappers
//! keep them out of `Debug` and log output; use `fingerprint()` when a log
//! line needs to correlate requests.

use std::fmt;

/// Number of leading characters exposed by `fingerprint()`.
const FINGERPRINT_LEN: usize = 6;

/// Macro to generate a redacting newtype around a provider-issued secret.
macro_rules! define_secret {
    ($(#[$meta:meta])* $name:ident, $label:expr) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw secret value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the raw secret. Do not log the result.
            #[must_use]
            pub fn expose(&self) -> &str {
                &self.0
            }

            /// Returns a short, log-safe prefix of the secret. Values too
            /// short to keep a hidden remainder show only their length.
            #[must_use]
            pub fn fingerprint(&self) -> String {
                let len = self.0.chars().count();
                if len <= FINGERPRINT_LEN * 2 {
                    return format!("<{len} chars>");
                }
                let prefix: String = self.0.chars().take(FINGERPRINT_LEN).collect();
                format!("{prefix}…")
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $label, self.fingerprint())
            }
        }
    };
}

define_secret!(
    /// OAuth authorization code received on the callback.
    AuthorizationCode,
    "AuthorizationCode"
);

define_secret!(
    /// Access token returned by the provider's token endpoint.
    AccessToken,
    "AccessToken"
);
