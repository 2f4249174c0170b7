//! Allow-list of legitimate provider data centers.
//!
//! The callback query string is attacker-influenceable: a forged
//! `accounts-server` value would make the gateway send the client secret and
//! authorization code to an arbitrary host. [`DcRegistry::is_allowed`] is the
//! boundary that prevents it and must be consulted before any DC is stored.

use std::collections::HashSet;
use std::fmt;

use rootcause::Report;
use url::Url;

/// Errors raised while building a registry from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No endpoints were configured.
    Empty,
    /// A configured endpoint is not an absolute http(s) URL.
    InvalidEndpoint { endpoint: String, reason: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "DC allow-list is empty"),
            Self::InvalidEndpoint { endpoint, reason } => {
                write!(f, "invalid DC endpoint '{endpoint}': {reason}")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Fixed set of canonical regional endpoints.
///
/// Membership is an exact string comparison: no case folding, no trailing
/// slash normalization. The set is frozen once built.
#[derive(Debug, Clone)]
pub struct DcRegistry {
    endpoints: HashSet<String>,
}

impl DcRegistry {
    /// Builds a registry, validating every entry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Empty`] for an empty list and
    /// [`RegistryError::InvalidEndpoint`] for entries that are not absolute
    /// `http`/`https` URLs, or that carry a query or fragment.
    pub fn new<I, S>(endpoints: I) -> Result<Self, Report<RegistryError>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = HashSet::new();
        for endpoint in endpoints {
            let endpoint = endpoint.into();
            validate_endpoint(&endpoint)?;
            set.insert(endpoint);
        }

        if set.is_empty() {
            return Err(RegistryError::Empty.into());
        }

        Ok(Self { endpoints: set })
    }

    /// Returns true when `endpoint` is exactly one of the configured endpoints.
    #[must_use]
    pub fn is_allowed(&self, endpoint: &str) -> bool {
        self.endpoints.contains(endpoint)
    }

    /// Number of allow-listed endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Always false for a constructed registry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

fn validate_endpoint(endpoint: &str) -> Result<(), RegistryError> {
    let invalid = |reason: &str| RegistryError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(endpoint).map_err(|e| invalid(&e.to_string()))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zoho() -> DcRegistry {
        DcRegistry::new(["https://accounts.zoho.com", "https://accounts.zoho.eu"])
            .expect("valid registry")
    }

    #[test]
    fn allows_exact_members() {
        let registry = zoho();
        assert!(registry.is_allowed("https://accounts.zoho.com"));
        assert!(registry.is_allowed("https://accounts.zoho.eu"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn rejects_near_misses() {
        let registry = zoho();
        assert!(!registry.is_allowed("https://accounts.zoho.com/"));
        assert!(!registry.is_allowed("HTTPS://ACCOUNTS.ZOHO.COM"));
        assert!(!registry.is_allowed("http://accounts.zoho.com"));
        assert!(!registry.is_allowed("https://accounts.zoho.com.evil.example"));
        assert!(!registry.is_allowed("https://evil.example/?https://accounts.zoho.com"));
        assert!(!registry.is_allowed(""));
    }

    #[test]
    fn empty_list_is_rejected() {
        let err = DcRegistry::new(Vec::<String>::new()).expect_err("should fail");
        assert_eq!(err.current_context(), &RegistryError::Empty);
    }

    #[test]
    fn invalid_entries_are_rejected() {
        for bad in [
            "accounts.zoho.com",
            "ftp://accounts.zoho.com",
            "https://accounts.zoho.com?x=1",
        ] {
            let err = DcRegistry::new([bad]).expect_err("should fail");
            assert!(
                matches!(err.current_context(), RegistryError::InvalidEndpoint { .. }),
                "{bad} should be invalid"
            );
        }
    }

    #[test]
    fn display_names_endpoint() {
        let err = RegistryError::InvalidEndpoint {
            endpoint: "nope".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert!(err.to_string().contains("nope"));
        assert!(err.to_string().contains("relative URL"));
    }
}
