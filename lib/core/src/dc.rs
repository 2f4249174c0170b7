//! The regional endpoint ("data center") a login was issued from.

use serde::{Deserialize, Serialize};

/// A provider data center captured from an OAuth callback.
///
/// `endpoint` is the base URL the provider's token and userinfo servers live
/// under (for example `https://accounts.zoho.eu`). Records are immutable once
/// created and are only ever persisted after the endpoint passed the
/// [`DcRegistry`](crate::DcRegistry) check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DcRecord {
    endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    region_hint: Option<String>,
}

impl DcRecord {
    /// Creates a record for `endpoint` with an optional region hint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, region_hint: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            region_hint,
        }
    }

    /// Returns the base URL of the data center.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the provider-supplied region hint (`location`), if any.
    #[must_use]
    pub fn region_hint(&self) -> Option<&str> {
        self.region_hint.as_deref()
    }

    /// Joins `path` onto the endpoint, tolerating a trailing slash on either side.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_for_joins_without_double_slashes() {
        let dc = DcRecord::new("https://accounts.zoho.eu", None);
        assert_eq!(
            dc.url_for("/oauth/v2/token"),
            "https://accounts.zoho.eu/oauth/v2/token"
        );

        let dc = DcRecord::new("https://accounts.zoho.eu/", None);
        assert_eq!(
            dc.url_for("oauth/user/info"),
            "https://accounts.zoho.eu/oauth/user/info"
        );
    }

    #[test]
    fn serializes_without_missing_region_hint() {
        let dc = DcRecord::new("https://accounts.zoho.in", None);
        let json = serde_json::to_string(&dc).expect("serialize");
        assert_eq!(json, r#"{"endpoint":"https://accounts.zoho.in"}"#);

        let dc = DcRecord::new("https://accounts.zoho.in", Some("in".to_string()));
        let back: DcRecord =
            serde_json::from_str(&serde_json::to_string(&dc).expect("serialize"))
                .expect("deserialize");
        assert_eq!(back.region_hint(), Some("in"));
    }
}
