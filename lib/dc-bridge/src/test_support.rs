//! Store double for outage tests.

use std::time::Duration;

use authgate_store::{EphemeralStore, StoreError};
use rootcause::Report;

/// Store whose every operation fails as if the backend were down.
pub(crate) struct DownStore;

fn down() -> Report<StoreError> {
    StoreError::BackendUnavailable {
        details: "connection refused".to_string(),
    }
    .into()
}

#[async_trait::async_trait]
impl EphemeralStore for DownStore {
    async fn put(&self, _: &str, _: String, _: Duration) -> Result<(), Report<StoreError>> {
        Err(down())
    }

    async fn get(&self, _: &str) -> Result<Option<String>, Report<StoreError>> {
        Err(down())
    }

    async fn delete(&self, _: &str) -> Result<(), Report<StoreError>> {
        Err(down())
    }
}
