//! Store backend selection.

use serde::Deserialize;

/// Ephemeral store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Redis connection URL (e.g. `redis://127.0.0.1:6379`).
    /// When unset the in-process backend is used.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Upper bound on entries held by the in-process backend.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

fn default_max_capacity() -> u64 {
    10_000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            max_capacity: default_max_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_in_process_backend() {
        let config = StoreConfig::default();
        assert!(config.redis_url.is_none());
        assert_eq!(config.max_capacity, 10_000);
    }
}
