//! Error types for the store crate.

use std::fmt;

/// Errors from ephemeral store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store URL could not be parsed.
    InvalidConfiguration { details: String },
    /// The backend could not be reached or rejected the command.
    BackendUnavailable { details: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration { details } => {
                write!(f, "invalid store configuration: {details}")
            }
            Self::BackendUnavailable { details } => {
                write!(f, "store backend unavailable: {details}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_unavailable_display() {
        let err = StoreError::BackendUnavailable {
            details: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("unavailable"));
        assert!(err.to_string().contains("connection refused"));
    }
}
