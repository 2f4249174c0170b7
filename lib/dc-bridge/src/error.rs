//! Error types for the DC bridge.
//!
//! Every variant is a per-request failure; none of them are fatal to the
//! process. Nothing here is retried automatically: a failed login restarts
//! from the provider's authorization page.

use std::fmt;

/// Errors from the token exchange and userinfo bridges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// No `Authorization: Bearer` credential on a userinfo request.
    MissingToken,
    /// Token request without a `code` form field.
    MissingCode,
    /// No live DC binding for the presented code or token.
    DcNotFound,
    /// The ephemeral store failed; handled like [`BridgeError::DcNotFound`].
    BackendUnavailable { details: String },
    /// The provider's token endpoint rejected the exchange.
    UpstreamExchangeFailed { status: u16, body: String },
    /// The provider's userinfo endpoint rejected the request.
    UpstreamUserinfoFailed { status: u16, body: String },
    /// The provider could not be reached at all.
    UpstreamUnreachable { details: String },
    /// Startup-time configuration problem.
    InvalidConfiguration { details: String },
}

impl BridgeError {
    /// True when the failure means "routing state unknown": the client must
    /// restart the login.
    #[must_use]
    pub fn is_routing_failure(&self) -> bool {
        matches!(self, Self::DcNotFound | Self::BackendUnavailable { .. })
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingToken => write!(f, "missing bearer token"),
            Self::MissingCode => write!(f, "missing authorization code"),
            Self::DcNotFound => write!(f, "no data center bound to this credential"),
            Self::BackendUnavailable { details } => {
                write!(f, "routing store unavailable: {details}")
            }
            Self::UpstreamExchangeFailed { status, body } => {
                write!(f, "upstream token exchange failed ({status}): {body}")
            }
            Self::UpstreamUserinfoFailed { status, body } => {
                write!(f, "upstream userinfo failed ({status}): {body}")
            }
            Self::UpstreamUnreachable { details } => {
                write!(f, "provider unreachable: {details}")
            }
            Self::InvalidConfiguration { details } => {
                write!(f, "invalid bridge configuration: {details}")
            }
        }
    }
}

impl std::error::Error for BridgeError {}
