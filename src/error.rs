// Error handling module
// Defines authentication failure types and their diagnostic classification

use thiserror::Error;

/// Coarse failure category used for diagnostics only
///
/// The refresher never branches on this; every failure consumes one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Request could not be sent or no response arrived
    Transport,
    /// Response arrived but did not carry a usable token
    Protocol,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::Protocol => "protocol",
        }
    }
}

/// Errors that can occur during one authentication exchange
#[derive(Error, Debug)]
pub enum AuthError {
    /// Target URL could not be assembled from the configured parts
    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),

    /// Network-level failure (connect, timeout, TLS, ...)
    #[error("Gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Gateway answered with a non-2xx status
    #[error("Gateway rejected authentication: {status} - {message}")]
    Rejected { status: u16, message: String },

    /// Response body was not the expected JSON document
    #[error("Malformed authentication response: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// Response parsed but the token was missing or empty
    #[error("Authentication response does not contain a token")]
    EmptyToken,
}

impl AuthError {
    /// Classify this error for logging
    pub fn kind(&self) -> FailureKind {
        match self {
            AuthError::InvalidUrl(_) | AuthError::Transport(_) => FailureKind::Transport,
            AuthError::Rejected { .. } | AuthError::MalformedBody(_) | AuthError::EmptyToken => {
                FailureKind::Protocol
            }
        }
    }
}

/// Result type alias for authentication exchanges
pub type Result<T> = std::result::Result<T, AuthError>;
