//! Error types for gateway calls and request handling.

use thiserror::Error;

/// Raw failure surfaced by a gateway call, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The upstream answered with a non-success status.
    #[error("upstream returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error body or reason phrase.
        message: String,
    },
    /// The request never produced a response (DNS, reset, timeout).
    #[error("connection failed: {0}")]
    Connection(String),
    /// Any other failure reported by the transport or decoding layer.
    #[error("{0}")]
    Other(String),
}

impl GatewayError {
    /// Shorthand for a status failure.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Status code, if the upstream responded.
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Connection(_) | Self::Other(_) => None,
        }
    }

    /// Human-readable message without the status prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Status { message, .. } => message,
            Self::Connection(message) | Self::Other(message) => message,
        }
    }
}

/// Request-level errors. These abort a request before any round starts;
/// per-item failures are reported as outcomes instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Parameters failed validation.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// The gateway has no usable credentials.
    #[error("missing credentials: authenticate before running batch operations")]
    MissingCredentials,
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// No operation is registered under the requested name.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
