//! Classification of raw gateway failures into retry-relevant kinds.
//!
//! This is the single decision point for the retry policy: only
//! [`ErrorKind::Transient`] and [`ErrorKind::RateLimited`] are ever retried.
//! Anything the classifier does not recognise is [`ErrorKind::Permanent`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::GatewayError;

/// Taxonomy of failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Expected to resolve on retry (5xx, connection failure).
    Transient,
    /// Upstream asked us to slow down.
    RateLimited,
    /// The addressed task or project does not exist.
    NotFound,
    /// Upstream rejected the call because of the resource's current state.
    Conflict,
    /// Retry cannot resolve it.
    Permanent,
}

impl ErrorKind {
    /// Whether the retry executor may attempt the call again.
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Transient | Self::RateLimited)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => write!(f, "transient"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Permanent => write!(f, "permanent"),
        }
    }
}

/// Map a raw failure to an [`ErrorKind`]. Pure: equal input, equal output.
pub fn classify(error: &GatewayError) -> ErrorKind {
    match error {
        GatewayError::Connection(_) => ErrorKind::Transient,
        GatewayError::Status { status, message } => classify_status(*status, message),
        GatewayError::Other(message) => classify_message(message).unwrap_or(ErrorKind::Permanent),
    }
}

fn classify_status(status: u16, message: &str) -> ErrorKind {
    match status {
        429 => ErrorKind::RateLimited,
        404 => ErrorKind::NotFound,
        409 => ErrorKind::Conflict,
        500..=599 => ErrorKind::Transient,
        _ => classify_message(message).unwrap_or(ErrorKind::Permanent),
    }
}

fn classify_message(message: &str) -> Option<ErrorKind> {
    let lower = message.to_ascii_lowercase();
    if lower.contains("rate limit") || lower.contains("too many requests") {
        Some(ErrorKind::RateLimited)
    } else if lower.contains("not found") {
        Some(ErrorKind::NotFound)
    } else if lower.contains("conflict") {
        Some(ErrorKind::Conflict)
    } else {
        None
    }
}
