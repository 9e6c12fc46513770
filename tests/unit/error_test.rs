//! Tests for error types and classification

use ticktick_batch::core::{classify, EngineError, ErrorKind, GatewayError};

#[test]
fn test_status_error_display() {
    let err = GatewayError::status(503, "service unavailable");
    assert_eq!(format!("{}", err), "upstream returned 503: service unavailable");
    assert_eq!(err.status_code(), Some(503));
    assert_eq!(err.message(), "service unavailable");
}

#[test]
fn test_connection_error_has_no_status() {
    let err = GatewayError::Connection("reset by peer".to_string());
    assert_eq!(err.status_code(), None);
    assert_eq!(format!("{}", err), "connection failed: reset by peer");
}

#[test]
fn test_engine_error_display() {
    assert_eq!(
        format!("{}", EngineError::InvalidParameters("no task ids provided".into())),
        "invalid parameters: no task ids provided"
    );
    assert_eq!(
        format!("{}", EngineError::UnknownOperation("archive".into())),
        "unknown operation: archive"
    );
}

#[test]
fn test_classification_table() {
    let cases = [
        (GatewayError::status(429, "slow down"), ErrorKind::RateLimited),
        (GatewayError::status(404, "gone"), ErrorKind::NotFound),
        (GatewayError::status(409, "state"), ErrorKind::Conflict),
        (GatewayError::status(502, "bad gateway"), ErrorKind::Transient),
        (GatewayError::status(400, "bad request"), ErrorKind::Permanent),
        (GatewayError::status(403, "Too Many Requests"), ErrorKind::RateLimited),
        (GatewayError::Connection("timeout".into()), ErrorKind::Transient),
        (GatewayError::Other("weird".into()), ErrorKind::Permanent),
    ];
    for (err, expected) in cases {
        assert_eq!(classify(&err), expected, "{err}");
    }
}

#[test]
fn test_only_transient_kinds_retry() {
    assert!(ErrorKind::Transient.is_retryable());
    assert!(ErrorKind::RateLimited.is_retryable());
    assert!(!ErrorKind::NotFound.is_retryable());
    assert!(!ErrorKind::Conflict.is_retryable());
    assert!(!ErrorKind::Permanent.is_retryable());
}
