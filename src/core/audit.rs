//! Audit sink implementations.
//!
//! The retry executor records one event per upstream attempt so a batch run
//! can be reconstructed after the fact.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::ErrorKind;
use crate::util::clock::now_ms;

/// One upstream attempt.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Task the attempt was made for.
    pub task_id: String,
    /// Gateway operation (get, create, delete, complete).
    pub operation: String,
    /// 1-based attempt number.
    pub attempt: u32,
    /// Backoff chosen before the next attempt, if one follows.
    pub delay_ms: Option<u64>,
    /// Classification of the failure; `None` when the attempt succeeded.
    pub kind: Option<ErrorKind>,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// Sink handle shared between the engines of one request.
pub type SharedAuditSink = Arc<Mutex<dyn AuditSink>>;

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events.min(1024)),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Helper to build an attempt event stamped with a fresh id and the current time.
pub fn build_audit_event(
    task_id: impl Into<String>,
    operation: impl Into<String>,
    attempt: u32,
    delay_ms: Option<u64>,
    kind: Option<ErrorKind>,
) -> AuditEvent {
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        task_id: task_id.into(),
        operation: operation.into(),
        attempt,
        delay_ms,
        kind,
        created_at_ms: now_ms(),
    }
}
