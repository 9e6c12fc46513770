//! Tests for audit sink

use ticktick_batch::core::{build_audit_event, AuditSink, ErrorKind, InMemoryAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);

    let event = build_audit_event("task1", "create", 2, Some(1_000), Some(ErrorKind::Transient));

    sink.record(event.clone());
    assert_eq!(sink.events().len(), 1);

    let events = sink.events();
    assert_eq!(events[0].event_id, event.event_id);
    assert_eq!(events[0].task_id, "task1");
    assert_eq!(events[0].operation, "create");
    assert_eq!(events[0].kind, Some(ErrorKind::Transient));
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    sink.record(build_audit_event("task1", "get", 1, None, None));
    sink.record(build_audit_event("task2", "get", 1, None, None));
    sink.record(build_audit_event("task3", "get", 1, None, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].task_id, "task2"); // First one popped
    assert_eq!(events[1].task_id, "task3");
}

#[test]
fn test_zero_capacity_sink_keeps_nothing() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(build_audit_event("task1", "delete", 1, None, None));
    assert!(sink.events().is_empty());
}

#[test]
fn test_build_audit_event() {
    let event = build_audit_event("task1", "delete", 3, None, Some(ErrorKind::Permanent));

    assert_eq!(event.task_id, "task1");
    assert_eq!(event.operation, "delete");
    assert_eq!(event.attempt, 3);
    assert_eq!(event.delay_ms, None);
    assert!(!event.event_id.is_empty());
    assert!(event.created_at_ms > 0);

    let other = build_audit_event("task1", "delete", 3, None, None);
    assert_ne!(event.event_id, other.event_id);
}
