//! Tests for utility functions

use ticktick_batch::util::{init_tracing, now_ms, Priority, TaskId, TaskSnapshot, TaskStatus};

#[test]
fn test_priority_wire_codes() {
    assert_eq!(u8::from(Priority::None), 0);
    assert_eq!(u8::from(Priority::Low), 1);
    assert_eq!(u8::from(Priority::Medium), 3);
    assert_eq!(u8::from(Priority::High), 5);
    assert!(Priority::try_from(4).is_err());
}

#[test]
fn test_priority_ordering() {
    assert!(Priority::High > Priority::Medium);
    assert!(Priority::Medium > Priority::Low);
    assert!(Priority::Low > Priority::None);
}

#[test]
fn test_status_wire_codes() {
    assert_eq!(TaskStatus::try_from(2), Ok(TaskStatus::Completed));
    assert_eq!(u8::from(TaskStatus::Active), 0);
}

#[test]
fn test_snapshot_defaults() {
    let task = TaskSnapshot::new("inbox", "Water plants");
    assert_eq!(task.id, None);
    assert!(!task.is_completed());
    assert!(task.subtasks.is_empty());
}

#[test]
fn test_duplicate_moves_project() {
    let mut task = TaskSnapshot::new("inbox", "Water plants");
    task.id = Some("t1".into());
    task.priority = Priority::Low;
    let copy = task.duplicate_into("garden");
    assert_eq!(copy.project_id, "garden");
    assert_eq!(copy.id, None);
    assert_eq!(copy.priority, Priority::Low);
    assert_eq!(copy.title, task.title);
}

#[test]
fn test_sparse_snapshot_fills_defaults() {
    let task: TaskSnapshot =
        serde_json::from_str(r#"{"id": "t1", "projectId": "inbox", "title": "Buy milk"}"#).unwrap();
    let id: TaskId = task.id.clone().unwrap();
    assert_eq!(id, "t1");
    assert_eq!(task.priority, Priority::None);
    assert_eq!(task.status, TaskStatus::Active);
    assert!(!task.is_all_day);
    assert!(task.tags.is_empty());

    let value = serde_json::to_value(&task).unwrap();
    assert!(value.get("items").is_none());
    assert!(value.get("content").is_none());
}

#[test]
fn test_clock_returns_epoch_millis() {
    // 2020-09-13
    assert!(now_ms() > 1_600_000_000_000);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    tracing::info!("tracing initialised");
}
