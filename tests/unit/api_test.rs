//! Tests for the tool-invocation surface

use std::sync::Arc;

use ticktick_batch::builders::{build_engines, Engines};
use ticktick_batch::config::EngineConfig;
use ticktick_batch::core::{EngineError, OutcomeStatus, ReasonCode};
use ticktick_batch::infra::InMemoryGateway;
use ticktick_batch::runtime::{dispatch, Operation, ToolParams};
use ticktick_batch::util::{TaskSnapshot, TaskStatus};

fn setup() -> (Arc<InMemoryGateway>, Engines<InMemoryGateway>) {
    let gateway = Arc::new(InMemoryGateway::new());
    gateway.insert_task("t1", TaskSnapshot::new("inbox", "one"));
    gateway.insert_task("t2", TaskSnapshot::new("inbox", "two"));
    let engines = build_engines(&EngineConfig::without_delays(), gateway.clone()).unwrap();
    (gateway, engines)
}

#[tokio::test]
async fn test_dispatch_migrate() {
    let (gateway, engines) = setup();
    let response = dispatch("migrate_tasks", &engines, &ToolParams::migrate("t1, t2", "work"))
        .await
        .unwrap();

    assert_eq!(response.report.counts.succeeded, 2);
    assert_eq!(gateway.tasks_in("work").len(), 2);
    assert!(gateway.tasks_in("inbox").is_empty());
    assert!(response.text.starts_with("migrate_tasks: 2 item(s): 2 succeeded"));
}

#[tokio::test]
async fn test_legacy_move_task_alias() {
    let (gateway, engines) = setup();
    let response = dispatch("move_task", &engines, &ToolParams::migrate("t1", "work"))
        .await
        .unwrap();

    assert_eq!(response.report.operation, "migrate_tasks");
    assert_eq!(gateway.tasks_in("work").len(), 1);
}

#[tokio::test]
async fn test_dispatch_complete() {
    let (gateway, engines) = setup();
    let response = dispatch("batch_complete_tasks", &engines, &ToolParams::ids("t2"))
        .await
        .unwrap();

    assert_eq!(response.report.items[0].outcome.reason, ReasonCode::Completed);
    assert_eq!(gateway.task("t2").unwrap().status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_dispatch_delete_reports_missing_as_skip() {
    let (gateway, engines) = setup();
    let response = Operation::BatchDeleteTasks
        .execute(&engines, &ToolParams::ids("t1,ghost"))
        .await
        .unwrap();

    let statuses: Vec<_> = response.report.items.iter().map(|i| i.outcome.status).collect();
    assert_eq!(statuses, vec![OutcomeStatus::Success, OutcomeStatus::Skip]);
    assert!(gateway.task("t1").is_none());
}

#[tokio::test]
async fn test_migrate_without_target_is_rejected() {
    let (gateway, engines) = setup();
    let err = dispatch("migrate_tasks", &engines, &ToolParams::ids("t1"))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidParameters(_)));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_operation() {
    let (_, engines) = setup();
    let err = dispatch("archive_tasks", &engines, &ToolParams::ids("t1"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::UnknownOperation("archive_tasks".into()));
}

#[test]
fn test_params_deserialize_from_tool_json() {
    let params: ToolParams =
        serde_json::from_str(r#"{"task_ids": "a,b", "target_project_id": "p9"}"#).unwrap();
    assert_eq!(params, ToolParams::migrate("a,b", "p9"));

    let params: ToolParams = serde_json::from_str(r#"{"task_ids": "a"}"#).unwrap();
    assert_eq!(params.target_project_id, None);
}

#[test]
fn test_response_serializes_report() {
    let report = ticktick_batch::core::BatchReport::from_items("batch_delete_tasks", Vec::new());
    let response = ticktick_batch::runtime::ToolResponse::from(report);
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["report"]["operation"], "batch_delete_tasks");
    assert_eq!(value["report"]["counts"]["failed"], 0);
}
