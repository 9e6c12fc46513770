//! Tests for builder modules

use std::sync::Arc;

use ticktick_batch::builders::build_engines;
use ticktick_batch::config::EngineConfig;
use ticktick_batch::core::{EngineError, MutationKind};
use ticktick_batch::infra::InMemoryGateway;
use ticktick_batch::util::TaskSnapshot;

#[test]
fn test_build_rejects_invalid_config() {
    let cfg = EngineConfig {
        max_attempts: 0,
        ..EngineConfig::default()
    };
    let result = build_engines(&cfg, Arc::new(InMemoryGateway::new()));
    assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
}

#[test]
fn test_build_keeps_config() {
    let cfg = EngineConfig::without_delays();
    let engines = build_engines(&cfg, Arc::new(InMemoryGateway::new())).unwrap();
    assert_eq!(engines.config(), &cfg);
    assert!(engines.audit_events().is_empty());
}

#[tokio::test]
async fn test_engines_share_audit_sink() {
    let gateway = Arc::new(InMemoryGateway::new());
    gateway.insert_task("t1", TaskSnapshot::new("inbox", "a"));
    gateway.insert_task("t2", TaskSnapshot::new("inbox", "b"));
    let engines = build_engines(&EngineConfig::without_delays(), gateway).unwrap();

    engines
        .mutation
        .run(MutationKind::Complete, &["t1".to_string()])
        .await
        .unwrap();
    engines
        .migration
        .migrate_tasks(&["t2".to_string()], "work")
        .await
        .unwrap();

    let ops: Vec<_> = engines
        .audit_events()
        .into_iter()
        .map(|e| (e.task_id, e.operation))
        .collect();
    assert_eq!(
        ops,
        vec![
            ("t1".to_string(), "get".to_string()),
            ("t1".to_string(), "complete".to_string()),
            ("t2".to_string(), "get".to_string()),
            ("t2".to_string(), "create".to_string()),
            ("t2".to_string(), "delete".to_string()),
        ]
    );
}

#[test]
fn test_zero_audit_capacity_records_nothing() {
    let cfg = EngineConfig {
        audit_capacity: 0,
        ..EngineConfig::without_delays()
    };
    let engines = build_engines(&cfg, Arc::new(InMemoryGateway::new())).unwrap();
    assert!(engines.audit_events().is_empty());
}
