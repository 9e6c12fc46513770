//! Tests for configuration validation and loading

use std::collections::HashMap;
use std::time::Duration;

use ticktick_batch::config::{EngineConfig, ENV_PREFIX};
use ticktick_batch::core::ShrinkPolicy;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (format!("{ENV_PREFIX}{k}"), (*v).to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}

#[test]
fn test_defaults_are_valid() {
    let cfg = EngineConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.max_round_size, 3);
    assert_eq!(cfg.initial_round_size, 1);
    assert_eq!(cfg.max_attempts, 3);
    assert_eq!(cfg.inter_call_delay_ms, 1_000);
    assert_eq!(cfg.shrink_policy, ShrinkPolicy::Reset);
}

#[test]
fn test_invalid_round_sizes() {
    let zero_max = EngineConfig {
        max_round_size: 0,
        ..EngineConfig::default()
    };
    assert!(zero_max.validate().is_err());

    let initial_above_max = EngineConfig {
        initial_round_size: 5,
        max_round_size: 3,
        ..EngineConfig::default()
    };
    assert!(initial_above_max.validate().is_err());
}

#[test]
fn test_invalid_retry_settings() {
    let no_attempts = EngineConfig {
        max_attempts: 0,
        ..EngineConfig::default()
    };
    assert!(no_attempts.validate().is_err());

    let inverted_delays = EngineConfig {
        base_retry_delay_ms: 10_000,
        max_retry_delay_ms: 1_000,
        ..EngineConfig::default()
    };
    assert!(inverted_delays.validate().is_err());

    let bad_threshold = EngineConfig {
        success_threshold: 1.5,
        ..EngineConfig::default()
    };
    assert!(bad_threshold.validate().is_err());
}

#[test]
fn test_without_delays_is_valid() {
    let cfg = EngineConfig::without_delays();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.pacing().inter_call_delay, Duration::ZERO);
    assert_eq!(cfg.retry_policy().base_delay, Duration::ZERO);
}

#[test]
fn test_config_from_json_fills_defaults() {
    let json = r#"{
        "max_round_size": 5,
        "shrink_policy": "halve",
        "inter_call_delay_ms": 250
    }"#;

    let cfg = EngineConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.max_round_size, 5);
    assert_eq!(cfg.shrink_policy, ShrinkPolicy::Halve);
    assert_eq!(cfg.inter_call_delay_ms, 250);
    assert_eq!(cfg.max_attempts, 3);
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(EngineConfig::from_json_str(r#"{"max_attempts": 0}"#).is_err());
    assert!(EngineConfig::from_json_str("not json").is_err());
}

#[test]
fn test_from_lookup_overrides() {
    let cfg = EngineConfig::from_lookup(lookup(&[
        ("MAX_ROUND_SIZE", "6"),
        ("INITIAL_ROUND_SIZE", "2"),
        ("SHRINK_POLICY", "Halve"),
        ("RATE_LIMIT_DELAY_MS", " 8000 "),
    ]))
    .unwrap();

    assert_eq!(cfg.max_round_size, 6);
    assert_eq!(cfg.initial_round_size, 2);
    assert_eq!(cfg.shrink_policy, ShrinkPolicy::Halve);
    assert_eq!(cfg.rate_limit_delay_ms, 8_000);
    assert_eq!(cfg.max_attempts, 3);
}

#[test]
fn test_from_lookup_without_vars_is_default() {
    let cfg = EngineConfig::from_lookup(|_| None).unwrap();
    assert_eq!(cfg, EngineConfig::default());
}

#[test]
fn test_from_lookup_reports_bad_values() {
    let err = EngineConfig::from_lookup(lookup(&[("MAX_ATTEMPTS", "many")])).unwrap_err();
    assert!(err.to_string().contains("TICKTICK_BATCH_MAX_ATTEMPTS"));

    let err = EngineConfig::from_lookup(lookup(&[("SHRINK_POLICY", "drop")])).unwrap_err();
    assert!(err.to_string().contains("unknown shrink policy"));

    assert!(EngineConfig::from_lookup(lookup(&[("MAX_ROUND_SIZE", "0")])).is_err());
}

#[test]
fn test_scheduler_follows_config() {
    let cfg = EngineConfig {
        max_round_size: 4,
        initial_round_size: 2,
        ..EngineConfig::default()
    };
    let scheduler = cfg.scheduler();
    assert_eq!(scheduler.max_round_size(), 4);
    assert_eq!(scheduler.plan(0..10).round_size(), 2);
}
