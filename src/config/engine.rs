//! Engine configuration: round sizing, retry policy and pacing.

use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, BatchScheduler, Pacing, RetryPolicy, ShrinkPolicy};

/// Prefix of the environment variables read by [`EngineConfig::from_env`].
pub const ENV_PREFIX: &str = "TICKTICK_BATCH_";

/// Tunables for one engine instance. Every field has a documented default;
/// missing JSON keys or env variables fall back to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest round the scheduler will emit. Default 3.
    pub max_round_size: usize,
    /// Size of the first round. Default 1.
    pub initial_round_size: usize,
    /// Success ratio a round must reach for the next one to grow. Default 1.0.
    pub success_threshold: f64,
    /// Shrink curve after an unhealthy round. Default `reset`.
    pub shrink_policy: ShrinkPolicy,
    /// Attempts per upstream call, including the first. Default 3.
    pub max_attempts: u32,
    /// Backoff after the first failed attempt. Default 500 ms.
    pub base_retry_delay_ms: u64,
    /// Backoff cap. Default 30 s.
    pub max_retry_delay_ms: u64,
    /// Minimum backoff after a rate-limited attempt. Default 5 s.
    pub rate_limit_delay_ms: u64,
    /// Backoff jitter factor in `[0, 1]`. Default 0.1.
    pub jitter_factor: f64,
    /// Pause between successive items. Default 1 s.
    pub inter_call_delay_ms: u64,
    /// Pause between rounds. Default 2 s.
    pub inter_round_delay_ms: u64,
    /// Events kept by the in-memory audit sink; 0 disables auditing. Default 1024.
    pub audit_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_round_size: 3,
            initial_round_size: 1,
            success_threshold: 1.0,
            shrink_policy: ShrinkPolicy::Reset,
            max_attempts: 3,
            base_retry_delay_ms: 500,
            max_retry_delay_ms: 30_000,
            rate_limit_delay_ms: 5_000,
            jitter_factor: 0.1,
            inter_call_delay_ms: 1_000,
            inter_round_delay_ms: 2_000,
            audit_capacity: 1024,
        }
    }
}

impl EngineConfig {
    /// Configuration with every delay set to zero, for tests and dry runs.
    pub fn without_delays() -> Self {
        Self {
            base_retry_delay_ms: 0,
            max_retry_delay_ms: 0,
            rate_limit_delay_ms: 0,
            jitter_factor: 0.0,
            inter_call_delay_ms: 0,
            inter_round_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_round_size == 0 {
            return Err("max_round_size must be greater than 0".into());
        }
        if self.initial_round_size == 0 || self.initial_round_size > self.max_round_size {
            return Err(format!(
                "initial_round_size must be between 1 and max_round_size ({})",
                self.max_round_size
            ));
        }
        if !(0.0..=1.0).contains(&self.success_threshold) {
            return Err("success_threshold must be within [0, 1]".into());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".into());
        }
        if self.base_retry_delay_ms > self.max_retry_delay_ms {
            return Err("base_retry_delay_ms must not exceed max_retry_delay_ms".into());
        }
        if self.rate_limit_delay_ms < self.base_retry_delay_ms {
            return Err("rate_limit_delay_ms must be at least base_retry_delay_ms".into());
        }
        if !(0.0..=1.0).contains(&self.jitter_factor) {
            return Err("jitter_factor must be within [0, 1]".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load an optional `.env` file, then read [`Self::from_env`].
    ///
    /// # Errors
    ///
    /// Fails when the given file cannot be read or a variable is malformed.
    pub fn load(env_file: Option<&Path>) -> AppResult<Self> {
        match env_file {
            Some(path) => {
                dotenvy::from_path(path)
                    .with_context(|| format!("failed to load env file {}", path.display()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Self::from_env()
    }

    /// Read `TICKTICK_BATCH_*` variables from the process environment.
    ///
    /// # Errors
    ///
    /// Fails when a variable cannot be parsed or the result is invalid.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from a variable lookup, starting from defaults.
    ///
    /// # Errors
    ///
    /// Fails when a variable cannot be parsed or the result is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let mut cfg = Self::default();
        let var = |key: &str| lookup(&format!("{ENV_PREFIX}{key}"));

        override_with(&mut cfg.max_round_size, "MAX_ROUND_SIZE", &var)?;
        override_with(&mut cfg.initial_round_size, "INITIAL_ROUND_SIZE", &var)?;
        override_with(&mut cfg.success_threshold, "SUCCESS_THRESHOLD", &var)?;
        override_with(&mut cfg.shrink_policy, "SHRINK_POLICY", &var)?;
        override_with(&mut cfg.max_attempts, "MAX_ATTEMPTS", &var)?;
        override_with(&mut cfg.base_retry_delay_ms, "BASE_RETRY_DELAY_MS", &var)?;
        override_with(&mut cfg.max_retry_delay_ms, "MAX_RETRY_DELAY_MS", &var)?;
        override_with(&mut cfg.rate_limit_delay_ms, "RATE_LIMIT_DELAY_MS", &var)?;
        override_with(&mut cfg.jitter_factor, "JITTER_FACTOR", &var)?;
        override_with(&mut cfg.inter_call_delay_ms, "INTER_CALL_DELAY_MS", &var)?;
        override_with(&mut cfg.inter_round_delay_ms, "INTER_ROUND_DELAY_MS", &var)?;
        override_with(&mut cfg.audit_capacity, "AUDIT_CAPACITY", &var)?;

        cfg.validate().map_err(|e| anyhow!("invalid configuration: {e}"))?;
        Ok(cfg)
    }

    /// Retry policy described by this configuration.
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_retry_delay_ms),
            max_delay: Duration::from_millis(self.max_retry_delay_ms),
            rate_limit_delay: Duration::from_millis(self.rate_limit_delay_ms),
            jitter_factor: self.jitter_factor,
        }
    }

    /// Round scheduler described by this configuration.
    pub fn scheduler(&self) -> BatchScheduler {
        BatchScheduler::new(
            self.max_round_size,
            self.initial_round_size,
            self.success_threshold,
            self.shrink_policy,
        )
    }

    /// Fixed delays described by this configuration.
    pub const fn pacing(&self) -> Pacing {
        Pacing {
            inter_call_delay: Duration::from_millis(self.inter_call_delay_ms),
            inter_round_delay: Duration::from_millis(self.inter_round_delay_ms),
        }
    }
}

fn override_with<T>(slot: &mut T, key: &str, var: impl Fn(&str) -> Option<String>) -> AppResult<()>
where
    T: FromStr,
    T::Err: Display,
{
    if let Some(raw) = var(key) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid {ENV_PREFIX}{key}={raw:?}: {e}"))?;
    }
    Ok(())
}

impl FromStr for ShrinkPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reset" => Ok(Self::Reset),
            "halve" => Ok(Self::Halve),
            other => Err(format!("unknown shrink policy `{other}`, expected reset or halve")),
        }
    }
}
