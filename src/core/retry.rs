//! Retry executor with exponential backoff and jitter.
//!
//! Every gateway call made by the engines goes through [`RetryExecutor::execute`].
//! Only failures classified as [`ErrorKind::Transient`] or
//! [`ErrorKind::RateLimited`] are retried, and never more than
//! [`RetryPolicy::max_attempts`] times in total.

use std::future::Future;
use std::time::Duration;

use crate::core::audit::{build_audit_event, SharedAuditSink};
use crate::core::{classify, ErrorKind, GatewayError};

/// Backoff and attempt limits.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Upper bound for transient backoff.
    pub max_delay: Duration,
    /// Minimum delay after a rate-limited attempt.
    pub rate_limit_delay: Duration,
    /// Multiplicative jitter in `[0, 1]`; a delay `d` becomes `d * (1 + j * u)`.
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            rate_limit_delay: Duration::from_secs(5),
            jitter_factor: 0.1,
        }
    }
}

impl RetryPolicy {
    /// Policy that retries immediately; used by tests and dry runs.
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            rate_limit_delay: Duration::ZERO,
            jitter_factor: 0.0,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32, kind: ErrorKind) -> Duration {
        self.delay_with_jitter(attempt, kind, rand::random::<f64>())
    }

    /// Deterministic form of [`Self::backoff_delay`] for a jitter sample `unit` in `[0, 1)`.
    pub fn delay_with_jitter(&self, attempt: u32, kind: ErrorKind, unit: f64) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let raw = self
            .base_delay
            .saturating_mul(1_u32 << exponent)
            .min(self.max_delay);
        let jitter = unit_interval(self.jitter_factor) * unit_interval(unit);
        let delay = raw.mul_f64(1.0 + jitter).min(self.max_delay);
        if kind == ErrorKind::RateLimited {
            delay.max(self.rate_limit_delay)
        } else {
            delay
        }
    }
}

/// Progress of one call through the executor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    /// Attempts made so far.
    pub attempt: u32,
    /// Delay before the next attempt, once one is scheduled.
    pub next_delay: Option<Duration>,
}

/// A call that eventually succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retried<T> {
    /// Value returned by the successful attempt.
    pub value: T,
    /// Attempts it took, including the successful one.
    pub attempts: u32,
}

/// A call that failed for good.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryFailure {
    /// Classification of the last failure.
    pub kind: ErrorKind,
    /// Attempts made.
    pub attempts: u32,
    /// Message of the last failure.
    pub message: String,
}

/// Result of running one call under the executor.
pub type RetryResult<T> = Result<Retried<T>, RetryFailure>;

/// Runs gateway calls under a [`RetryPolicy`].
#[derive(Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    audit: Option<SharedAuditSink>,
}

impl RetryExecutor {
    /// Create an executor without an audit sink.
    pub const fn new(policy: RetryPolicy) -> Self {
        Self { policy, audit: None }
    }

    /// Attach an audit sink receiving one event per attempt.
    #[must_use]
    pub fn with_audit(mut self, audit: SharedAuditSink) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Active policy.
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `call` until it succeeds, fails with a non-retryable kind, or the
    /// attempt budget is spent.
    pub async fn execute<T, F, Fut>(&self, operation: &str, task_id: &str, mut call: F) -> RetryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut state = RetryState::default();
        loop {
            state.attempt += 1;
            state.next_delay = None;
            match call().await {
                Ok(value) => {
                    tracing::debug!(operation, task_id, attempt = state.attempt, "call succeeded");
                    self.record(operation, task_id, &state, None);
                    return Ok(Retried {
                        value,
                        attempts: state.attempt,
                    });
                }
                Err(err) => {
                    let kind = classify(&err);
                    let exhausted = !kind.is_retryable() || state.attempt >= max_attempts;
                    if !exhausted {
                        state.next_delay = Some(self.policy.backoff_delay(state.attempt, kind));
                    }
                    tracing::warn!(
                        operation,
                        task_id,
                        attempt = state.attempt,
                        %kind,
                        delay_ms = state.next_delay.map(millis),
                        error = %err,
                        "call failed"
                    );
                    self.record(operation, task_id, &state, Some(kind));
                    match state.next_delay {
                        None => {
                            return Err(RetryFailure {
                                kind,
                                attempts: state.attempt,
                                message: err.message().to_string(),
                            })
                        }
                        Some(delay) => pause(delay).await,
                    }
                }
            }
        }
    }

    fn record(&self, operation: &str, task_id: &str, state: &RetryState, kind: Option<ErrorKind>) {
        if let Some(sink) = self.audit.as_ref() {
            let delay_ms = state.next_delay.map(millis);
            sink.lock()
                .record(build_audit_event(task_id, operation, state.attempt, delay_ms, kind));
        }
    }
}

/// Clamp to `[0, 1]`; NaN and infinities count as 0.
fn unit_interval(x: f64) -> f64 {
    if x.is_finite() {
        x.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub(crate) fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Sleep for `delay`, skipping the timer entirely for zero.
pub(crate) async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
