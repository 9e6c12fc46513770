//! Build the migration and bulk-mutation engines from one [`EngineConfig`].

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::core::{
    AuditEvent, BatchMutationEngine, EngineError, InMemoryAuditSink, MigrationEngine,
    RetryExecutor, SharedAuditSink, TaskGateway,
};

/// Engines sharing one gateway, one retry policy and one audit sink.
pub struct Engines<G> {
    /// Cross-project moves.
    pub migration: MigrationEngine<G>,
    /// Bulk complete and delete.
    pub mutation: BatchMutationEngine<G>,
    audit: Arc<Mutex<InMemoryAuditSink>>,
    config: EngineConfig,
}

impl<G> Engines<G> {
    /// Attempt events recorded so far, oldest first.
    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.audit.lock().events()
    }

    /// Configuration the engines were built from.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Validate `cfg` and build both engines over `gateway`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidConfig`] when the configuration is invalid.
pub fn build_engines<G: TaskGateway>(
    cfg: &EngineConfig,
    gateway: Arc<G>,
) -> Result<Engines<G>, EngineError> {
    cfg.validate().map_err(EngineError::InvalidConfig)?;

    let audit = Arc::new(Mutex::new(InMemoryAuditSink::new(cfg.audit_capacity)));
    let shared: SharedAuditSink = audit.clone();
    let retry = RetryExecutor::new(cfg.retry_policy()).with_audit(shared);
    let pacing = cfg.pacing();

    tracing::debug!(
        max_round_size = cfg.max_round_size,
        max_attempts = cfg.max_attempts,
        inter_call_delay_ms = cfg.inter_call_delay_ms,
        "engines built"
    );

    Ok(Engines {
        migration: MigrationEngine::new(gateway.clone(), retry.clone(), cfg.scheduler(), pacing),
        mutation: BatchMutationEngine::new(gateway, retry, pacing.inter_call_delay),
        audit,
        config: cfg.clone(),
    })
}
