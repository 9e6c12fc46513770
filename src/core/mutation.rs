//! Bulk complete and delete.
//!
//! The upstream has no batch endpoints, so each id is handled on its own:
//! look the task up to find its project and status, then issue one
//! complete or delete call. Ids are processed strictly one after another with
//! a fixed pause in between, and no single failure stops the batch.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::migration::unique_ids;
use crate::core::report::{BatchReport, ItemReport, OperationOutcome, OutcomeStatus, ReasonCode};
use crate::core::retry::{pause, RetryExecutor};
use crate::core::{EngineError, ErrorKind, GatewayOp, TaskGateway};
use crate::util::serde::TaskId;

/// Bulk operation to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// Mark tasks complete.
    Complete,
    /// Delete tasks.
    Delete,
}

impl MutationKind {
    /// Operation name used in reports.
    pub const fn operation_name(self) -> &'static str {
        match self {
            Self::Complete => "batch_complete_tasks",
            Self::Delete => "batch_delete_tasks",
        }
    }

    const fn gateway_op(self) -> GatewayOp {
        match self {
            Self::Complete => GatewayOp::Complete,
            Self::Delete => GatewayOp::Delete,
        }
    }

    const fn done_reason(self) -> ReasonCode {
        match self {
            Self::Complete => ReasonCode::Completed,
            Self::Delete => ReasonCode::Deleted,
        }
    }
}

/// Applies one [`MutationKind`] to a set of ids.
pub struct BatchMutationEngine<G> {
    gateway: Arc<G>,
    retry: RetryExecutor,
    inter_call_delay: Duration,
}

impl<G: TaskGateway> BatchMutationEngine<G> {
    /// Create an engine over `gateway`.
    pub const fn new(gateway: Arc<G>, retry: RetryExecutor, inter_call_delay: Duration) -> Self {
        Self {
            gateway,
            retry,
            inter_call_delay,
        }
    }

    /// Apply `kind` to every id, in order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when no ids are given or credentials are
    /// missing. Per-item failures are reported, never returned.
    pub async fn run(&self, kind: MutationKind, task_ids: &[TaskId]) -> Result<BatchReport, EngineError> {
        let ids = unique_ids(task_ids);
        if ids.is_empty() {
            return Err(EngineError::InvalidParameters("no task ids provided".into()));
        }
        if !self.gateway.is_authenticated() {
            return Err(EngineError::MissingCredentials);
        }

        let total = ids.len();
        tracing::info!(operation = kind.operation_name(), count = total, "starting batch");
        let mut items = Vec::with_capacity(total);
        for (index, id) in ids.into_iter().enumerate() {
            if index > 0 {
                pause(self.inter_call_delay).await;
            }
            let outcome = self.apply(kind, &id).await;
            tracing::info!(
                operation = kind.operation_name(),
                task_id = %id,
                position = index + 1,
                total,
                reason = %outcome.reason,
                "item processed"
            );
            items.push(ItemReport { task_id: id, outcome });
        }
        Ok(BatchReport::from_items(kind.operation_name(), items))
    }

    /// Apply `kind` to a single id.
    pub async fn apply(&self, kind: MutationKind, task_id: &str) -> OperationOutcome {
        let gateway = &*self.gateway;
        let task = match self
            .retry
            .execute(GatewayOp::Get.as_str(), task_id, move || gateway.get_task(task_id))
            .await
        {
            Ok(found) => found.value,
            Err(failure) if failure.kind == ErrorKind::NotFound => {
                return match kind {
                    MutationKind::Delete => OperationOutcome::skip(ReasonCode::NotFound),
                    MutationKind::Complete => OperationOutcome::failure(ReasonCode::NotFound, failure),
                };
            }
            Err(failure) => return OperationOutcome::failure(ReasonCode::LookupFailed, failure),
        };

        if task.is_completed() {
            return OperationOutcome::skip(ReasonCode::AlreadyCompleted);
        }

        let project = task.project_id.as_str();
        let result = self
            .retry
            .execute(kind.gateway_op().as_str(), task_id, move || match kind {
                MutationKind::Complete => gateway.complete_task(project, task_id),
                MutationKind::Delete => gateway.delete_task(project, task_id),
            })
            .await;

        match result {
            Ok(done) => OperationOutcome::success(kind.done_reason(), done.attempts),
            Err(failure) if failure.kind == ErrorKind::Conflict => OperationOutcome {
                status: OutcomeStatus::Skip,
                ..OperationOutcome::failure(ReasonCode::Rejected, failure)
            },
            Err(failure) if failure.kind == ErrorKind::NotFound && kind == MutationKind::Delete => {
                OperationOutcome {
                    status: OutcomeStatus::Skip,
                    ..OperationOutcome::failure(ReasonCode::NotFound, failure)
                }
            }
            Err(failure) => OperationOutcome::failure(ReasonCode::MutationFailed, failure),
        }
    }
}
