//! Task migration between projects.
//!
//! The upstream cannot move a task, so a migration creates a copy in the
//! target project and deletes the source only once the copy is confirmed.
//! If the delete then fails the item ends as `PartialSuccess` with the task
//! present in both projects. Neither copy is ever removed automatically:
//! a visible duplicate is recoverable, a lost task is not.
//!
//! A create is retried like any other call, so a create whose response was
//! lost in transit can leave an extra copy in the target project.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::report::{ItemReport, MigrationReport, OperationOutcome, OutcomeStatus, ReasonCode};
use crate::core::retry::{pause, RetryExecutor};
use crate::core::scheduler::{BatchScheduler, Pacing, RoundStats};
use crate::core::{EngineError, GatewayOp, TaskGateway};
use crate::util::serde::{ProjectId, TaskId, TaskSnapshot};

/// Operation name used in reports.
pub const MIGRATE_OPERATION: &str = "migrate_tasks";

/// One task to move, with the snapshot taken when the request was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationItem {
    /// Id of the task in its current project.
    pub source_task_id: TaskId,
    /// Current project.
    pub source_project_id: ProjectId,
    /// Destination project.
    pub target_project_id: ProjectId,
    /// Full payload copied into the destination.
    pub snapshot: TaskSnapshot,
}

impl MigrationItem {
    /// Build an item from a freshly read snapshot.
    pub fn new(task_id: impl Into<TaskId>, snapshot: TaskSnapshot, target: impl Into<ProjectId>) -> Self {
        Self {
            source_task_id: task_id.into(),
            source_project_id: snapshot.project_id.clone(),
            target_project_id: target.into(),
            snapshot,
        }
    }
}

/// Moves tasks in adaptively sized rounds, one item at a time.
pub struct MigrationEngine<G> {
    gateway: Arc<G>,
    retry: RetryExecutor,
    scheduler: BatchScheduler,
    pacing: Pacing,
}

impl<G: TaskGateway> MigrationEngine<G> {
    /// Create an engine over `gateway`.
    pub const fn new(gateway: Arc<G>, retry: RetryExecutor, scheduler: BatchScheduler, pacing: Pacing) -> Self {
        Self {
            gateway,
            retry,
            scheduler,
            pacing,
        }
    }

    /// Move every task in `task_ids` into `target_project_id`.
    ///
    /// Ids are read first to capture their snapshot; duplicates collapse to
    /// their first occurrence. The report holds exactly one entry per unique
    /// id, in request order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] only for request-level problems (no ids, no
    /// target, missing credentials), before any upstream call is made.
    pub async fn migrate_tasks(
        &self,
        task_ids: &[TaskId],
        target_project_id: &str,
    ) -> Result<MigrationReport, EngineError> {
        let target = target_project_id.trim();
        if target.is_empty() {
            return Err(EngineError::InvalidParameters("target project id is required".into()));
        }
        let ids = unique_ids(task_ids);
        if ids.is_empty() {
            return Err(EngineError::InvalidParameters("no task ids provided".into()));
        }
        if !self.gateway.is_authenticated() {
            return Err(EngineError::MissingCredentials);
        }

        tracing::info!(count = ids.len(), target, "starting migration");
        let mut slots = BTreeMap::new();
        let mut pending = Vec::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            if index > 0 {
                pause(self.pacing.inter_call_delay).await;
            }
            match self.resolve(id, target).await {
                Ok(item) => pending.push((index, item)),
                Err(outcome) => {
                    tracing::info!(task_id = %id, reason = %outcome.reason, "not migrating");
                    slots.insert(index, ItemReport {
                        task_id: id.clone(),
                        outcome,
                    });
                }
            }
        }

        if !pending.is_empty() {
            pause(self.pacing.inter_call_delay).await;
        }
        let rounds = self.run_rounds(pending, &mut slots).await;
        Ok(MigrationReport::from_items(MIGRATE_OPERATION, slots.into_values().collect()).with_rounds(rounds))
    }

    /// Migrate already resolved items. The report follows the order of `items`.
    ///
    /// Items already in their target project or already completed are
    /// skipped, as they are for [`Self::migrate_tasks`].
    pub async fn run(&self, items: Vec<MigrationItem>) -> MigrationReport {
        let mut slots = BTreeMap::new();
        let rounds = self.run_rounds(items.into_iter().enumerate().collect(), &mut slots).await;
        MigrationReport::from_items(MIGRATE_OPERATION, slots.into_values().collect()).with_rounds(rounds)
    }

    /// Create the copy, then delete the source if and only if the copy exists.
    pub async fn migrate(&self, item: &MigrationItem) -> OperationOutcome {
        if let Some(skipped) = precheck(item) {
            return skipped;
        }
        let gateway = &*self.gateway;
        let task_id = item.source_task_id.as_str();
        let source = item.source_project_id.as_str();
        let target = item.target_project_id.as_str();
        let payload = item.snapshot.duplicate_into(target);
        let payload = &payload;

        let created = match self
            .retry
            .execute(GatewayOp::Create.as_str(), task_id, move || {
                gateway.create_task(target, payload)
            })
            .await
        {
            Ok(created) => created,
            Err(failure) => {
                tracing::warn!(task_id, target, kind = %failure.kind, "copy not created; source untouched");
                let create_attempts = failure.attempts;
                return OperationOutcome::failure(ReasonCode::CreateFailed, failure)
                    .with_steps(Some(create_attempts), None);
            }
        };
        let created_id = created.value.id.clone().unwrap_or_default();

        match self
            .retry
            .execute(GatewayOp::Delete.as_str(), task_id, move || {
                gateway.delete_task(source, task_id)
            })
            .await
        {
            Ok(deleted) => {
                tracing::info!(task_id, new_id = %created_id, target, "task migrated");
                OperationOutcome::success(ReasonCode::Migrated, created.attempts.max(deleted.attempts))
                    .with_steps(Some(created.attempts), Some(deleted.attempts))
                    .with_created_id(created_id)
            }
            Err(failure) => {
                tracing::warn!(
                    task_id,
                    new_id = %created_id,
                    source,
                    target,
                    kind = %failure.kind,
                    "source not deleted; task now exists in both projects"
                );
                let delete_attempts = failure.attempts;
                OperationOutcome {
                    status: OutcomeStatus::PartialSuccess,
                    ..OperationOutcome::failure(ReasonCode::DeleteFailed, failure)
                }
                .with_steps(Some(created.attempts), Some(delete_attempts))
                .with_created_id(created_id)
            }
        }
    }

    async fn resolve(&self, task_id: &str, target: &str) -> Result<MigrationItem, OperationOutcome> {
        let gateway = &*self.gateway;
        let snapshot = self
            .retry
            .execute(GatewayOp::Get.as_str(), task_id, move || gateway.get_task(task_id))
            .await
            .map_err(|failure| OperationOutcome::failure(ReasonCode::LookupFailed, failure))?
            .value;
        let item = MigrationItem::new(task_id, snapshot, target);
        precheck(&item).map_or(Ok(item), Err)
    }

    /// Runs every round and returns the round sizes used.
    async fn run_rounds(
        &self,
        items: Vec<(usize, MigrationItem)>,
        slots: &mut BTreeMap<usize, ItemReport>,
    ) -> Vec<usize> {
        let mut plan = self.scheduler.plan(items);
        let mut rounds = Vec::new();
        let mut round_no = 0_usize;
        while !plan.is_empty() {
            if round_no > 0 {
                pause(self.pacing.inter_round_delay).await;
            }
            round_no += 1;
            let round = self.scheduler.next_round(&mut plan);
            rounds.push(round.len());
            tracing::info!(
                round = round_no,
                size = round.len(),
                remaining = plan.remaining(),
                "migration round"
            );

            let mut stats = RoundStats {
                healthy: 0,
                total: round.len(),
            };
            for (position, (index, item)) in round.into_iter().enumerate() {
                if position > 0 {
                    pause(self.pacing.inter_call_delay).await;
                }
                let outcome = self.migrate(&item).await;
                if outcome.is_healthy() {
                    stats.healthy += 1;
                }
                slots.insert(index, ItemReport {
                    task_id: item.source_task_id,
                    outcome,
                });
            }

            let next = self.scheduler.complete_round(&mut plan, stats);
            tracing::debug!(round = round_no, healthy = stats.healthy, total = stats.total, next, "round finished");
        }
        rounds
    }
}

/// Skip outcome for an item that must not be copied: it already lives in the
/// target, or it is completed and its source could never be deleted.
fn precheck(item: &MigrationItem) -> Option<OperationOutcome> {
    if item.source_project_id == item.target_project_id {
        Some(OperationOutcome::skip(ReasonCode::AlreadyInTarget))
    } else if item.snapshot.is_completed() {
        Some(OperationOutcome::skip(ReasonCode::AlreadyCompleted))
    } else {
        None
    }
}

/// Trimmed, non-empty ids with duplicates removed, first occurrence kept.
pub(crate) fn unique_ids(task_ids: &[TaskId]) -> Vec<TaskId> {
    let mut seen = std::collections::HashSet::new();
    task_ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .map(str::to_string)
        .collect()
}
