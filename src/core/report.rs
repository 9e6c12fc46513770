//! Per-item outcomes and the aggregated batch report.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

use crate::core::retry::RetryFailure;
use crate::core::ErrorKind;
use crate::util::serde::TaskId;

/// Terminal state of one requested item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Everything the operation asked for happened.
    Success,
    /// A duplicate was created but the source could not be removed.
    PartialSuccess,
    /// Nothing changed upstream for this item.
    Failure,
    /// The item was already in a state where the operation does not apply.
    Skip,
}

/// Why an item ended where it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// Copied to the target and removed from the source.
    Migrated,
    /// Marked complete.
    Completed,
    /// Deleted.
    Deleted,
    /// The task could not be read.
    LookupFailed,
    /// Creating the duplicate failed; the source is untouched.
    CreateFailed,
    /// The duplicate exists but the source could not be deleted.
    DeleteFailed,
    /// The complete or delete call failed.
    MutationFailed,
    /// The task is already in the target project.
    AlreadyInTarget,
    /// The task is already completed.
    AlreadyCompleted,
    /// The task no longer exists.
    NotFound,
    /// Upstream refused the call because of the task's state.
    Rejected,
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Migrated => "migrated",
            Self::Completed => "completed",
            Self::Deleted => "deleted",
            Self::LookupFailed => "lookup_failed",
            Self::CreateFailed => "create_failed",
            Self::DeleteFailed => "delete_failed",
            Self::MutationFailed => "mutation_failed",
            Self::AlreadyInTarget => "already_in_target",
            Self::AlreadyCompleted => "already_completed",
            Self::NotFound => "not_found",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Outcome of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    /// Terminal status.
    pub status: OutcomeStatus,
    /// Reason code.
    pub reason: ReasonCode,
    /// Id of the task created in the target project, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_id: Option<TaskId>,
    /// Kind of the failure that decided the outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Attempts made by the call that decided the outcome; never above the
    /// retry policy's `max_attempts`. For a successful migration this is the
    /// larger of the create and delete attempts.
    pub attempts: u32,
    /// Attempts spent creating the duplicate, for migrations that reached the create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_attempts: Option<u32>,
    /// Attempts spent deleting the source, for migrations that reached the delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_attempts: Option<u32>,
    /// Upstream message for the deciding failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OperationOutcome {
    /// Successful outcome.
    pub const fn success(reason: ReasonCode, attempts: u32) -> Self {
        Self {
            status: OutcomeStatus::Success,
            reason,
            created_id: None,
            error_kind: None,
            attempts,
            create_attempts: None,
            delete_attempts: None,
            message: None,
        }
    }

    /// Skip without any mutating call.
    pub const fn skip(reason: ReasonCode) -> Self {
        Self {
            status: OutcomeStatus::Skip,
            reason,
            created_id: None,
            error_kind: None,
            attempts: 0,
            create_attempts: None,
            delete_attempts: None,
            message: None,
        }
    }

    /// Failure built from an exhausted call.
    pub fn failure(reason: ReasonCode, failure: RetryFailure) -> Self {
        Self {
            status: OutcomeStatus::Failure,
            reason,
            created_id: None,
            error_kind: Some(failure.kind),
            attempts: failure.attempts,
            create_attempts: None,
            delete_attempts: None,
            message: Some(failure.message),
        }
    }

    /// Attach the id of a created duplicate.
    #[must_use]
    pub fn with_created_id(mut self, id: impl Into<TaskId>) -> Self {
        self.created_id = Some(id.into());
        self
    }

    /// Record per-step attempts of a migration.
    #[must_use]
    pub fn with_steps(mut self, create: Option<u32>, delete: Option<u32>) -> Self {
        self.create_attempts = create;
        self.delete_attempts = delete;
        self
    }

    /// Whether the outcome counts as healthy when sizing the next round.
    pub const fn is_healthy(&self) -> bool {
        matches!(self.status, OutcomeStatus::Success | OutcomeStatus::Skip)
    }
}

/// One line of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReport {
    /// Requested task id.
    pub task_id: TaskId,
    /// What happened to it.
    pub outcome: OperationOutcome,
}

/// Aggregate counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCounts {
    /// Success outcomes.
    pub succeeded: usize,
    /// PartialSuccess outcomes.
    pub partial: usize,
    /// Failure outcomes.
    pub failed: usize,
    /// Skip outcomes.
    pub skipped: usize,
}

impl ReportCounts {
    /// Total items counted.
    pub const fn total(&self) -> usize {
        self.succeeded + self.partial + self.failed + self.skipped
    }

    fn add(&mut self, status: OutcomeStatus) {
        match status {
            OutcomeStatus::Success => self.succeeded += 1,
            OutcomeStatus::PartialSuccess => self.partial += 1,
            OutcomeStatus::Failure => self.failed += 1,
            OutcomeStatus::Skip => self.skipped += 1,
        }
    }
}

/// Report of one batch request, one entry per requested id in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Operation name the report belongs to.
    pub operation: String,
    /// Per-item outcomes.
    pub items: Vec<ItemReport>,
    /// Aggregate counts over `items`.
    pub counts: ReportCounts,
    /// Size of every round a migration ran, in order. Empty for bulk mutations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rounds: Vec<usize>,
}

/// Report produced by a migration request.
pub type MigrationReport = BatchReport;

impl BatchReport {
    /// Build a report from outcomes in request order.
    pub fn from_items(operation: impl Into<String>, items: Vec<ItemReport>) -> Self {
        let mut counts = ReportCounts::default();
        for item in &items {
            counts.add(item.outcome.status);
        }
        Self {
            operation: operation.into(),
            items,
            counts,
            rounds: Vec::new(),
        }
    }

    /// Attach the round sizes a migration ran with.
    #[must_use]
    pub fn with_rounds(mut self, rounds: Vec<usize>) -> Self {
        self.rounds = rounds;
        self
    }

    /// `(task id, reason)` for every outcome that is not Success.
    pub fn issues(&self) -> Vec<(&str, ReasonCode)> {
        self.items
            .iter()
            .filter(|i| i.outcome.status != OutcomeStatus::Success)
            .map(|i| (i.task_id.as_str(), i.outcome.reason))
            .collect()
    }

    /// Ids that ended as Failure and are safe to resubmit.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|i| i.outcome.status == OutcomeStatus::Failure)
            .map(|i| i.task_id.as_str())
            .collect()
    }

    /// Human-readable summary.
    pub fn render(&self) -> String {
        let c = &self.counts;
        let mut out = format!(
            "{}: {} item(s): {} succeeded, {} partial, {} failed, {} skipped\n",
            self.operation,
            c.total(),
            c.succeeded,
            c.partial,
            c.failed,
            c.skipped
        );
        if !self.rounds.is_empty() {
            let sizes: Vec<String> = self.rounds.iter().map(ToString::to_string).collect();
            let _ = writeln!(out, "rounds: {}", sizes.join(","));
        }
        for item in &self.items {
            let o = &item.outcome;
            let status = match o.status {
                OutcomeStatus::Success => "OK     ",
                OutcomeStatus::PartialSuccess => "PARTIAL",
                OutcomeStatus::Failure => "FAILED ",
                OutcomeStatus::Skip => "SKIPPED",
            };
            let _ = write!(out, "- [{status}] {} ({})", item.task_id, o.reason);
            if let Some(created) = &o.created_id {
                let _ = write!(out, " new id {created}");
            }
            if let Some(kind) = o.error_kind {
                let _ = write!(out, " after {} attempt(s), {kind}", o.attempts);
            }
            if let Some(message) = &o.message {
                let _ = write!(out, ": {message}");
            }
            out.push('\n');
        }
        if c.partial > 0 {
            out.push_str(
                "Partial migrations left a copy in both projects; remove one copy manually after checking it.\n",
            );
        }
        let failed = self.failed_ids();
        if !failed.is_empty() {
            let _ = writeln!(out, "Retry failed ids: {}", failed.join(","));
        }
        out
    }
}
