//! Tool-facing request/response models and operation dispatch.
//!
//! Tools receive flat string parameters (`task_ids` comma-delimited,
//! `target_project_id`) and answer with text for humans plus the structured
//! report for machine callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::builders::Engines;
use crate::core::{BatchReport, EngineError, MutationKind, TaskGateway, MIGRATE_OPERATION};
use crate::util::serde::TaskId;

/// Flat tool parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParams {
    /// Comma-delimited task ids.
    pub task_ids: String,
    /// Destination project, required by migrations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_project_id: Option<String>,
}

impl ToolParams {
    /// Parameters for a bulk complete or delete.
    pub fn ids(task_ids: impl Into<String>) -> Self {
        Self {
            task_ids: task_ids.into(),
            target_project_id: None,
        }
    }

    /// Parameters for a migration.
    pub fn migrate(task_ids: impl Into<String>, target_project_id: impl Into<String>) -> Self {
        Self {
            task_ids: task_ids.into(),
            target_project_id: Some(target_project_id.into()),
        }
    }
}

/// Tool answer.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResponse {
    /// Human-readable summary.
    pub text: String,
    /// Structured outcome of every item.
    pub report: BatchReport,
}

impl From<BatchReport> for ToolResponse {
    fn from(report: BatchReport) -> Self {
        Self {
            text: report.render(),
            report,
        }
    }
}

/// Registered batch operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Move tasks to another project.
    MigrateTasks,
    /// Mark tasks complete.
    BatchCompleteTasks,
    /// Delete tasks.
    BatchDeleteTasks,
}

/// Name table; the first entry for each operation is canonical.
const OPERATION_NAMES: &[(&str, Operation)] = &[
    (MIGRATE_OPERATION, Operation::MigrateTasks),
    ("batch_complete_tasks", Operation::BatchCompleteTasks),
    ("batch_delete_tasks", Operation::BatchDeleteTasks),
    ("move_task", Operation::MigrateTasks),
];

impl Operation {
    /// Every operation, in table order.
    pub const ALL: [Self; 3] = [
        Self::MigrateTasks,
        Self::BatchCompleteTasks,
        Self::BatchDeleteTasks,
    ];

    /// Canonical tool name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::MigrateTasks => MIGRATE_OPERATION,
            Self::BatchCompleteTasks => MutationKind::Complete.operation_name(),
            Self::BatchDeleteTasks => MutationKind::Delete.operation_name(),
        }
    }

    /// Look an operation up by canonical name or alias.
    pub fn lookup(name: &str) -> Option<Self> {
        let name = name.trim();
        OPERATION_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, op)| *op)
    }

    /// Run this operation against `engines`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for invalid parameters or missing credentials.
    pub async fn execute<G: TaskGateway>(
        self,
        engines: &Engines<G>,
        params: &ToolParams,
    ) -> Result<ToolResponse, EngineError> {
        let ids = parse_task_ids(&params.task_ids);
        tracing::info!(operation = self.name(), count = ids.len(), "tool invoked");
        let report = match self {
            Self::MigrateTasks => {
                let target = params.target_project_id.as_deref().unwrap_or_default();
                engines.migration.migrate_tasks(&ids, target).await?
            }
            Self::BatchCompleteTasks => engines.mutation.run(MutationKind::Complete, &ids).await?,
            Self::BatchDeleteTasks => engines.mutation.run(MutationKind::Delete, &ids).await?,
        };
        Ok(report.into())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| EngineError::UnknownOperation(s.trim().to_string()))
    }
}

/// Split a comma-delimited id list, dropping blanks.
pub fn parse_task_ids(raw: &str) -> Vec<TaskId> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Run the operation registered under `name`.
///
/// # Errors
///
/// Returns [`EngineError::UnknownOperation`] for unregistered names and
/// whatever the operation itself rejects.
pub async fn dispatch<G: TaskGateway>(
    name: &str,
    engines: &Engines<G>,
    params: &ToolParams,
) -> Result<ToolResponse, EngineError> {
    let operation: Operation = name.parse()?;
    operation.execute(engines, params).await
}
