//! Serializable task types shared by the engines and gateway backends.
//!
//! Field names follow the upstream wire format (camelCase, numeric priority and
//! status codes) so a snapshot can be sent back to the API unchanged.

use serde::{Deserialize, Serialize};

/// Upstream task identifier.
pub type TaskId = String;

/// Upstream project identifier.
pub type ProjectId = String;

/// Task priority as encoded by the upstream (0, 1, 3, 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    /// No priority.
    #[default]
    None,
    /// Low priority.
    Low,
    /// Medium priority.
    Medium,
    /// High priority.
    High,
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> Self {
        match p {
            Priority::None => 0,
            Priority::Low => 1,
            Priority::Medium => 3,
            Priority::High => 5,
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Low),
            3 => Ok(Self::Medium),
            5 => Ok(Self::High),
            other => Err(format!("invalid priority {other}, expected 0, 1, 3 or 5")),
        }
    }
}

/// Task completion status as encoded by the upstream (0 active, 2 completed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TaskStatus {
    /// Open task.
    #[default]
    Active,
    /// Completed task.
    Completed,
}

impl From<TaskStatus> for u8 {
    fn from(s: TaskStatus) -> Self {
        match s {
            TaskStatus::Active => 0,
            TaskStatus::Completed => 2,
        }
    }
}

impl TryFrom<u8> for TaskStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Active),
            2 => Ok(Self::Completed),
            other => Err(format!("invalid task status {other}, expected 0 or 2")),
        }
    }
}

/// Checklist item nested inside a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    /// Subtask identifier.
    #[serde(default)]
    pub id: String,
    /// Subtask title.
    pub title: String,
    /// 0 open, 1 checked.
    #[serde(default)]
    pub status: u8,
    /// Sort order within the parent task.
    #[serde(default)]
    pub order: i64,
}

impl Subtask {
    /// Whether the checklist item is checked.
    pub const fn is_completed(&self) -> bool {
        self.status == 1
    }
}

/// Full payload of a task as read from, or sent to, the upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    /// Upstream id; absent on create payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TaskId>,
    /// Owning project.
    pub project_id: ProjectId,
    /// Task title.
    pub title: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Start date, upstream ISO format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Due date, upstream ISO format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// All-day flag.
    #[serde(default)]
    pub is_all_day: bool,
    /// Priority.
    #[serde(default)]
    pub priority: Priority,
    /// Completion status.
    #[serde(default)]
    pub status: TaskStatus,
    /// Checklist items.
    #[serde(default, rename = "items", skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Subtask>,
    /// Tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl TaskSnapshot {
    /// Minimal snapshot with a title in a project.
    pub fn new(project_id: impl Into<ProjectId>, title: impl Into<String>) -> Self {
        Self {
            id: None,
            project_id: project_id.into(),
            title: title.into(),
            content: None,
            start_date: None,
            due_date: None,
            is_all_day: false,
            priority: Priority::None,
            status: TaskStatus::Active,
            subtasks: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Whether the task is completed.
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Create payload for a copy of this task in `target`.
    ///
    /// Everything except the id and project is carried over.
    #[must_use]
    pub fn duplicate_into(&self, target: &str) -> Self {
        Self {
            id: None,
            project_id: target.to_string(),
            ..self.clone()
        }
    }
}
