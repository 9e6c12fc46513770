//! Upstream gateway abstraction.

use std::fmt;

use async_trait::async_trait;

use crate::core::GatewayError;
use crate::util::serde::TaskSnapshot;

/// Authenticated task primitives offered by the upstream API.
///
/// The upstream has no move and no batch endpoints; the engines build those
/// out of these calls. Implementations report failures as raw
/// [`GatewayError`]s and leave classification and retries to the engines.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use ticktick_batch::core::{GatewayError, TaskGateway};
/// use ticktick_batch::util::TaskSnapshot;
///
/// struct HttpGateway { /* client, base url, token */ }
///
/// #[async_trait]
/// impl TaskGateway for HttpGateway {
///     async fn get_task(&self, task_id: &str) -> Result<TaskSnapshot, GatewayError> {
///         // GET every project's data and search for `task_id`
///         # unimplemented!()
///     }
///     // create_task, delete_task, complete_task ...
/// }
/// ```
#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// Read a task, including the project it lives in.
    async fn get_task(&self, task_id: &str) -> Result<TaskSnapshot, GatewayError>;

    /// Create `payload` in `project_id` and return the stored task with its new id.
    async fn create_task(
        &self,
        project_id: &str,
        payload: &TaskSnapshot,
    ) -> Result<TaskSnapshot, GatewayError>;

    /// Delete a task.
    async fn delete_task(&self, project_id: &str, task_id: &str) -> Result<(), GatewayError>;

    /// Mark a task complete.
    async fn complete_task(&self, project_id: &str, task_id: &str) -> Result<(), GatewayError>;

    /// Whether credentials are available. Requests are refused up front when not.
    fn is_authenticated(&self) -> bool {
        true
    }
}

/// Gateway call names, used in logs, audit events and fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOp {
    /// [`TaskGateway::get_task`].
    Get,
    /// [`TaskGateway::create_task`].
    Create,
    /// [`TaskGateway::delete_task`].
    Delete,
    /// [`TaskGateway::complete_task`].
    Complete,
}

impl GatewayOp {
    /// Stable lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for GatewayOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
