//! In-memory upstream with scriptable faults.
//!
//! Behaves like the real API for the calls the engines make: tasks live in
//! projects, completed tasks cannot be deleted (409) and unknown ids answer
//! 404. Faults can be queued per operation and key to simulate transient
//! outages, rate limiting or permanent rejections.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::{GatewayError, GatewayOp, TaskGateway};
use crate::util::serde::{TaskId, TaskSnapshot, TaskStatus};

/// One call received by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayCall {
    /// Operation invoked.
    pub op: GatewayOp,
    /// Task id, or the payload title for creates.
    pub key: String,
}

struct Fault {
    op: GatewayOp,
    key: String,
    remaining: Option<u32>,
    error: GatewayError,
}

#[derive(Default)]
struct State {
    tasks: HashMap<TaskId, TaskSnapshot>,
    faults: Vec<Fault>,
    calls: Vec<GatewayCall>,
}

impl State {
    fn take_fault(&mut self, op: GatewayOp, key: &str) -> Option<GatewayError> {
        let pos = self
            .faults
            .iter()
            .position(|f| f.op == op && f.key == key && f.remaining != Some(0))?;
        let fault = &mut self.faults[pos];
        let error = fault.error.clone();
        let spent = match fault.remaining.as_mut() {
            Some(n) => {
                *n -= 1;
                *n == 0
            }
            None => false,
        };
        if spent {
            self.faults.remove(pos);
        }
        Some(error)
    }

    fn enter(&mut self, op: GatewayOp, key: &str) -> Result<(), GatewayError> {
        self.calls.push(GatewayCall {
            op,
            key: key.to_string(),
        });
        self.take_fault(op, key).map_or(Ok(()), Err)
    }

    fn owned(&self, project_id: &str, task_id: &str) -> Result<&TaskSnapshot, GatewayError> {
        self.tasks
            .get(task_id)
            .filter(|t| t.project_id == project_id)
            .ok_or_else(|| not_found(task_id))
    }
}

fn not_found(task_id: &str) -> GatewayError {
    GatewayError::status(404, format!("task {task_id} not found"))
}

/// Thread-safe in-memory [`TaskGateway`].
pub struct InMemoryGateway {
    state: Mutex<State>,
    authenticated: AtomicBool,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGateway {
    /// Empty, authenticated gateway.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            authenticated: AtomicBool::new(true),
        }
    }

    /// Store `task` under `id`, replacing any previous task with that id.
    pub fn insert_task(&self, id: impl Into<TaskId>, mut task: TaskSnapshot) {
        let id = id.into();
        task.id = Some(id.clone());
        self.state.lock().tasks.insert(id, task);
    }

    /// Current copy of a task.
    pub fn task(&self, id: &str) -> Option<TaskSnapshot> {
        self.state.lock().tasks.get(id).cloned()
    }

    /// Tasks currently in `project_id`, sorted by title.
    pub fn tasks_in(&self, project_id: &str) -> Vec<TaskSnapshot> {
        let mut tasks: Vec<_> = self
            .state
            .lock()
            .tasks
            .values()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.title.cmp(&b.title));
        tasks
    }

    /// Fail the next `times` calls of `op` for `key` with `error`.
    ///
    /// `key` is the task id, or the payload title for [`GatewayOp::Create`].
    pub fn fail_next(&self, op: GatewayOp, key: impl Into<String>, times: u32, error: GatewayError) {
        if times == 0 {
            return;
        }
        self.state.lock().faults.push(Fault {
            op,
            key: key.into(),
            remaining: Some(times),
            error,
        });
    }

    /// Fail every call of `op` for `key` with `error`.
    pub fn fail_always(&self, op: GatewayOp, key: impl Into<String>, error: GatewayError) {
        self.state.lock().faults.push(Fault {
            op,
            key: key.into(),
            remaining: None,
            error,
        });
    }

    /// Toggle credentials.
    pub fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::SeqCst);
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().calls.clone()
    }

    /// Number of calls received for `op`.
    pub fn call_count(&self, op: GatewayOp) -> usize {
        self.state.lock().calls.iter().filter(|c| c.op == op).count()
    }
}

#[async_trait]
impl TaskGateway for InMemoryGateway {
    async fn get_task(&self, task_id: &str) -> Result<TaskSnapshot, GatewayError> {
        let mut state = self.state.lock();
        state.enter(GatewayOp::Get, task_id)?;
        state.tasks.get(task_id).cloned().ok_or_else(|| not_found(task_id))
    }

    async fn create_task(
        &self,
        project_id: &str,
        payload: &TaskSnapshot,
    ) -> Result<TaskSnapshot, GatewayError> {
        let mut state = self.state.lock();
        state.enter(GatewayOp::Create, &payload.title)?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        let task = TaskSnapshot {
            id: Some(id.clone()),
            project_id: project_id.to_string(),
            ..payload.clone()
        };
        state.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn delete_task(&self, project_id: &str, task_id: &str) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        state.enter(GatewayOp::Delete, task_id)?;
        if state.owned(project_id, task_id)?.status == TaskStatus::Completed {
            return Err(GatewayError::status(409, "completed tasks cannot be deleted"));
        }
        state.tasks.remove(task_id);
        Ok(())
    }

    async fn complete_task(&self, project_id: &str, task_id: &str) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        state.enter(GatewayOp::Complete, task_id)?;
        state.owned(project_id, task_id)?;
        if let Some(task) = state.tasks.get_mut(task_id) {
            task.status = TaskStatus::Completed;
        }
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }
}
