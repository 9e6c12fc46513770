//! Tool-invocation surface over the engines.

pub mod api;

pub use api::{dispatch, parse_task_ids, Operation, ToolParams, ToolResponse};
