//! # TickTick Batch
//!
//! Adaptive batch task migration and bulk mutation for the TickTick/Dida365 API.
//!
//! The upstream offers per-task create, read, delete and complete calls, but no
//! way to move a task between projects and no batch endpoints. This crate
//! builds both on top of those primitives while staying inside the upstream's
//! rate limits and never losing a task.
//!
//! ## Core Problem Solved
//!
//! - **No native move**: a migration creates a copy in the target project and
//!   deletes the source only after the copy is confirmed. A failed delete leaves
//!   a visible duplicate (`PartialSuccess`), never a lost task.
//! - **Global rate limits**: calls are strictly sequential with fixed pauses
//!   between items and rounds.
//! - **Flaky upstream**: every call runs under a retry executor that only
//!   retries transient and rate-limited failures, with exponential backoff and
//!   jitter.
//!
//! ## Key Features
//!
//! - **Error classifier**: maps raw gateway failures to a fixed taxonomy
//! - **Adaptive rounds**: round size grows by one after a clean round and
//!   shrinks after any failure, within `[1, max_round_size]`
//! - **Bulk complete/delete**: independent per-item operations, one report
//! - **Reports**: every requested item exactly once, in request order, as JSON
//!   or text, with the ids worth retrying
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ticktick_batch::builders::build_engines;
//! use ticktick_batch::config::EngineConfig;
//! use ticktick_batch::runtime::{dispatch, ToolParams};
//!
//! let engines = build_engines(&EngineConfig::load(None)?, Arc::new(my_gateway))?;
//! let response = dispatch(
//!     "migrate_tasks",
//!     &engines,
//!     &ToolParams::migrate("t1,t2,t3", "work"),
//! )
//! .await?;
//! println!("{}", response.text);
//! ```
//!
//! For complete examples, see:
//! - `tests/migration_test.rs` - Migration scenarios against the in-memory gateway
//! - `tests/batch_mutation_test.rs` - Bulk complete and delete

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core engines: classification, retries, scheduling, migration and bulk mutation.
pub mod core;
/// Engine configuration with defaults, validation and env loading.
pub mod config;
/// Builders to assemble engines from configuration.
pub mod builders;
/// Infrastructure adapters for the upstream API.
pub mod infra;
/// Tool-invocation surface and operation dispatch.
pub mod runtime;
/// Shared utilities.
pub mod util;
