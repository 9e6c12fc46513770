//! Configuration for the batch engines.

pub mod engine;

pub use engine::{EngineConfig, ENV_PREFIX};
