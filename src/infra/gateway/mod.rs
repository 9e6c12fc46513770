//! Gateway backends.

pub mod memory;

pub use memory::{GatewayCall, InMemoryGateway};
