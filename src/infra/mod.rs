//! Infrastructure adapters for the upstream task API.

pub mod gateway;

pub use gateway::{GatewayCall, InMemoryGateway};
