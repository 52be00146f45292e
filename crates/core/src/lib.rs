//! Core logic including the agent loop, tool execution and the model
//! client wrapper.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod conversation;
mod model_client;
pub mod tool;

pub use agent::{Agent, AgentBuilder, AgentState};
pub use model_client::{ModelClient, RetryPolicy};

/// Re-exports of the graph types the agent is built from.
pub mod graph {
    pub use agent_platform_graph::*;
}
