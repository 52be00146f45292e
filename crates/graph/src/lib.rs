//! A small state-graph executor.
//!
//! A graph is a set of named nodes connected by edges. Running it threads a
//! state value through the nodes: each node looks at the current state and
//! returns a [`Command`] carrying an update (merged into the state by the
//! state's reducer) and, optionally, the next node to go to. Execution
//! starts at the node connected to [`START`] and stops when a node routes
//! to [`END`].

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod command;
mod error;
mod graph;
mod mermaid;
mod node;

pub use command::{Command, Goto};
pub use error::GraphError;
pub use graph::{CompiledGraph, DEFAULT_RECURSION_LIMIT, StateGraph};
pub use node::{FnNode, Node, NodeError, NodeResult, node_fn};

/// The virtual entry point of every graph.
pub const START: &str = "__start__";

/// The virtual exit point of every graph.
pub const END: &str = "__end__";

/// State threaded through a graph.
pub trait GraphState: Send + 'static {
    /// The partial update nodes produce.
    type Update: Send + 'static;

    /// Merges an update produced by a node into the state.
    fn apply(&mut self, update: Self::Update);
}
