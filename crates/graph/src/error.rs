use thiserror::Error;

use crate::node::NodeError;

/// Errors from building or running a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Two nodes were added under the same name.
    #[error("node `{0}` is defined more than once")]
    DuplicateNode(String),
    /// A node name collides with `START` or `END`.
    #[error("node name `{0}` is reserved")]
    ReservedName(String),
    /// An edge or a command refers to a node that doesn't exist.
    #[error("unknown node `{0}`")]
    UnknownNode(String),
    /// Nothing is connected to `START`.
    #[error("graph has no entry point, add an edge from START")]
    MissingEntry,
    /// A node has several outgoing edges but returned no `goto`.
    #[error("node `{0}` has several edges but did not choose one")]
    AmbiguousRoute(String),
    /// The graph ran more steps than allowed.
    #[error("recursion limit of {0} steps reached without hitting END")]
    RecursionLimit(usize),
    /// A node failed.
    #[error("node `{node}` failed: {source}")]
    Node {
        /// Name of the failing node.
        node: String,
        /// The error returned by the node.
        #[source]
        source: NodeError,
    },
}
