use std::pin::Pin;

use crate::GraphState;
use crate::command::Command;

/// The error type of a failing node.
pub type NodeError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What running a node produces.
pub type NodeResult<U> = Result<Command<U>, NodeError>;

/// A step of a graph.
///
/// Implementations should copy whatever they need out of the state, since
/// the returned future must be independent of both `self` and `state`.
pub trait Node<S: GraphState>: Send + Sync + 'static {
    /// Runs the node against a snapshot of the state.
    fn run(
        &self,
        state: &S,
    ) -> impl Future<Output = NodeResult<S::Update>> + Send + 'static;
}

/// A [`Node`] backed by a closure. See [`node_fn`].
pub struct FnNode<F>(F);

/// Wraps a closure into a [`Node`].
#[inline]
pub fn node_fn<S, F, Fut>(f: F) -> FnNode<F>
where
    S: GraphState,
    F: Fn(&S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = NodeResult<S::Update>> + Send + 'static,
{
    FnNode(f)
}

impl<S, F, Fut> Node<S> for FnNode<F>
where
    S: GraphState,
    F: Fn(&S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = NodeResult<S::Update>> + Send + 'static,
{
    #[inline]
    fn run(
        &self,
        state: &S,
    ) -> impl Future<Output = NodeResult<S::Update>> + Send + 'static {
        (self.0)(state)
    }
}

pub(crate) type BoxedNodeFuture<U> =
    Pin<Box<dyn Future<Output = NodeResult<U>> + Send>>;

pub(crate) trait NodeObject<S: GraphState>: Send + Sync + 'static {
    fn run(&self, state: &S) -> BoxedNodeFuture<S::Update>;
}

pub(crate) struct AnyNode<N>(pub N);

impl<S: GraphState, N: Node<S>> NodeObject<S> for AnyNode<N> {
    #[inline]
    fn run(&self, state: &S) -> BoxedNodeFuture<S::Update> {
        Box::pin(self.0.run(state))
    }
}
