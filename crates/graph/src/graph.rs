use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::Instrument;

use crate::command::Goto;
use crate::error::GraphError;
use crate::node::{AnyNode, Node, NodeObject};
use crate::{END, GraphState, START};

/// How many node runs one invocation may take by default.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// Builder of a graph.
///
/// Nothing is validated until [`StateGraph::compile`] is called.
pub struct StateGraph<S: GraphState> {
    nodes: Vec<(String, Arc<dyn NodeObject<S>>)>,
    edges: Vec<(String, String)>,
}

impl<S: GraphState> StateGraph<S> {
    /// Creates an empty graph.
    #[inline]
    pub fn new() -> Self {
        Self {
            nodes: vec![],
            edges: vec![],
        }
    }

    /// Adds a node under `name`.
    #[inline]
    pub fn with_node<N: Node<S>>(mut self, name: &str, node: N) -> Self {
        self.nodes.push((name.to_owned(), Arc::new(AnyNode(node))));
        self
    }

    /// Adds a static edge. `from` may be [`START`], `to` may be [`END`].
    ///
    /// A node with a single outgoing edge follows it unless its command
    /// says otherwise. A node with several edges must pick one through
    /// [`crate::Command::goto`]; the edges then only document the possible
    /// routes.
    #[inline]
    pub fn with_edge(mut self, from: &str, to: &str) -> Self {
        self.edges.push((from.to_owned(), to.to_owned()));
        self
    }

    /// Validates the graph and makes it runnable.
    pub fn compile(self) -> Result<CompiledGraph<S>, GraphError> {
        let mut nodes = HashMap::with_capacity(self.nodes.len());
        let mut order = Vec::with_capacity(self.nodes.len());
        for (name, node) in self.nodes {
            if name == START || name == END {
                return Err(GraphError::ReservedName(name));
            }
            if nodes.contains_key(&name) {
                return Err(GraphError::DuplicateNode(name));
            }
            order.push(name.clone());
            nodes.insert(name, node);
        }

        let mut seen = HashSet::new();
        let mut edges: HashMap<String, Vec<String>> = HashMap::new();
        for (from, to) in &self.edges {
            if from != START && !nodes.contains_key(from) {
                return Err(GraphError::UnknownNode(from.clone()));
            }
            if to != END && !nodes.contains_key(to) {
                return Err(GraphError::UnknownNode(to.clone()));
            }
            if seen.insert((from.clone(), to.clone())) {
                edges.entry(from.clone()).or_default().push(to.clone());
            }
        }
        match edges.get(START).map(Vec::len) {
            None | Some(0) => return Err(GraphError::MissingEntry),
            Some(1) => {}
            Some(_) => return Err(GraphError::AmbiguousRoute(START.to_owned())),
        }

        let edge_list = self
            .edges
            .into_iter()
            .filter(|edge| seen.remove(edge))
            .collect();

        Ok(CompiledGraph {
            nodes,
            order,
            edges,
            edge_list,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        })
    }
}

impl<S: GraphState> Default for StateGraph<S> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// A validated graph, ready to be invoked any number of times.
pub struct CompiledGraph<S: GraphState> {
    nodes: HashMap<String, Arc<dyn NodeObject<S>>>,
    order: Vec<String>,
    edges: HashMap<String, Vec<String>>,
    edge_list: Vec<(String, String)>,
    recursion_limit: usize,
}

impl<S: GraphState> CompiledGraph<S> {
    /// Sets the maximum number of node runs per invocation.
    #[inline]
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Runs the graph from `START` until a node routes to `END`, and
    /// returns the final state.
    pub async fn invoke(&self, mut state: S) -> Result<S, GraphError> {
        let mut next = self.route(START, None)?;
        let mut steps = 0;

        while let Goto::Node(name) = next {
            if steps >= self.recursion_limit {
                return Err(GraphError::RecursionLimit(self.recursion_limit));
            }
            steps += 1;

            let node = self
                .nodes
                .get(&name)
                .ok_or_else(|| GraphError::UnknownNode(name.clone()))?;
            trace!("running node `{name}` (step {steps})");
            let command = node
                .run(&state)
                .instrument(debug_span!("node", name = %name))
                .await
                .map_err(|source| GraphError::Node {
                    node: name.clone(),
                    source,
                })?;

            if let Some(update) = command.update {
                state.apply(update);
            }
            next = self.route(&name, command.goto)?;
        }

        debug!("graph finished after {steps} steps");
        Ok(state)
    }

    fn route(&self, from: &str, goto: Option<Goto>) -> Result<Goto, GraphError> {
        if let Some(goto) = goto {
            return match goto {
                Goto::Node(name) if !self.nodes.contains_key(&name) => {
                    Err(GraphError::UnknownNode(name))
                }
                goto => Ok(goto),
            };
        }

        let targets = self.edges.get(from).map(Vec::as_slice).unwrap_or(&[]);
        match targets {
            [] if from == START => Err(GraphError::MissingEntry),
            [] => Ok(Goto::End),
            [to] if to == END => Ok(Goto::End),
            [to] => Ok(Goto::Node(to.clone())),
            _ => Err(GraphError::AmbiguousRoute(from.to_owned())),
        }
    }

    pub(crate) fn node_names(&self) -> &[String] {
        &self.order
    }

    pub(crate) fn edge_list(&self) -> &[(String, String)] {
        &self.edge_list
    }

    pub(crate) fn out_degree(&self, node: &str) -> usize {
        self.edges.get(node).map(Vec::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::future::ready;

    use super::*;
    use crate::{Command, node_fn};

    #[derive(Debug, Default)]
    struct Counter {
        value: u32,
        visited: Vec<&'static str>,
    }

    impl GraphState for Counter {
        type Update = (u32, &'static str);

        fn apply(&mut self, (delta, by): Self::Update) {
            self.value += delta;
            self.visited.push(by);
        }
    }

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Boom {}

    fn counting_graph() -> StateGraph<Counter> {
        StateGraph::new()
            .with_node(
                "inc",
                node_fn(|state: &Counter| {
                    let goto = if state.value + 1 >= 3 {
                        Goto::End
                    } else {
                        Goto::node("echo")
                    };
                    ready(Ok(Command::update((1, "inc")).goto(goto)))
                }),
            )
            .with_node(
                "echo",
                node_fn(|_: &Counter| ready(Ok(Command::update((0, "echo"))))),
            )
            .with_edge(START, "inc")
            .with_edge("inc", "echo")
            .with_edge("inc", END)
            .with_edge("echo", "inc")
    }

    #[tokio::test]
    async fn test_loop_until_end() {
        let graph = counting_graph().compile().unwrap();
        let state = graph.invoke(Counter::default()).await.unwrap();
        assert_eq!(state.value, 3);
        assert_eq!(state.visited, ["inc", "echo", "inc", "echo", "inc"]);

        // A compiled graph can be reused.
        let state = graph
            .invoke(Counter {
                value: 2,
                visited: vec![],
            })
            .await
            .unwrap();
        assert_eq!(state.visited, ["inc"]);
    }

    #[tokio::test]
    async fn test_recursion_limit() {
        let graph = counting_graph()
            .compile()
            .unwrap()
            .with_recursion_limit(2);
        let err = graph.invoke(Counter::default()).await.unwrap_err();
        assert!(matches!(err, GraphError::RecursionLimit(2)));
    }

    #[tokio::test]
    async fn test_implicit_routes() {
        // A node without edges ends the run.
        let graph = StateGraph::new()
            .with_node(
                "only",
                node_fn(|_: &Counter| ready(Ok(Command::update((5, "only"))))),
            )
            .with_edge(START, "only")
            .compile()
            .unwrap();
        let state = graph.invoke(Counter::default()).await.unwrap();
        assert_eq!(state.value, 5);

        // Several edges without a `goto` can't be resolved.
        let graph = StateGraph::new()
            .with_node("a", node_fn(|_: &Counter| ready(Ok(Command::none()))))
            .with_node("b", node_fn(|_: &Counter| ready(Ok(Command::none()))))
            .with_edge(START, "a")
            .with_edge("a", "b")
            .with_edge("a", END)
            .compile()
            .unwrap();
        let err = graph.invoke(Counter::default()).await.unwrap_err();
        assert!(matches!(err, GraphError::AmbiguousRoute(node) if node == "a"));
    }

    #[tokio::test]
    async fn test_goto_unknown_node() {
        let graph = StateGraph::new()
            .with_node(
                "a",
                node_fn(|_: &Counter| {
                    ready(Ok(Command::none().goto(Goto::node("missing"))))
                }),
            )
            .with_edge(START, "a")
            .compile()
            .unwrap();
        let err = graph.invoke(Counter::default()).await.unwrap_err();
        assert!(matches!(err, GraphError::UnknownNode(node) if node == "missing"));
    }

    #[tokio::test]
    async fn test_node_error() {
        let graph = StateGraph::new()
            .with_node("a", node_fn(|_: &Counter| ready(Err(Boom.into()))))
            .with_edge(START, "a")
            .compile()
            .unwrap();
        let err = graph.invoke(Counter::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "node `a` failed: boom");
    }

    #[test]
    fn test_compile_errors() {
        let noop = |_: &Counter| ready(Ok(Command::none()));

        let err = StateGraph::new()
            .with_node("a", node_fn(noop))
            .compile()
            .err()
            .unwrap();
        assert!(matches!(err, GraphError::MissingEntry));

        let err = StateGraph::new()
            .with_node("a", node_fn(noop))
            .with_node("a", node_fn(noop))
            .with_edge(START, "a")
            .compile()
            .err()
            .unwrap();
        assert!(matches!(err, GraphError::DuplicateNode(_)));

        let err = StateGraph::new()
            .with_node("a", node_fn(noop))
            .with_edge(START, "a")
            .with_edge("a", "b")
            .compile()
            .err()
            .unwrap();
        assert!(matches!(err, GraphError::UnknownNode(node) if node == "b"));

        let err = StateGraph::new()
            .with_node(END, node_fn(noop))
            .with_edge(START, END)
            .compile()
            .err()
            .unwrap();
        assert!(matches!(err, GraphError::ReservedName(_)));
    }
}
