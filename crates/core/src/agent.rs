mod builder;
mod nodes;
mod state;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use agent_platform_graph::{CompiledGraph, GraphError};
use agent_platform_model::ModelMessage;

use crate::conversation::Conversation;
pub use builder::AgentBuilder;
pub use state::AgentState;

/// Name of the node that calls the model.
pub(crate) const LLM_CALL: &str = "llm_call";
/// Name of the node that runs the requested tools.
pub(crate) const TOOL_NODE: &str = "tool_node";

/// A tool-using agent.
///
/// The agent is a two-node graph: `llm_call` sends the history to the
/// model, and whenever the reply requests tool calls, `tool_node` runs them
/// and hands the results back to `llm_call`. An invocation ends as soon as
/// the model replies without requesting any tool.
///
/// Cloning an agent is cheap, and clones can run concurrently.
#[derive(Clone)]
pub struct Agent {
    graph: Arc<CompiledGraph<AgentState>>,
}

impl Agent {
    /// Runs the agent on a single user input.
    pub async fn invoke<S: Into<String>>(
        &self,
        content: S,
    ) -> Result<Conversation, GraphError> {
        let state = AgentState::new(vec![ModelMessage::user(content)]);
        let state = self.invoke_state(state).await?;
        Ok(Conversation::from_messages(state.into_messages()))
    }

    /// Runs the agent starting from an arbitrary state, e.g. a previous
    /// conversation followed by a new user message.
    pub async fn invoke_state(
        &self,
        state: AgentState,
    ) -> Result<AgentState, GraphError> {
        info!("invoking agent with {} messages", state.messages().len());
        self.graph.invoke(state).await
    }

    /// Renders the agent graph as a Mermaid flowchart.
    #[inline]
    pub fn draw_mermaid(&self) -> String {
        self.graph.draw_mermaid()
    }
}
