use std::sync::Arc;

use agent_platform_graph::{
    DEFAULT_RECURSION_LIMIT, END, GraphError, START, StateGraph,
};
use agent_platform_model::ModelProvider;

use super::nodes::{LlmCall, ToolNode};
use super::{Agent, LLM_CALL, TOOL_NODE};
use crate::model_client::{ModelClient, RetryPolicy};
use crate::tool::{AnyTool, Executor as ToolExecutor, Tool, ToolObject};

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    system_prompt: Option<String>,
    tools: Vec<Box<dyn ToolObject>>,
    recursion_limit: usize,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self::with_model_client(ModelClient::new(provider))
    }

    /// Creates a new builder around an existing model client.
    ///
    /// Tools already bound to the client are replaced by the tools
    /// registered on this builder.
    #[inline]
    pub fn with_model_client(model_client: ModelClient) -> Self {
        Self {
            model_client,
            system_prompt: None,
            tools: vec![],
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }

    /// Sets the system prompt sent ahead of every model request.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets how transient model errors are retried.
    #[inline]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.model_client = self.model_client.with_retry_policy(policy);
        self
    }

    /// Limits the number of graph steps of one invocation. Each model call
    /// and each round of tool calls counts as one step.
    #[inline]
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.tools.push(Box::new(AnyTool(tool)));
        self
    }

    /// Builds the agent.
    pub fn build(self) -> Result<Agent, GraphError> {
        let executor = ToolExecutor::with_tools(self.tools);
        let model_client = self.model_client.bind_tools(executor.definitions());

        let graph = StateGraph::new()
            .with_node(
                LLM_CALL,
                LlmCall {
                    model_client,
                    system_prompt: self.system_prompt,
                },
            )
            .with_node(TOOL_NODE, ToolNode { executor })
            .with_edge(START, LLM_CALL)
            .with_edge(LLM_CALL, TOOL_NODE)
            .with_edge(LLM_CALL, END)
            .with_edge(TOOL_NODE, LLM_CALL)
            .compile()?
            .with_recursion_limit(self.recursion_limit);

        Ok(Agent {
            graph: Arc::new(graph),
        })
    }
}
