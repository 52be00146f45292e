use std::fmt::{self, Display};

use agent_platform_graph::{Command, Goto, Node, NodeResult};
use agent_platform_model::{
    ModelFinishReason, ModelMessage, ModelProviderError, ModelRequest,
    ModelResponse, ToolCallResult,
};
use futures_util::future::join_all;
use tracing::Instrument;

use super::{AgentState, LLM_CALL, TOOL_NODE};
use crate::model_client::ModelClient;
use crate::tool::{Executor as ToolExecutor, ToolFuture};

/// Prefix of a tool result that reports a failure to the model.
const TOOL_ERROR_PREFIX: &str = "Tool error: ";

#[derive(Debug)]
struct ModelCallFailed(Box<dyn ModelProviderError>);

impl Display for ModelCallFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model request failed: {}", self.0)
    }
}

impl std::error::Error for ModelCallFailed {}

/// Sends the history to the model and appends its reply.
pub(crate) struct LlmCall {
    pub model_client: ModelClient,
    pub system_prompt: Option<String>,
}

impl Node<AgentState> for LlmCall {
    fn run(
        &self,
        state: &AgentState,
    ) -> impl Future<Output = NodeResult<Vec<ModelMessage>>> + Send + 'static
    {
        let history = state.messages();
        let mut messages = Vec::with_capacity(history.len() + 1);
        if let Some(system_prompt) = &self.system_prompt {
            messages.push(ModelMessage::system(system_prompt.clone()));
        }
        messages.extend_from_slice(history);

        // Tools bound to the client are filled in.
        let request = ModelRequest {
            messages,
            tools: vec![],
        };
        let resp_fut = self.model_client.send_request(request);
        finish_llm_call(resp_fut)
    }
}

async fn finish_llm_call(
    resp_fut: impl Future<Output = Result<ModelResponse, Box<dyn ModelProviderError>>>,
) -> NodeResult<Vec<ModelMessage>> {
    let resp = resp_fut.await.map_err(ModelCallFailed)?;
    if resp.finish_reason == ModelFinishReason::Length {
        warn!("model reply was cut off by the token limit");
    }

    let goto = if resp.message.tool_calls.is_empty() {
        Goto::End
    } else {
        debug!("model requested {} tool calls", resp.message.tool_calls.len());
        Goto::node(TOOL_NODE)
    };
    Ok(Command::update(vec![ModelMessage::Assistant(resp.message)]).goto(goto))
}

/// Runs every tool call of the last model reply and appends the results.
pub(crate) struct ToolNode {
    pub executor: ToolExecutor,
}

impl Node<AgentState> for ToolNode {
    fn run(
        &self,
        state: &AgentState,
    ) -> impl Future<Output = NodeResult<Vec<ModelMessage>>> + Send + 'static
    {
        let requests = state
            .messages()
            .last()
            .map(|msg| msg.tool_calls().to_vec())
            .unwrap_or_default();
        let mut pending = Vec::with_capacity(requests.len());
        self.executor
            .handle_requests(requests, |id, fut| pending.push((id, fut)));

        run_tools(pending).instrument(debug_span!("tool node"))
    }
}

async fn run_tools(
    pending: Vec<(String, ToolFuture)>,
) -> NodeResult<Vec<ModelMessage>> {
    if pending.is_empty() {
        return Err("the last message requests no tool calls".into());
    }

    let results = join_all(
        pending
            .into_iter()
            .map(|(id, fut)| async move { (id, fut.await) }),
    )
    .await;

    let messages = results
        .into_iter()
        .map(|(id, result)| {
            let content = match result {
                Ok(output) => output,
                Err(err) => {
                    // Reported back as the call result.
                    warn!("tool call {id} failed: {err}");
                    format!("{TOOL_ERROR_PREFIX}{}", err.reason())
                }
            };
            ModelMessage::Tool(ToolCallResult { id, content })
        })
        .collect();
    Ok(Command::update(messages).goto(Goto::node(LLM_CALL)))
}
