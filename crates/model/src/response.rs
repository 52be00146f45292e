use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::request::AssistantMessage;

/// A complete reply from the model provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelResponse {
    /// The generated message.
    pub message: AssistantMessage,
    /// Why the model stopped generating.
    pub finish_reason: ModelFinishReason,
    /// Token accounting, when the provider reports it.
    pub usage: Option<TokenUsage>,
}

/// The reason why a model response has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFinishReason {
    /// The model needs to call a tool.
    ToolCalls,
    /// The model has finished generating text.
    Stop,
    /// The output was cut off by the token limit.
    Length,
}

/// Token counts of one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated by the model.
    pub completion_tokens: u32,
}

/// Describes a tool call request from the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// The unique identifier for the tool call request.
    pub id: String,
    /// The name of the tool to call.
    pub name: String,
    /// The arguments to pass to the function, usually a JSON object.
    pub arguments: Value,
}
