use agent_platform_model::{
    AssistantMessage, ModelFinishReason, ModelMessage, ModelRequest,
    ModelResponse, ModelTool, TokenUsage, ToolCallRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::OpenAIConfig;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionToolCall {
    pub name: String,
    /// JSON-encoded arguments, exactly as generated by the model.
    pub arguments: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub r#type: String,
    pub function: FunctionToolCall,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct FunctionTool {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct Tool {
    r#type: &'static str,
    function: FunctionTool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
    #[serde(flatten)]
    extra_body: Map<String, Value>,
}

// -----------
// Conversions
// -----------

/// A completion that cannot be turned into a [`ModelResponse`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversionError {
    NoChoices,
    ContentFiltered,
}

#[inline]
pub fn create_request(
    req: &ModelRequest,
    config: &OpenAIConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: req.messages.iter().map(create_message).collect(),
        tools: req.tools.iter().map(create_tool).collect(),
        max_tokens: config.max_tokens,
        stream: false,
        extra_body: config.extra_body.clone(),
    }
}

fn create_message(msg: &ModelMessage) -> Message {
    match msg {
        ModelMessage::System { content } => Message::System {
            content: content.clone(),
        },
        ModelMessage::User { content } => Message::User {
            content: content.clone(),
        },
        ModelMessage::Assistant(msg) => {
            let tool_calls = msg
                .tool_calls
                .iter()
                .map(|call| ToolCall {
                    id: call.id.clone(),
                    r#type: "function".to_owned(),
                    function: FunctionToolCall {
                        name: call.name.clone(),
                        arguments: call.arguments.to_string(),
                    },
                })
                .collect::<Vec<_>>();
            // Some servers reject an empty string next to tool calls.
            let content = if msg.content.is_empty() && !tool_calls.is_empty() {
                None
            } else {
                Some(msg.content.clone())
            };
            Message::Assistant {
                content,
                tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            }
        }
        ModelMessage::Tool(result) => Message::Tool {
            tool_call_id: result.id.clone(),
            content: result.content.clone(),
        },
    }
}

#[inline]
fn create_tool(tool: &ModelTool) -> Tool {
    Tool {
        r#type: "function",
        function: FunctionTool {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        },
    }
}

pub fn parse_completion(
    mut completion: ChatCompletion,
) -> Result<ModelResponse, ConversionError> {
    // We never ask for `n > 1`, so only the first choice matters.
    if completion.choices.is_empty() {
        return Err(ConversionError::NoChoices);
    }
    let choice = completion.choices.swap_remove(0);

    let finish_reason = match choice.finish_reason.as_deref() {
        Some("content_filter") => return Err(ConversionError::ContentFiltered),
        Some("tool_calls") | Some("function_call") => {
            ModelFinishReason::ToolCalls
        }
        Some("length") => ModelFinishReason::Length,
        _ => ModelFinishReason::Stop,
    };

    let tool_calls: Vec<_> = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| {
            // Malformed arguments are passed through as a string, the tool
            // will reject them and the model gets a chance to retry.
            let arguments = serde_json::from_str(&call.function.arguments)
                .unwrap_or(Value::String(call.function.arguments));
            ToolCallRequest {
                id: call.id,
                name: call.function.name,
                arguments,
            }
        })
        .collect();

    // Some proxies report `stop` even when tool calls are present.
    let finish_reason = if tool_calls.is_empty() {
        finish_reason
    } else {
        ModelFinishReason::ToolCalls
    };

    Ok(ModelResponse {
        message: AssistantMessage {
            id: Some(completion.id),
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
        },
        finish_reason,
        usage: completion.usage.map(|usage| TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        }),
    })
}
