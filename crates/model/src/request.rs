use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::ToolCallRequest;

/// A request to be sent to the model provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelRequest {
    /// The input messages, oldest first.
    pub messages: Vec<ModelMessage>,
    /// Tools that are available to the model.
    pub tools: Vec<ModelTool>,
}

/// A complete message in the conversation history.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ModelMessage {
    /// The system instructions.
    System {
        /// Text of the instructions.
        content: String,
    },
    /// A user input text.
    User {
        /// Text typed by the user.
        content: String,
    },
    /// A reply produced by the model.
    Assistant(AssistantMessage),
    /// A tool call result.
    Tool(ToolCallResult),
}

impl ModelMessage {
    /// Creates a system message.
    #[inline]
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[inline]
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Returns the tool calls requested by this message, if it is an
    /// assistant message.
    #[inline]
    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        match self {
            Self::Assistant(msg) => &msg.tool_calls,
            _ => &[],
        }
    }
}

/// A message generated by the model.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct AssistantMessage {
    /// Identifier assigned by the provider, if any.
    pub id: Option<String>,
    /// The text part of the reply. May be empty when the model only
    /// requests tool calls.
    pub content: String,
    /// Tool calls the model wants executed before it continues.
    pub tool_calls: Vec<ToolCallRequest>,
}

impl AssistantMessage {
    /// Creates a text-only assistant message.
    #[inline]
    pub fn text<S: Into<String>>(content: S) -> Self {
        Self {
            id: None,
            content: content.into(),
            tool_calls: vec![],
        }
    }
}

/// The result of calling a tool.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// The unique identifier for the tool call request.
    pub id: String,
    /// The result of the tool call.
    pub content: String,
}

/// Describes a tool that can be used by the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelTool {
    /// Name of the tool.
    pub name: String,
    /// Description of the tool.
    pub description: String,
    /// Parameters definition of the tool.
    ///
    /// For most model providers, the parameters should typically be
    /// defined by a [JSON schema](https://json-schema.org/).
    pub parameters: Value,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_tool_calls_accessor() {
        let msg = ModelMessage::Assistant(AssistantMessage {
            id: Some("chatcmpl-1".to_owned()),
            content: String::new(),
            tool_calls: vec![ToolCallRequest {
                id: "call_1".to_owned(),
                name: "add".to_owned(),
                arguments: json!({ "a": 3, "b": 4 }),
            }],
        });
        assert_eq!(msg.tool_calls().len(), 1);
        assert!(ModelMessage::user("hi").tool_calls().is_empty());
    }

    #[test]
    fn test_message_tagging() {
        let value = serde_json::to_value(ModelMessage::user("Hello")).unwrap();
        assert_eq!(value, json!({ "role": "user", "content": "Hello" }));

        let value = serde_json::to_value(ModelMessage::Tool(ToolCallResult {
            id: "call_1".to_owned(),
            content: "7".to_owned(),
        }))
        .unwrap();
        assert_eq!(value["role"], "tool");
        assert_eq!(value["id"], "call_1");
    }
}
