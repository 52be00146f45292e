//! Conversation-related types.

use std::fmt::{self, Display, Write as _};

use agent_platform_model::{AssistantMessage, ModelMessage};
use serde_json::Value;

const BANNER_WIDTH: usize = 80;

/// Represents a finished conversation, oldest item first.
#[derive(Clone, Default, Debug)]
pub struct Conversation {
    pub(crate) items: Vec<Item>,
}

impl Conversation {
    /// Builds a conversation from raw model messages.
    pub fn from_messages(messages: impl IntoIterator<Item = ModelMessage>) -> Self {
        let items = messages
            .into_iter()
            .map(|msg| {
                let transcript = make_transcript(&msg);
                Item { msg, transcript }
            })
            .collect();
        Self { items }
    }

    /// Returns the items of this conversation.
    #[inline]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Returns the text of the last assistant reply, if any.
    pub fn final_answer(&self) -> Option<&str> {
        self.items.iter().rev().find_map(|item| match &item.msg {
            ModelMessage::Assistant(msg) if msg.tool_calls.is_empty() => {
                Some(msg.content.as_str())
            }
            _ => None,
        })
    }
}

/// An item in the conversation.
#[derive(Clone, Debug)]
pub struct Item {
    pub(crate) msg: ModelMessage,
    pub(crate) transcript: String,
}

impl Item {
    /// Returns the underlying message.
    #[inline]
    pub fn message(&self) -> &ModelMessage {
        &self.msg
    }

    /// Returns a human-readable name of the message kind, such as
    /// "Human Message".
    pub fn title(&self) -> &'static str {
        match self.msg {
            ModelMessage::System { .. } => "System Message",
            ModelMessage::User { .. } => "Human Message",
            ModelMessage::Assistant(_) => "Ai Message",
            ModelMessage::Tool(_) => "Tool Message",
        }
    }

    /// Returns the banner line introducing this item, padded with `=`.
    pub fn banner(&self) -> String {
        let title = format!(" {} ", self.title());
        let padding = BANNER_WIDTH.saturating_sub(title.len());
        let left = padding / 2;
        format!("{}{title}{}", "=".repeat(left), "=".repeat(padding - left))
    }

    /// Returns `true` if a blank line goes between the banner and the
    /// transcript. Only a reply made of tool calls alone goes without.
    pub fn has_gap(&self) -> bool {
        match &self.msg {
            ModelMessage::Assistant(msg) => !msg.content.is_empty(),
            _ => true,
        }
    }

    /// Returns the transcript of this item.
    ///
    /// The transcript is a string representation of the message item,
    /// which can be exported later. But transcript alone is not enough
    /// to reconstruct the message item.
    #[inline]
    pub fn transcript(&self) -> &str {
        &self.transcript
    }
}

impl Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.banner())?;
        if self.has_gap() {
            writeln!(f)?;
        }
        write!(f, "{}", self.transcript)
    }
}

fn make_transcript(msg: &ModelMessage) -> String {
    match msg {
        ModelMessage::System { content } | ModelMessage::User { content } => {
            content.clone()
        }
        ModelMessage::Tool(result) => result.content.clone(),
        ModelMessage::Assistant(msg) => assistant_transcript(msg),
    }
}

fn assistant_transcript(msg: &AssistantMessage) -> String {
    let mut out = msg.content.clone();
    if msg.tool_calls.is_empty() {
        return out;
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str("Tool Calls:");
    for call in &msg.tool_calls {
        // Writing into a `String` never fails.
        let _ = write!(out, "\n  {} ({})\n Call ID: {}", call.name, call.id, call.id);
        match &call.arguments {
            Value::Null => {}
            Value::Object(args) if args.is_empty() => {}
            Value::Object(args) => {
                out.push_str("\n  Args:");
                for (key, value) in args {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    let _ = write!(out, "\n    {key}: {value}");
                }
            }
            other => {
                let _ = write!(out, "\n  Args:\n    {other}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use agent_platform_model::{ToolCallRequest, ToolCallResult};
    use serde_json::json;

    use super::*;

    fn sample() -> Conversation {
        Conversation::from_messages([
            ModelMessage::user("Add 3 and 4."),
            ModelMessage::Assistant(AssistantMessage {
                id: None,
                content: String::new(),
                tool_calls: vec![ToolCallRequest {
                    id: "call_1".to_owned(),
                    name: "add".to_owned(),
                    arguments: json!({ "a": 3, "b": 4 }),
                }],
            }),
            ModelMessage::Tool(ToolCallResult {
                id: "call_1".to_owned(),
                content: "7".to_owned(),
            }),
            ModelMessage::Assistant(AssistantMessage::text("3 + 4 = 7.")),
        ])
    }

    #[test]
    fn test_transcripts() {
        let conversation = sample();
        let items = conversation.items();
        assert_eq!(items[0].transcript(), "Add 3 and 4.");
        assert_eq!(
            items[1].transcript(),
            "Tool Calls:\n  add (call_1)\n Call ID: call_1\n  Args:\n    a: 3\n    b: 4"
        );
        assert_eq!(items[2].transcript(), "7");
        assert_eq!(conversation.final_answer(), Some("3 + 4 = 7."));
    }

    #[test]
    fn test_pretty_print() {
        let conversation = sample();
        let banner = conversation.items()[0].banner();
        assert_eq!(banner.len(), BANNER_WIDTH);
        assert!(banner.contains(" Human Message "));
        assert!(banner.starts_with('='));

        let printed = conversation.items()[2].to_string();
        assert!(printed.ends_with(" Tool Message =================================\n\n7"));

        let printed = conversation.items()[3].to_string();
        assert!(printed.ends_with(" Ai Message ==================================\n\n3 + 4 = 7."));

        let printed = conversation.items()[1].to_string();
        assert!(printed.ends_with("=\nTool Calls:\n  add (call_1)\n Call ID: call_1\n  Args:\n    a: 3\n    b: 4"));
    }

    #[test]
    fn test_tool_call_without_args() {
        let conversation = Conversation::from_messages([ModelMessage::Assistant(
            AssistantMessage {
                id: None,
                content: "Let me check.".to_owned(),
                tool_calls: vec![ToolCallRequest {
                    id: "call_9".to_owned(),
                    name: "now".to_owned(),
                    arguments: json!({}),
                }],
            },
        )]);
        let item = &conversation.items()[0];
        assert!(item.has_gap());
        assert_eq!(
            item.transcript(),
            "Let me check.\nTool Calls:\n  now (call_9)\n Call ID: call_9"
        );
    }
}
