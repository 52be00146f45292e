use std::future::ready;
use std::time::Duration;

use agent_platform_graph::GraphError;
use agent_platform_model::{ModelMessage, ToolCallRequest, ToolCallResult};
use agent_platform_test_model::{PresetResponse, TestModelProvider};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::tool::{Error as ToolError, Tool, ToolResult};
use crate::{AgentBuilder, AgentState, RetryPolicy};

#[derive(Deserialize)]
struct AddInput {
    a: i64,
    b: i64,
}

struct AddTool {
    schema: Value,
}

impl AddTool {
    fn new() -> Self {
        Self {
            schema: json!({
                "type": "object",
                "properties": {
                    "a": { "type": "integer" },
                    "b": { "type": "integer" }
                },
                "required": ["a", "b"]
            }),
        }
    }
}

impl Tool for AddTool {
    type Input = AddInput;

    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Adds a and b."
    }

    fn parameter_schema(&self) -> &Value {
        &self.schema
    }

    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(
            input
                .a
                .checked_add(input.b)
                .map(|sum| sum.to_string())
                .ok_or_else(|| {
                    ToolError::execution_error().with_reason("overflow")
                }),
        )
    }
}

fn add_call(id: &str, a: i64, b: i64) -> ToolCallRequest {
    ToolCallRequest {
        id: id.to_owned(),
        name: "add".to_owned(),
        arguments: json!({ "a": a, "b": b }),
    }
}

#[tokio::test]
async fn test_simple_message() {
    let mut model_provider = TestModelProvider::default();
    model_provider
        .add_response(PresetResponse::with_content("Hi, what can I do for you?"));

    let agent = AgentBuilder::with_model_provider(model_provider)
        .build()
        .unwrap();
    let conversation = agent.invoke("Hello").await.unwrap();

    assert_eq!(conversation.items().len(), 2);
    assert_eq!(conversation.final_answer(), Some("Hi, what can I do for you?"));
}

#[tokio::test]
async fn test_tool_round_trip() {
    let mut model_provider = TestModelProvider::default();
    model_provider
        .add_response(PresetResponse::with_tool_calls([add_call("call_1", 3, 4)]));
    model_provider.add_response(PresetResponse::with_content("3 + 4 = 7."));

    let agent = AgentBuilder::with_model_provider(model_provider.clone())
        .with_system_prompt("You are a calculator.")
        .with_tool(AddTool::new())
        .build()
        .unwrap();
    let conversation = agent.invoke("Add 3 and 4.").await.unwrap();

    let messages: Vec<_> = conversation
        .items()
        .iter()
        .map(|item| item.message().clone())
        .collect();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0], ModelMessage::user("Add 3 and 4."));
    assert_eq!(messages[1].tool_calls(), [add_call("call_1", 3, 4)]);
    assert_eq!(
        messages[2],
        ModelMessage::Tool(ToolCallResult {
            id: "call_1".to_owned(),
            content: "7".to_owned(),
        })
    );
    assert_eq!(conversation.final_answer(), Some("3 + 4 = 7."));

    let requests = model_provider.received_requests();
    assert_eq!(requests.len(), 2);
    for req in &requests {
        assert_eq!(req.messages[0], ModelMessage::system("You are a calculator."));
        assert_eq!(req.tools.len(), 1);
        assert_eq!(req.tools[0].name, "add");
    }
    // The second request carries the tool result.
    assert_eq!(requests[1].messages.len(), 4);
}

#[tokio::test]
async fn test_multiple_tool_calls() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_response(PresetResponse::with_tool_calls([
        add_call("call_1", 1, 2),
        add_call("call_2", 10, 20),
    ]));
    model_provider.add_response(PresetResponse::with_content("3 and 30."));

    let agent = AgentBuilder::with_model_provider(model_provider)
        .with_tool(AddTool::new())
        .build()
        .unwrap();
    let conversation = agent.invoke("Two sums please").await.unwrap();

    let results: Vec<_> = conversation
        .items()
        .iter()
        .filter_map(|item| match item.message() {
            ModelMessage::Tool(result) => Some(result.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(results.len(), 2);
    assert_eq!((results[0].id.as_str(), results[0].content.as_str()), ("call_1", "3"));
    assert_eq!((results[1].id.as_str(), results[1].content.as_str()), ("call_2", "30"));
}

#[tokio::test]
async fn test_tool_errors_are_reported_to_model() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_response(PresetResponse::with_tool_calls([
        ToolCallRequest {
            id: "call_1".to_owned(),
            name: "get_weather".to_owned(),
            arguments: json!({ "city": "Paris" }),
        },
        ToolCallRequest {
            id: "call_2".to_owned(),
            name: "add".to_owned(),
            arguments: json!({ "a": "three" }),
        },
        add_call("call_3", i64::MAX, 1),
    ]));
    model_provider.add_response(PresetResponse::with_content("Sorry."));

    let agent = AgentBuilder::with_model_provider(model_provider)
        .with_tool(AddTool::new())
        .build()
        .unwrap();
    let conversation = agent.invoke("Break things").await.unwrap();

    let contents: Vec<_> = conversation
        .items()
        .iter()
        .filter(|item| matches!(item.message(), ModelMessage::Tool(_)))
        .map(|item| item.transcript().to_owned())
        .collect();
    assert_eq!(contents.len(), 3);
    assert_eq!(contents[0], "Tool error: no tool named `get_weather`");
    assert!(contents[1].starts_with("Tool error: "));
    assert_eq!(contents[2], "Tool error: overflow");
    assert_eq!(conversation.final_answer(), Some("Sorry."));
}

#[tokio::test]
async fn test_model_error() {
    // Nothing scripted, so the first request fails permanently.
    let agent = AgentBuilder::with_model_provider(TestModelProvider::default())
        .build()
        .unwrap();
    let err = agent.invoke("Hello").await.unwrap_err();
    assert!(matches!(err, GraphError::Node { ref node, .. } if node == "llm_call"));
}

#[tokio::test]
async fn test_transient_model_error_is_retried() {
    let mut model_provider = TestModelProvider::default();
    model_provider
        .add_response(PresetResponse::with_content("Finally.").with_failures(1));

    let agent = AgentBuilder::with_model_provider(model_provider)
        .with_retry_policy(RetryPolicy {
            initial_interval: Duration::from_millis(1),
            max_interval: Duration::from_millis(1),
            max_elapsed_time: Some(Duration::from_secs(5)),
        })
        .build()
        .unwrap();
    let conversation = agent.invoke("Hello").await.unwrap();
    assert_eq!(conversation.final_answer(), Some("Finally."));
}

#[tokio::test]
async fn test_recursion_limit() {
    let mut model_provider = TestModelProvider::default();
    for i in 0..10 {
        model_provider.add_response(PresetResponse::with_tool_calls([
            add_call(&format!("call_{i}"), i, i),
        ]));
    }

    let agent = AgentBuilder::with_model_provider(model_provider)
        .with_tool(AddTool::new())
        .with_recursion_limit(4)
        .build()
        .unwrap();
    let err = agent.invoke("Loop forever").await.unwrap_err();
    assert!(matches!(err, GraphError::RecursionLimit(4)));
}

#[tokio::test]
async fn test_continue_from_state() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_response(PresetResponse::with_content("Hello!"));
    model_provider.add_response(PresetResponse::with_content("Bye!"));

    let agent = AgentBuilder::with_model_provider(model_provider)
        .build()
        .unwrap();
    let state = agent
        .invoke_state(AgentState::new(vec![ModelMessage::user("Hi")]))
        .await
        .unwrap();

    let mut messages = state.into_messages();
    messages.push(ModelMessage::user("See you"));
    let state = agent.invoke_state(AgentState::new(messages)).await.unwrap();
    assert_eq!(state.messages().len(), 4);
}

#[test]
fn test_draw_mermaid() {
    let agent = AgentBuilder::with_model_provider(TestModelProvider::default())
        .build()
        .unwrap();
    let mermaid = agent.draw_mermaid();
    assert!(mermaid.contains("\t__start__ --> llm_call;\n"));
    assert!(mermaid.contains("\tllm_call -.-> tool_node;\n"));
    assert!(mermaid.contains("\ttool_node --> llm_call;\n"));
}
