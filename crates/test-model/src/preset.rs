use agent_platform_model::ToolCallRequest;
use serde::{Deserialize, Serialize};

/// The preset reply for one assistant turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Text of the reply.
    #[serde(default)]
    pub content: String,
    /// Tool calls requested by the reply.
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRequest>,
    /// If set, the request will fail in the first `failures` attempts.
    /// `Some(0)` means the request will fail infinitely.
    #[serde(default)]
    pub failures: Option<u64>,
}

impl PresetResponse {
    /// Creates a text-only `PresetResponse`.
    #[inline]
    pub fn with_content<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Creates a `PresetResponse` that requests the given tool calls.
    #[inline]
    pub fn with_tool_calls(calls: impl Into<Vec<ToolCallRequest>>) -> Self {
        Self {
            tool_calls: calls.into(),
            ..Default::default()
        }
    }

    /// Sets failure times before a successful response. `0` means the
    /// response will always be a failure.
    #[inline]
    pub fn with_failures(mut self, failures: u64) -> Self {
        self.failures = Some(failures);
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_script_entry() {
        let preset: PresetResponse = serde_json::from_value(json!({
            "tool_calls": [{
                "id": "call_1",
                "name": "multiply",
                "arguments": { "a": 2, "b": 2 }
            }],
            "failures": 1
        }))
        .unwrap();

        assert_eq!(
            preset,
            PresetResponse::with_tool_calls([ToolCallRequest {
                id: "call_1".to_owned(),
                name: "multiply".to_owned(),
                arguments: json!({ "a": 2, "b": 2 }),
            }])
            .with_failures(1)
        );
    }
}
