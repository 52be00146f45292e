use std::future::ready;

use agent_platform_core::tool::{Error as ToolError, Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, JsonSchema)]
pub struct WeatherParameters {
    #[schemars(description = "Name of the city.")]
    city: String,
}

/// Reports the current weather of a city.
///
/// There is no weather service behind this tool, the report is made up.
pub struct WeatherTool {
    parameter_schema: Value,
}

impl WeatherTool {
    /// Creates the tool.
    #[inline]
    pub fn new() -> Self {
        Self {
            parameter_schema: schema_for!(WeatherParameters).to_value(),
        }
    }
}

impl Default for WeatherTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for WeatherTool {
    type Input = WeatherParameters;

    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Gets the current weather of a city."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: WeatherParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let city = input.city.trim();
        let result = if city.is_empty() {
            Err(ToolError::invalid_input().with_reason("`city` is empty"))
        } else {
            Ok(format!("It's always sunny in {city}!"))
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_weather() {
        let tool = WeatherTool::new();
        let report = tool
            .execute(WeatherParameters {
                city: "Paris".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(report, "It's always sunny in Paris!");

        let err = tool
            .execute(WeatherParameters {
                city: " ".to_owned(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "`city` is empty");
    }
}
