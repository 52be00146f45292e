use std::future::ready;

use agent_platform_core::tool::{Error as ToolError, Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

#[derive(Deserialize, JsonSchema)]
pub struct IntOperands {
    #[serde(deserialize_with = "whole_number")]
    #[schemars(with = "i64", description = "First integer.")]
    a: i64,
    #[serde(deserialize_with = "whole_number")]
    #[schemars(with = "i64", description = "Second integer.")]
    b: i64,
}

/// Accepts integers, and floats without a fractional part such as `3.0`.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let number = Number::deserialize(deserializer)?;
    if let Some(value) = number.as_i64() {
        return Ok(value);
    }
    match number.as_f64() {
        Some(value)
            if value.fract() == 0.0
                && value >= i64::MIN as f64
                && value < i64::MAX as f64 =>
        {
            Ok(value as i64)
        }
        _ => Err(D::Error::custom(format!("expected an integer, got {number}"))),
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct FloatOperands {
    #[schemars(description = "Dividend.")]
    a: f64,
    #[schemars(description = "Divisor, must not be zero.")]
    b: f64,
}

macro_rules! int_tool {
    ($(#[$meta:meta])* $ty:ident, $name:literal, $desc:literal, $op:ident) => {
        $(#[$meta])*
        pub struct $ty {
            parameter_schema: Value,
        }

        impl $ty {
            /// Creates the tool.
            #[inline]
            pub fn new() -> Self {
                Self {
                    parameter_schema: schema_for!(IntOperands).to_value(),
                }
            }
        }

        impl Default for $ty {
            #[inline]
            fn default() -> Self {
                Self::new()
            }
        }

        impl Tool for $ty {
            type Input = IntOperands;

            fn name(&self) -> &str {
                $name
            }

            fn description(&self) -> &str {
                $desc
            }

            fn parameter_schema(&self) -> &Value {
                &self.parameter_schema
            }

            fn execute(
                &self,
                input: IntOperands,
            ) -> impl Future<Output = ToolResult> + Send + 'static {
                let result = input
                    .a
                    .$op(input.b)
                    .map(|value| value.to_string())
                    .ok_or_else(|| {
                        ToolError::execution_error()
                            .with_reason("integer overflow")
                    });
                ready(result)
            }
        }
    };
}

int_tool!(
    /// Adds two integers.
    AddTool,
    "add",
    "Adds a and b.",
    checked_add
);

int_tool!(
    /// Multiplies two integers.
    MultiplyTool,
    "multiply",
    "Multiplies a and b.",
    checked_mul
);

/// Divides two numbers.
pub struct DivideTool {
    parameter_schema: Value,
}

impl DivideTool {
    /// Creates the tool.
    #[inline]
    pub fn new() -> Self {
        Self {
            parameter_schema: schema_for!(FloatOperands).to_value(),
        }
    }
}

impl Default for DivideTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for DivideTool {
    type Input = FloatOperands;

    fn name(&self) -> &str {
        "divide"
    }

    fn description(&self) -> &str {
        "Divides a by b."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: FloatOperands,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let result = if input.b == 0.0 {
            Err(ToolError::execution_error().with_reason("division by zero"))
        } else {
            Ok((input.a / input.b).to_string())
        };
        ready(result)
    }
}
