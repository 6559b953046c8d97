//! Arithmetic tools: `calculator/add`, `calculator/subtract`,
//! `calculator/multiply` and `calculator/divide`.

use async_trait::async_trait;
use rust_mcp_sdk::macros;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};
use tracing::{info, warn};

use crate::domain::utils::parse_inputs;
use crate::registry::{ToolError, ToolHandler};

#[macros::mcp_tool(name = "calculator/add", description = "Add two numbers together")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct AddTool {
    /// First number
    pub a: f64,
    /// Second number
    pub b: f64,
}

#[macros::mcp_tool(
    name = "calculator/subtract",
    description = "Subtract the second number from the first"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct SubtractTool {
    /// Number to subtract from
    pub a: f64,
    /// Number to subtract
    pub b: f64,
}

#[macros::mcp_tool(name = "calculator/multiply", description = "Multiply two numbers")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct MultiplyTool {
    /// First factor
    pub a: f64,
    /// Second factor
    pub b: f64,
}

#[macros::mcp_tool(
    name = "calculator/divide",
    description = "Divide the first number by the second"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct DivideTool {
    /// Dividend
    pub a: f64,
    /// Divisor, must not be zero
    pub b: f64,
}

/// Operands kept as raw JSON numbers so integer inputs can produce integer
/// results.
#[derive(Debug, Deserialize)]
struct Operands {
    a: Number,
    b: Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }

    /// Integer operands stay integral unless the result overflows `i64`.
    /// Division is always carried out in floating point.
    pub fn apply(self, a: &Number, b: &Number) -> Result<Number, ToolError> {
        if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
            let exact = match self {
                Self::Add => x.checked_add(y),
                Self::Subtract => x.checked_sub(y),
                Self::Multiply => x.checked_mul(y),
                Self::Divide => None,
            };
            if let Some(value) = exact {
                return Ok(Number::from(value));
            }
        }

        let x = as_float(a)?;
        let y = as_float(b)?;
        let value = match self {
            Self::Add => x + y,
            Self::Subtract => x - y,
            Self::Multiply => x * y,
            Self::Divide => {
                if y == 0.0 {
                    return Err(ToolError::rejected("Division by zero is not allowed"));
                }
                x / y
            }
        };

        Number::from_f64(value)
            .ok_or_else(|| ToolError::rejected("result is not a finite number"))
    }
}

fn as_float(number: &Number) -> Result<f64, ToolError> {
    number
        .as_f64()
        .ok_or_else(|| ToolError::rejected(format!("{number} is not representable as a float")))
}

pub struct Arithmetic {
    operation: Operation,
}

impl Arithmetic {
    pub fn new(operation: Operation) -> Self {
        Self { operation }
    }
}

#[async_trait]
impl ToolHandler for Arithmetic {
    async fn call(&self, inputs: Map<String, Value>) -> Result<Value, ToolError> {
        let Operands { a, b } = parse_inputs(inputs)?;
        info!(operation = self.operation.name(), a = %a, b = %b, "calculator invoked");

        match self.operation.apply(&a, &b) {
            Ok(result) => {
                info!(operation = self.operation.name(), result = %result, "calculator result");
                Ok(json!({ "result": result }))
            }
            Err(err) => {
                warn!(operation = self.operation.name(), error = %err, "calculator rejected input");
                Err(err)
            }
        }
    }
}
