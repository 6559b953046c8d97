//! `prime/is_prime`: trial-division primality check.

use async_trait::async_trait;
use rust_mcp_sdk::macros;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::domain::utils::parse_inputs;
use crate::registry::{ToolError, ToolHandler};

#[macros::mcp_tool(
    name = "prime/is_prime",
    description = "Check whether the given integer is a prime number"
)]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct IsPrimeTool {
    /// Integer to test
    pub number: i64,
}

pub fn is_prime(number: i64) -> bool {
    if number < 2 {
        return false;
    }

    let mut divisor: i64 = 2;
    while divisor <= number / divisor {
        if number % divisor == 0 {
            return false;
        }
        divisor += 1;
    }
    true
}

pub struct IsPrime;

#[async_trait]
impl ToolHandler for IsPrime {
    async fn call(&self, inputs: Map<String, Value>) -> Result<Value, ToolError> {
        let IsPrimeTool { number } = parse_inputs(inputs)?;
        let result = is_prime(number);
        info!(number, result, "prime check");
        Ok(json!({ "result": result }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_numbers() {
        let primes: Vec<i64> = (-3..30).filter(|n| is_prime(*n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn squares_of_primes_are_composite() {
        assert!(!is_prime(49));
        assert!(!is_prime(7919 * 7919));
        assert!(is_prime(7919));
    }

    #[tokio::test]
    async fn handler_wraps_result() {
        let inputs = json!({ "number": 19 }).as_object().cloned().expect("object");
        let result = IsPrime.call(inputs).await.expect("prime result");
        assert_eq!(result, json!({ "result": true }));
    }

    #[tokio::test]
    async fn handler_rejects_fractional_input() {
        let inputs = json!({ "number": 2.5 }).as_object().cloned().expect("object");
        let error = IsPrime.call(inputs).await.expect_err("fractional input");
        assert!(matches!(error, ToolError::InvalidInput(_)));
    }
}
