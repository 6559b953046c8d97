//! Input decoding shared by the built-in tools

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::registry::ToolError;

/// Decodes the `inputs` mapping of a `tools/call` into a typed argument set.
/// Missing or mistyped fields become a [`ToolError::InvalidInput`].
pub fn parse_inputs<T: DeserializeOwned>(inputs: Map<String, Value>) -> Result<T, ToolError> {
    Ok(serde_json::from_value(Value::Object(inputs))?)
}

#[cfg(test)]
mod tests {
    use super::parse_inputs;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Pair {
        a: i64,
        b: i64,
    }

    #[test]
    fn decodes_typed_inputs() {
        let inputs = json!({ "a": 1, "b": 2 }).as_object().cloned().expect("object");
        let pair: Pair = parse_inputs(inputs).expect("valid inputs");
        assert_eq!((pair.a, pair.b), (1, 2));
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let inputs = json!({ "a": 1 }).as_object().cloned().expect("object");
        let error = parse_inputs::<Pair>(inputs).expect_err("missing b");
        assert!(error.to_string().contains("missing field `b`"));
    }
}
