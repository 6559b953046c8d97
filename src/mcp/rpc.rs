//! JSON-RPC envelopes and request shape validation
//!
//! Request parsing is two-staged: the framer decodes raw JSON, then
//! [`parse_request`] checks the envelope shape so that a malformed element of
//! a batch turns into its own error reply instead of failing the batch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ProtocolError;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RequestEnvelope {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<i64>,
    pub method: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl RequestEnvelope {
    pub fn new(id: Option<i64>, method: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
}

impl From<ProtocolError> for ErrorObject {
    fn from(error: ProtocolError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome {
    #[serde(rename = "result")]
    Result(Value),
    #[serde(rename = "error")]
    Error(ErrorObject),
}

/// One reply. `id` is always present on the wire, `null` when the request
/// carried none or could not be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub jsonrpc: &'static str,
    pub id: Option<i64>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ResponseEnvelope {
    pub fn result(id: Option<i64>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Result(result),
        }
    }

    pub fn error(id: Option<i64>, error: ProtocolError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Error(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }

    pub fn error_object(&self) -> Option<&ErrorObject> {
        match &self.outcome {
            Outcome::Error(error) => Some(error),
            Outcome::Result(_) => None,
        }
    }
}

/// Validates a decoded JSON value against the request envelope shape. On
/// failure the returned reply echoes the id whenever it is an integer.
pub fn parse_request(payload: Value) -> Result<RequestEnvelope, ResponseEnvelope> {
    let echoed_id = payload.get("id").and_then(Value::as_i64);

    if !payload.is_object() {
        return Err(ResponseEnvelope::error(None, ProtocolError::InvalidRequest));
    }

    let request: RequestEnvelope = serde_json::from_value(payload)
        .map_err(|_| ResponseEnvelope::error(echoed_id, ProtocolError::InvalidRequest))?;

    if request.jsonrpc != JSONRPC_VERSION || request.method.trim().is_empty() {
        return Err(ResponseEnvelope::error(
            request.id,
            ProtocolError::InvalidRequest,
        ));
    }

    Ok(request)
}
