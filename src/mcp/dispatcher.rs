//! Method routing for decoded request envelopes
//!
//! Resolves `initialize`, `tools/list` and `tools/call`, invokes tool handlers
//! from the registry, and wraps every outcome (including handler panics) into
//! a reply envelope.

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use futures_util::FutureExt;
use rust_mcp_sdk::schema::{
    Implementation, InitializeResult, ServerCapabilities, ServerCapabilitiesTools,
};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::errors::ProtocolError;
use crate::mcp::rpc::{RequestEnvelope, ResponseEnvelope};
use crate::registry::ToolRegistry;

pub const SUPPORTED_PROTOCOL_VERSION: &str = "2025-03-26";

#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Produces exactly one reply for `request`. Never panics outward: a panic
    /// while routing or inside a tool handler becomes an internal error.
    pub async fn dispatch(&self, request: RequestEnvelope) -> ResponseEnvelope {
        let RequestEnvelope {
            id, method, params, ..
        } = request;

        let audit_params = redact_audit_params(&params);
        info!(
            method = %method,
            params = %audit_params,
            "dispatching request"
        );

        let routed = AssertUnwindSafe(self.route(&method, params))
            .catch_unwind()
            .await;

        let response = match routed {
            Ok(Ok(result)) => ResponseEnvelope::result(id, result),
            Ok(Err(err)) => ResponseEnvelope::error(id, err),
            Err(panic) => ResponseEnvelope::error(
                id,
                ProtocolError::Internal(panic_message(panic.as_ref())),
            ),
        };

        match response.error_object() {
            Some(error) => warn!(
                method = %method,
                code = error.code,
                error = %error.message,
                "request failed"
            ),
            None => info!(method = %method, "request succeeded"),
        }
        debug!(method = %method, response = ?response.outcome, "request outcome");

        response
    }

    async fn route(&self, method: &str, params: Map<String, Value>) -> Result<Value, ProtocolError> {
        match method {
            "initialize" => initialize_result(),
            "tools/list" => Ok(json!({ "tools": self.registry.list() })),
            "tools/call" => self.call_tool(params).await,
            _ => Err(ProtocolError::MethodNotFound(method.to_string())),
        }
    }

    async fn call_tool(&self, mut params: Map<String, Value>) -> Result<Value, ProtocolError> {
        let tool_name = match params.get("toolName").and_then(Value::as_str) {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => {
                return Err(ProtocolError::InvalidParams(
                    "Missing required parameter: toolName".to_string(),
                ))
            }
        };

        let inputs = match params.remove("inputs") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(inputs)) => inputs,
            Some(_) => {
                return Err(ProtocolError::InvalidParams(
                    "Invalid parameter: inputs must be an object".to_string(),
                ))
            }
        };

        let descriptor = self
            .registry
            .lookup(&tool_name)
            .ok_or_else(|| ProtocolError::Tool(format!("Unknown tool: {tool_name}")))?;

        info!(tool = %tool_name, "invoking tool");
        descriptor
            .handler
            .call(inputs)
            .await
            .map_err(|err| ProtocolError::Tool(err.to_string()))
    }
}

pub fn initialize_result() -> Result<Value, ProtocolError> {
    let result = InitializeResult {
        server_info: Implementation {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: None,
            description: None,
            icons: vec![],
            website_url: None,
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools {
                list_changed: Some(false),
            }),
            ..Default::default()
        },
        protocol_version: SUPPORTED_PROTOCOL_VERSION.to_string(),
        instructions: None,
        meta: None,
    };

    serde_json::to_value(result).map_err(|err| ProtocolError::Internal(err.to_string()))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

pub fn redact_audit_params(params: &Map<String, Value>) -> Value {
    redact_audit_value(&Value::Object(params.clone()))
}

pub fn redact_audit_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    if is_sensitive_key(key) {
                        (key.clone(), Value::String("[REDACTED]".to_string()))
                    } else {
                        (key.clone(), redact_audit_value(item))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_audit_value).collect()),
        _ => value.clone(),
    }
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_ascii_lowercase();
    matches!(
        normalized.as_str(),
        "authorization" | "bearer" | "api_key" | "apikey"
    ) || normalized.contains("token")
        || normalized.contains("secret")
        || normalized.contains("password")
        || normalized.contains("credential")
}
