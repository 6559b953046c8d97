//! In-memory tool table
//!
//! Maps tool names to their protocol descriptor and an executable handler.
//! Populated once at startup and shared read-only between connections.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use rust_mcp_sdk::schema::Tool;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] serde_json::Error),
    #[error("{0}")]
    Rejected(String),
}

impl ToolError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// A tool implementation. Handlers keep no mutable state, so calls from
/// different connections may overlap freely.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, inputs: Map<String, Value>) -> Result<Value, ToolError>;
}

#[derive(Clone)]
pub struct ToolDescriptor {
    pub tool: Tool,
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    pub fn name(&self) -> &str {
        &self.tool.name
    }
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a tool, or replaces an existing one with the same name while
    /// keeping its original position in [`ToolRegistry::list`].
    pub fn register(&mut self, tool: Tool, handler: impl ToolHandler + 'static) {
        let descriptor = ToolDescriptor {
            tool,
            handler: Arc::new(handler),
        };

        match self.index.get(descriptor.name()) {
            Some(&position) => self.tools[position] = descriptor,
            None => {
                self.index
                    .insert(descriptor.name().to_string(), self.tools.len());
                self.tools.push(descriptor);
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&position| &self.tools[position])
    }

    pub fn list(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|descriptor| descriptor.tool.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
