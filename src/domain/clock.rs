//! `datetime/now`: current local time rendered with a strftime pattern.

use async_trait::async_trait;
use chrono::{
    format::{Item, StrftimeItems},
    DateTime, Local, TimeZone,
};
use rust_mcp_sdk::macros;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::utils::parse_inputs;
use crate::registry::{ToolError, ToolHandler};

pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[macros::mcp_tool(name = "datetime/now", description = "Get current date and time")]
#[derive(Debug, Deserialize, Serialize, macros::JsonSchema)]
pub struct DatetimeNowTool {
    /// Output format (optional, strftime syntax)
    pub format: Option<String>,
}

/// Renders `moment` with `pattern`, rejecting patterns chrono cannot parse
/// instead of letting the formatter fail at display time.
pub fn format_datetime<Tz>(moment: &DateTime<Tz>, pattern: &str) -> Result<String, ToolError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(ToolError::rejected(format!(
            "Invalid datetime format: {pattern}"
        )));
    }

    Ok(moment.format_with_items(items.iter()).to_string())
}

pub struct CurrentDatetime;

#[async_trait]
impl ToolHandler for CurrentDatetime {
    async fn call(&self, inputs: Map<String, Value>) -> Result<Value, ToolError> {
        let DatetimeNowTool { format } = parse_inputs(inputs)?;
        let pattern = format.as_deref().unwrap_or(DEFAULT_DATETIME_FORMAT);
        let rendered = format_datetime(&Local::now(), pattern)?;
        Ok(json!({ "datetime": rendered }))
    }
}
