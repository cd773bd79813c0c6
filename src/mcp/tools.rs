//! MCP tool definitions

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Text returned by every `hello` invocation
pub const HELLO_TEXT: &str = "Hello, World";

/// All tool definitions: (name, description, input schema)
pub const TOOL_DEFINITIONS: &[(&str, &str, &str)] = &[(
    "hello",
    "Returns a simple 'Hello, World' message",
    r#"{
        "type": "object",
        "properties": {},
        "required": []
    }"#,
)];

/// MCP tool definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Get all tool definitions as ToolDefinition structs
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    TOOL_DEFINITIONS
        .iter()
        .map(|(name, description, schema)| ToolDefinition {
            name: name.to_string(),
            description: description.to_string(),
            input_schema: serde_json::from_str(schema).unwrap_or(json!({})),
        })
        .collect()
}
