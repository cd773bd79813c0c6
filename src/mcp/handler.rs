//! Canned request handler for the `hello` server

use serde_json::json;

use super::protocol::{
    InitializeResult, McpHandler, McpMethod, McpRequest, McpResponse, ToolCallResult,
};
use super::tools::{get_tool_definitions, HELLO_TEXT};
use crate::config::ServerConfig;
use crate::error::Result;

/// Static dispatch table shared by every transport
#[derive(Debug, Clone)]
pub struct HelloHandler {
    server_name: String,
    server_version: String,
}

impl HelloHandler {
    pub fn new(server_name: impl Into<String>, server_version: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            server_version: server_version.into(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(&config.server_name, &config.server_version)
    }
}

impl Default for HelloHandler {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default())
    }
}

impl McpHandler for HelloHandler {
    fn handle_request(&self, request: McpRequest) -> Result<Option<McpResponse>> {
        let method = McpMethod::from_request(&request);
        let id = request.id;

        if method.is_notification() {
            if method == McpMethod::Initialized {
                tracing::info!("Received initialized notification");
            } else {
                tracing::debug!("Received notification: {}", request.method);
            }
            return Ok(None);
        }

        let response = match method {
            McpMethod::Initialize => {
                let result = InitializeResult::new(&self.server_name, &self.server_version);
                McpResponse::success(id, serde_json::to_value(result)?)
            }
            McpMethod::ListTools => {
                let tools = get_tool_definitions();
                McpResponse::success(id, json!({ "tools": tools }))
            }
            McpMethod::CallTool { name, .. } => {
                tracing::debug!("Tool call: {}", name);
                let result = ToolCallResult::text(HELLO_TEXT);
                McpResponse::success(id, serde_json::to_value(result)?)
            }
            McpMethod::ListResources => McpResponse::success(id, json!({ "resources": [] })),
            McpMethod::ListPrompts => McpResponse::success(id, json!({ "prompts": [] })),
            McpMethod::Initialized | McpMethod::Notification(_) => return Ok(None),
            McpMethod::Unknown(name) => {
                tracing::warn!("Unknown method: {:?}", name);
                McpResponse::method_not_found(id)
            }
        };

        Ok(Some(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn reply(message: Value) -> Option<Value> {
        HelloHandler::new("test-server", "0.0.1")
            .respond(message)
            .map(|r| serde_json::to_value(r).unwrap())
    }

    #[test]
    fn test_initialize() {
        let response = reply(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"})).unwrap();
        assert_eq!(
            response,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {
                    "protocolVersion": "2024-11-05",
                    "capabilities": {"tools": {}},
                    "serverInfo": {"name": "test-server", "version": "0.0.1"}
                }
            })
        );
    }

    #[test]
    fn test_tools_list() {
        let response = reply(json!({"jsonrpc": "2.0", "id": "a", "method": "tools/list"})).unwrap();
        assert_eq!(response["id"], "a");
        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "hello");
        assert_eq!(
            tools[0]["description"],
            "Returns a simple 'Hello, World' message"
        );
    }

    #[test]
    fn test_tools_call_ignores_arguments() {
        for params in [
            json!({"name": "hello"}),
            json!({"name": "hello", "arguments": {"x": 1}}),
            json!({"name": "something-else"}),
        ] {
            let response = reply(json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "tools/call",
                "params": params
            }))
            .unwrap();
            assert_eq!(
                response["result"],
                json!({"content": [{"type": "text", "text": "Hello, World"}]})
            );
        }
    }

    #[test]
    fn test_optional_capabilities_are_empty() {
        let response = reply(json!({"jsonrpc": "2.0", "id": 4, "method": "resources/list"})).unwrap();
        assert_eq!(response["result"], json!({"resources": []}));

        let response = reply(json!({"jsonrpc": "2.0", "id": 5, "method": "prompts/list"})).unwrap();
        assert_eq!(response["result"], json!({"prompts": []}));
    }

    #[test]
    fn test_notifications_get_no_reply() {
        assert!(reply(json!({"jsonrpc": "2.0", "method": "notifications/initialized"})).is_none());
        assert!(reply(json!({"jsonrpc": "2.0", "method": "notifications/cancelled"})).is_none());
        // An id does not turn a notification into a request
        assert!(reply(json!({"jsonrpc": "2.0", "id": 1, "method": "notifications/progress"})).is_none());
    }

    #[test]
    fn test_unknown_method() {
        let response = reply(json!({"jsonrpc": "2.0", "id": 3, "method": "frobnicate"})).unwrap();
        assert_eq!(response["id"], 3);
        assert_eq!(response["error"]["code"], -32601);

        let response = reply(json!({"jsonrpc": "2.0", "method": "frobnicate"})).unwrap();
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["error"]["code"], -32601);
    }

    #[test]
    fn test_malformed_message_is_internal_error() {
        let response = reply(json!({"jsonrpc": "2.0", "id": 6, "method": 42})).unwrap();
        assert_eq!(response["id"], 6);
        assert_eq!(response["error"]["code"], -32603);
        assert_eq!(response["error"]["message"], "Internal error");

        let response = reply(json!("not an object")).unwrap();
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["error"]["code"], -32603);
    }
}
