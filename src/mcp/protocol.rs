//! MCP JSON-RPC protocol implementation

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};

use crate::error::{codes, HelloMcpError, Result};

/// MCP JSON-RPC request or notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    /// Missing methods deserialize as empty and dispatch as unknown
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// MCP JSON-RPC response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    /// Always serialized; `null` when the request carried no id
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

/// MCP error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl McpResponse {
    /// Create a success response
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Option<Value>, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(McpError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Create a `-32601 Method not found` response
    pub fn method_not_found(id: Option<Value>) -> Self {
        Self::error(id, codes::METHOD_NOT_FOUND, "Method not found")
    }

    /// Create a `-32700 Parse error` response
    pub fn parse_error() -> Self {
        Self::error(None, codes::PARSE_ERROR, "Parse error")
    }

    /// Create error from HelloMcpError
    ///
    /// The detail goes to the log, the caller only sees the generic message.
    pub fn from_error(id: Option<Value>, err: HelloMcpError) -> Self {
        tracing::error!("Error producing response: {}", err);
        Self::error(id, err.code(), "Internal error")
    }

    /// Error code, if this is an error response
    pub fn error_code(&self) -> Option<i64> {
        self.error.as_ref().map(|e| e.code)
    }
}

/// Extract the `id` of a raw message, if it has one
pub fn message_id(message: &Value) -> Option<Value> {
    message.get("id").filter(|id| !id.is_null()).cloned()
}

/// Standard MCP methods
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const LIST_TOOLS: &str = "tools/list";
    pub const CALL_TOOL: &str = "tools/call";
    pub const LIST_RESOURCES: &str = "resources/list";
    pub const LIST_PROMPTS: &str = "prompts/list";
    pub const NOTIFICATION_PREFIX: &str = "notifications/";
}

/// A recognised request method with the parameters it needs
#[derive(Debug, Clone, PartialEq)]
pub enum McpMethod {
    Initialize,
    Initialized,
    ListTools,
    CallTool { name: String, arguments: Value },
    ListResources,
    ListPrompts,
    /// Any other `notifications/*` method
    Notification(String),
    Unknown(String),
}

impl McpMethod {
    /// Classify a request by its method name
    pub fn from_request(request: &McpRequest) -> Self {
        match request.method.as_str() {
            methods::INITIALIZE => McpMethod::Initialize,
            methods::INITIALIZED => McpMethod::Initialized,
            methods::LIST_TOOLS => McpMethod::ListTools,
            methods::CALL_TOOL => McpMethod::CallTool {
                name: request
                    .params
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
                arguments: request
                    .params
                    .get("arguments")
                    .cloned()
                    .unwrap_or(Value::Object(Default::default())),
            },
            methods::LIST_RESOURCES => McpMethod::ListResources,
            methods::LIST_PROMPTS => McpMethod::ListPrompts,
            other if other.starts_with(methods::NOTIFICATION_PREFIX) => {
                McpMethod::Notification(other.to_string())
            }
            other => McpMethod::Unknown(other.to_string()),
        }
    }

    /// Notifications never receive a reply
    pub fn is_notification(&self) -> bool {
        matches!(self, McpMethod::Initialized | McpMethod::Notification(_))
    }
}

/// Trait for handling MCP requests
pub trait McpHandler: Send + Sync {
    /// Produce the reply for a request, or `None` for notifications
    fn handle_request(&self, request: McpRequest) -> Result<Option<McpResponse>>;

    /// Handle a raw JSON message
    fn handle_message(&self, message: Value) -> Result<Option<McpResponse>> {
        let request: McpRequest = serde_json::from_value(message)?;
        self.handle_request(request)
    }

    /// Handle a raw JSON message, turning failures into `-32603` replies
    fn respond(&self, message: Value) -> Option<McpResponse> {
        let id = message_id(&message);
        match self.handle_message(message) {
            Ok(response) => response,
            Err(e) => Some(McpResponse::from_error(id, e)),
        }
    }
}

/// MCP Server handling stdio communication
pub struct McpServer<H>
where
    H: McpHandler,
{
    handler: H,
}

impl<H: McpHandler> McpServer<H> {
    /// Create a new MCP server
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    /// Run the server, reading from stdin and writing to stdout
    pub fn run(&self) -> Result<()> {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.serve(BufReader::new(stdin.lock()), stdout.lock())
    }

    /// Serve newline-delimited messages from `reader` until EOF
    pub fn serve<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> Result<()> {
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) => break, // EOF
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let response = match serde_json::from_str::<Value>(trimmed) {
                        Ok(message) => {
                            tracing::debug!("stdio received: {}", trimmed);
                            self.handler.respond(message)
                        }
                        Err(e) => {
                            tracing::warn!("Parse error on stdin: {}", e);
                            Some(McpResponse::parse_error())
                        }
                    };

                    if let Some(response) = response {
                        let response_json = serde_json::to_string(&response)?;
                        writeln!(writer, "{}", response_json)?;
                        writer.flush()?;
                    }
                }
                Err(e) => {
                    tracing::error!("Error reading stdin: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }
}

/// MCP initialize result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

/// Server capabilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub tools: ToolsCapability,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsCapability {
    #[serde(rename = "listChanged", skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Server info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Protocol revision this server speaks
pub const PROTOCOL_VERSION: &str = "2024-11-05";

impl InitializeResult {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
        }
    }
}

/// Tool call result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolCallResult {
    /// Create a text result
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: None,
        }
    }
}
