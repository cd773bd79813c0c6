//! MCP (Model Context Protocol) server implementation
//!
//! JSON-RPC message types, the canned `hello` handler and the stdio loop.

pub mod handler;
pub mod protocol;
pub mod tools;

pub use handler::HelloHandler;
pub use protocol::{
    message_id, methods, InitializeResult, McpHandler, McpMethod, McpRequest, McpResponse,
    McpServer, ToolCallResult, PROTOCOL_VERSION,
};
pub use tools::{get_tool_definitions, ToolDefinition, HELLO_TEXT, TOOL_DEFINITIONS};
