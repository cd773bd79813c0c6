//! Error types for the hello-world MCP server

use thiserror::Error;

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, HelloMcpError>;

/// Main error type for the server
#[derive(Error, Debug)]
pub enum HelloMcpError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session limit reached ({0} open sessions)")]
    SessionLimit(usize),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Standard JSON-RPC error codes
pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INTERNAL_ERROR: i64 = -32603;
}

impl HelloMcpError {
    /// Get error code for MCP protocol
    ///
    /// Every failure that reaches a caller while producing a response is an
    /// internal error; malformed input is reported by the transports before
    /// a handler ever runs.
    pub fn code(&self) -> i64 {
        codes::INTERNAL_ERROR
    }
}
