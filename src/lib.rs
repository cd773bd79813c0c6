//! helloworld-mcp - minimal Model Context Protocol server
//!
//! Exposes a single `hello` tool over stdio, over HTTP with a session-bound
//! SSE push stream, and over a simple non-sessioned SSE transport.

pub mod config;
pub mod error;
pub mod mcp;
pub mod sse;

pub use config::ServerConfig;
pub use error::{HelloMcpError, Result};
