//! MCP over HTTP with Server-Sent Events
//!
//! Two transports: the sessioned one, where replies travel over the push
//! stream, and a simple one answering in the POST body.

mod events;
mod registry;
mod server;
mod simple;

use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

pub use events::{SessionFrame, ENDPOINT_EVENT, HEARTBEAT_COMMENT, MESSAGE_EVENT};
pub use registry::{SessionId, SessionRegistry, SessionStream};
pub use server::{SseServer, SseState};
pub use simple::{SimpleSseServer, SimpleState};

/// CORS policy shared by both HTTP transports
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::CACHE_CONTROL])
}
