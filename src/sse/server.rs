//! Sessioned SSE server
//!
//! `GET /sse` opens a push stream bound to a fresh session id,
//! `POST /message?sessionId=...` accepts one JSON-RPC message per call and
//! answers on that session's push stream.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{sse::Sse, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use super::cors_layer;
use super::registry::SessionRegistry;
use crate::config::ServerConfig;
use crate::error::HelloMcpError;
use crate::mcp::{message_id, HelloHandler, McpHandler, McpResponse};

/// Shared state of the sessioned transport
#[derive(Clone)]
pub struct SseState {
    pub registry: SessionRegistry,
    pub handler: Arc<dyn McpHandler>,
    pub config: Arc<ServerConfig>,
}

impl SseState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            registry: SessionRegistry::new(&config),
            handler: Arc::new(HelloHandler::from_config(&config)),
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Sessioned SSE server
pub struct SseServer {
    state: SseState,
}

impl SseServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            state: SseState::new(config),
        }
    }

    /// Build the router
    pub fn router(state: SseState) -> Router {
        let message_path = state.config.message_path.clone();
        Router::new()
            .route("/sse", get(sse_handler))
            .route(&message_path, post(message_handler))
            .route("/health", get(health_handler))
            .layer(cors_layer())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Start the server
    pub async fn start(self) -> std::io::Result<()> {
        let addr = self.state.config.socket_addr();
        let app = Self::router(self.state);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Remote MCP server listening on {}", addr);
        tracing::info!("Health check: http://{}/health", addr);
        tracing::info!("SSE endpoint: http://{}/sse", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Health check endpoint
async fn health_handler(State(state): State<SseState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "server": state.config.server_name,
        "sessions": state.registry.session_count(),
    }))
}

/// Open a push stream for a new session
async fn sse_handler(State(state): State<SseState>) -> Response {
    match state.registry.open() {
        Ok(stream) => {
            tracing::debug!("SSE stream attached to session {}", stream.session_id());
            let events = stream.map(|frame| Ok::<_, Infallible>(frame.into_event()));
            Sse::new(events).into_response()
        }
        Err(HelloMcpError::SessionLimit(open)) => {
            tracing::warn!("Rejecting SSE connection, {} sessions open", open);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"error": "Too many sessions"})),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to open session: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal error"})),
            )
                .into_response()
        }
    }
}

/// Accept one message; the reply, if any, goes out on the session's stream
async fn message_handler(
    State(state): State<SseState>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> Response {
    let Some(session_id) = query.session_id.filter(|id| !id.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing sessionId parameter"})),
        )
            .into_response();
    };

    let message: Value = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Parse error for session {}: {}", session_id, e);
            return (StatusCode::BAD_REQUEST, Json(McpResponse::parse_error())).into_response();
        }
    };
    tracing::debug!(
        "POST {} [{}] received: {}",
        state.config.message_path,
        session_id,
        message
    );

    let id = message_id(&message);
    let routed = state
        .handler
        .handle_message(message)
        .and_then(|response| match response {
            Some(response) => state.registry.route(&session_id, &response).map(|_| ()),
            None => Ok(()),
        });

    match routed {
        Ok(()) => (StatusCode::ACCEPTED, Json(json!({}))).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(McpResponse::from_error(id, e)),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_shares_registry() {
        let state = SseState::new(ServerConfig::default());
        let clone = state.clone();
        let stream = state.registry.open().unwrap();
        assert!(clone.registry.contains(stream.session_id()));
    }
}
