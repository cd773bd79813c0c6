//! Simple (non-sessioned) SSE server
//!
//! `GET /sse` only pushes an `initialized` notification and heartbeats;
//! `POST /sse` and `POST /message` answer in the HTTP response body.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use futures::{stream, Stream, StreamExt};
use serde_json::{json, Value};
use tokio::time::{interval_at, Instant};
use tokio_stream::wrappers::IntervalStream;
use tower_http::trace::TraceLayer;

use super::cors_layer;
use super::events::heartbeat_event;
use crate::config::ServerConfig;
use crate::error::codes;
use crate::mcp::{message_id, HelloHandler, McpHandler, McpResponse};

/// Shared state of the simple transport
#[derive(Clone)]
pub struct SimpleState {
    pub handler: Arc<dyn McpHandler>,
    pub config: Arc<ServerConfig>,
}

impl SimpleState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            handler: Arc::new(HelloHandler::from_config(&config)),
            config: Arc::new(config),
        }
    }
}

/// Simple SSE server
pub struct SimpleSseServer {
    state: SimpleState,
}

impl SimpleSseServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            state: SimpleState::new(config),
        }
    }

    /// Build the router
    pub fn router(state: SimpleState) -> Router {
        Router::new()
            .route("/sse", get(sse_handler).post(sse_post_handler))
            .route("/message", axum::routing::post(message_handler))
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

/// Push stream of one simple-transport connection; logs when dropped
struct ConnectionStream {
    events: Pin<Box<dyn Stream<Item = Event> + Send>>,
}

impl Stream for ConnectionStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.as_mut().poll_next(cx).map(|event| event.map(Ok))
    }
}

impl Drop for ConnectionStream {
    fn drop(&mut self) {
        tracing::info!("SSE connection closed");
    }
}

async fn health_handler(State(state): State<SimpleState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "server": state.config.server_name,
    }))
}

async fn sse_handler(State(state): State<SimpleState>) -> impl IntoResponse {
    tracing::info!("SSE connection opened");

    let delay = state.config.initialized_delay;
    let period = state.config.heartbeat_interval;

    let initialized = stream::once(async move {
        tokio::time::sleep(delay).await;
        let notification = json!({"jsonrpc": "2.0", "method": "initialized", "params": {}});
        Event::default().data(notification.to_string())
    });
    let heartbeats = IntervalStream::new(interval_at(Instant::now() + period, period))
        .map(|_| heartbeat_event());

    Sse::new(ConnectionStream {
        events: Box::pin(initialized.chain(heartbeats)),
    })
}

async fn sse_post_handler(State(state): State<SimpleState>, body: Bytes) -> Response {
    handle_post(&state, "POST /sse", &body)
}

async fn message_handler(State(state): State<SimpleState>, body: Bytes) -> Response {
    handle_post(&state, "POST /message", &body)
}

/// Answer a message synchronously in the HTTP response
fn handle_post(state: &SimpleState, endpoint: &str, body: &[u8]) -> Response {
    let message: Value = match serde_json::from_slice(body) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("{} parse error: {}", endpoint, e);
            return (StatusCode::BAD_REQUEST, Json(McpResponse::parse_error())).into_response();
        }
    };
    tracing::debug!("{} received: {}", endpoint, message);

    let id = message_id(&message);
    match state.handler.handle_message(message) {
        Ok(Some(response)) if response.error_code() == Some(codes::METHOD_NOT_FOUND) => {
            (StatusCode::BAD_REQUEST, Json(response)).into_response()
        }
        Ok(Some(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(None) => (StatusCode::OK, Json(json!({}))).into_response(),
        Err(e) => {
            tracing::error!("Error handling {}", endpoint);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(McpResponse::from_error(id, e)),
            )
                .into_response()
        }
    }
}
