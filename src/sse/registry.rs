//! Session channel registry
//!
//! Binds session ids to open push streams. The request channel is stateless,
//! so every response produced for a POST is routed back through here to the
//! stream that owns the session.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::Stream;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::events::SessionFrame;
use crate::config::ServerConfig;
use crate::error::{HelloMcpError, Result};
use crate::mcp::McpResponse;

/// Session ID
pub type SessionId = String;

/// A registered push stream
struct SessionEntry {
    sender: mpsc::UnboundedSender<SessionFrame>,
    created_at: DateTime<Utc>,
    heartbeat: JoinHandle<()>,
}

/// Owns the session id -> push stream mapping
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
    /// Responses that could not be delivered (unknown or closed session)
    undelivered: Arc<AtomicU64>,
    heartbeat_interval: Duration,
    max_sessions: usize,
    message_path: String,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            undelivered: Arc::new(AtomicU64::new(0)),
            heartbeat_interval: config.heartbeat_interval,
            max_sessions: config.max_sessions,
            message_path: config.message_path.clone(),
        }
    }

    /// Open a new session and return its push stream.
    ///
    /// The `endpoint` frame is queued before the session becomes visible, so
    /// it is always the first frame the peer reads. Must be called from
    /// within a tokio runtime.
    pub fn open(&self) -> Result<SessionStream> {
        let mut sessions = self.sessions.write();
        if sessions.len() >= self.max_sessions {
            return Err(HelloMcpError::SessionLimit(sessions.len()));
        }

        let mut id = Uuid::new_v4().to_string();
        while sessions.contains_key(&id) {
            id = Uuid::new_v4().to_string();
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        let endpoint = format!("{}?sessionId={}", self.message_path, id);
        sender
            .send(SessionFrame::Endpoint(endpoint))
            .map_err(|_| HelloMcpError::Internal("push channel closed on open".into()))?;

        let heartbeat = self.spawn_heartbeat(id.clone(), sender.clone());
        sessions.insert(
            id.clone(),
            SessionEntry {
                sender,
                created_at: Utc::now(),
                heartbeat,
            },
        );
        drop(sessions);

        tracing::info!("Session opened: {}", id);

        Ok(SessionStream {
            session_id: id,
            receiver,
            registry: self.clone(),
        })
    }

    /// Push a response down a session's stream.
    ///
    /// Returns `Ok(false)` when the session is unknown or its stream is gone;
    /// the drop is logged and counted, never surfaced to the caller.
    pub fn route(&self, session_id: &str, response: &McpResponse) -> Result<bool> {
        let json = serde_json::to_string(response)?;

        let sender = self
            .sessions
            .read()
            .get(session_id)
            .map(|entry| entry.sender.clone());

        let Some(sender) = sender else {
            self.undelivered.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                "Dropping response {:?} for unknown session {}",
                response.id,
                session_id
            );
            return Ok(false);
        };

        if sender.send(SessionFrame::Message(json)).is_err() {
            self.undelivered.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                "Dropping response {:?}, stream for session {} is gone",
                response.id,
                session_id
            );
            self.close(session_id);
            return Ok(false);
        }

        tracing::debug!("Routed response {:?} to session {}", response.id, session_id);
        Ok(true)
    }

    /// Remove a session and cancel its heartbeat. Idempotent.
    ///
    /// Returns whether a session was actually removed.
    pub fn close(&self, session_id: &str) -> bool {
        let entry = self.sessions.write().remove(session_id);
        match entry {
            Some(entry) => {
                entry.heartbeat.abort();
                let age = Utc::now() - entry.created_at;
                tracing::info!(
                    "Session closed: {} (open {}s)",
                    session_id,
                    age.num_seconds()
                );
                true
            }
            None => false,
        }
    }

    /// Number of open sessions
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Number of responses dropped because their session was unknown or closed
    pub fn undelivered_count(&self) -> u64 {
        self.undelivered.load(Ordering::Relaxed)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().contains_key(session_id)
    }

    /// Periodic keep-alive bound to the session's lifetime.
    ///
    /// A failed push means the stream is gone, which tears the session down.
    fn spawn_heartbeat(
        &self,
        session_id: SessionId,
        sender: mpsc::UnboundedSender<SessionFrame>,
    ) -> JoinHandle<()> {
        let registry = self.clone();
        let period = self.heartbeat_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // Skip the immediate first tick
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if sender.send(SessionFrame::Heartbeat).is_err() {
                    tracing::info!("Heartbeat failed for session {}", session_id);
                    registry.close(&session_id);
                    break;
                }
            }
        })
    }
}

/// Receiving end of a session's push stream.
///
/// Dropping it (peer disconnect, write error, shutdown) closes the session.
pub struct SessionStream {
    session_id: SessionId,
    receiver: mpsc::UnboundedReceiver<SessionFrame>,
    registry: SessionRegistry,
}

impl SessionStream {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Stream for SessionStream {
    type Item = SessionFrame;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for SessionStream {
    fn drop(&mut self) {
        self.registry.close(&self.session_id);
    }
}
