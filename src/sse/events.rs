//! Push-stream frame types

use axum::response::sse::Event;

/// Event name of the control frame announcing the request-channel URL
pub const ENDPOINT_EVENT: &str = "endpoint";

/// Event name of frames carrying JSON-RPC responses
pub const MESSAGE_EVENT: &str = "message";

/// Comment text of keep-alive frames
pub const HEARTBEAT_COMMENT: &str = "heartbeat";

/// A frame queued for delivery on a session's push stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionFrame {
    /// `event: endpoint` with the URL the peer must POST to
    Endpoint(String),
    /// `event: message` with an already serialized response
    Message(String),
    /// `: heartbeat` comment
    Heartbeat,
}

impl SessionFrame {
    /// Convert into an axum SSE event
    pub fn into_event(self) -> Event {
        match self {
            SessionFrame::Endpoint(url) => Event::default().event(ENDPOINT_EVENT).data(url),
            SessionFrame::Message(json) => Event::default().event(MESSAGE_EVENT).data(json),
            SessionFrame::Heartbeat => heartbeat_event(),
        }
    }
}

/// Inert comment frame used to keep idle connections open
pub fn heartbeat_event() -> Event {
    Event::default().comment(HEARTBEAT_COMMENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_kinds() {
        assert_ne!(
            SessionFrame::Message("{}".into()),
            SessionFrame::Endpoint("{}".into())
        );
    }
}
