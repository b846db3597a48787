//! SSE module for MCP over Streamable HTTP
//!
//! Clients POST JSON-RPC requests and open a GET stream for
//! server-initiated messages. Every message sent on a session's stream
//! is appended to the event store first, so a client that reconnects
//! with a `Last-Event-ID` header resumes exactly where it left off.
//!
//! ## Endpoints
//! - `POST /mcp` - JSON-RPC requests from client to server
//! - `GET /mcp` - SSE stream for server to client messages (resumable)
//! - `DELETE /mcp` - Terminate a session
//! - `GET /mcp/info` - Server info and capabilities

pub mod handler;
pub mod session;

use tokio::sync::broadcast;

use crate::event_store::EventMessage;

/// Live events buffered per session before a slow stream lags
const SESSION_CHANNEL_CAPACITY: usize = 256;

/// One client session and its live event channel
#[derive(Debug, Clone)]
pub struct ClientSession {
    pub session_id: String,
    pub connected_at: i64,
    publisher: broadcast::Sender<EventMessage>,
}

impl ClientSession {
    pub(crate) fn new(session_id: String) -> Self {
        let (publisher, _) = broadcast::channel(SESSION_CHANNEL_CAPACITY);
        Self {
            session_id,
            connected_at: chrono::Utc::now().timestamp(),
            publisher,
        }
    }

    /// Push a live event to any open stream for this session
    ///
    /// A send error only means no stream is open right now; the event
    /// is already in the store, a later reconnect will replay it.
    pub fn publish(&self, event: EventMessage) {
        let _ = self.publisher.send(event);
    }

    /// Subscribe to live events for this session
    pub fn subscribe(&self) -> broadcast::Receiver<EventMessage> {
        self.publisher.subscribe()
    }
}
