//! The session registry: the Notifier side of the gateway.
//!
//! Every live WebSocket connection is one session, identified by a UUID
//! handle. Kiosks register their handle on the location record
//! (`socket_id`); visitor sessions are bound to a visitor id after login.
//! Delivery is best-effort throughout: a missing or stale handle is
//! silently dropped, never queued or retried.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};

use curio_core::types::{DbId, Timestamp};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type SessionSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket session.
pub struct Session {
    /// Bound visitor id, set after a successful login on this session.
    pub visitor_id: Option<DbId>,
    /// The session token the client attached (`addTokenToSocket`).
    pub token: Option<String>,
    /// Channel sender for outbound messages to this connection.
    pub sender: SessionSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Manages all active WebSocket sessions.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new session.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, session_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Session {
            visitor_id: None,
            token: None,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.sessions.write().await.insert(session_id, session);
        rx
    }

    /// Remove a session by its handle.
    pub async fn remove(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }

    /// Bind a visitor to a session after a successful login.
    pub async fn bind_visitor(&self, session_id: &str, visitor_id: DbId) {
        if let Some(session) = self.sessions.write().await.get_mut(session_id) {
            session.visitor_id = Some(visitor_id);
        }
    }

    /// Attach a session token (the client's `addTokenToSocket`).
    pub async fn set_token(&self, session_id: &str, token: String) {
        if let Some(session) = self.sessions.write().await.get_mut(session_id) {
            session.token = Some(token);
        }
    }

    pub async fn token_of(&self, session_id: &str) -> Option<String> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .and_then(|s| s.token.clone())
    }

    pub async fn visitor_of(&self, session_id: &str) -> Option<DbId> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .and_then(|s| s.visitor_id)
    }

    /// Push a named event to one session. Returns whether a live session
    /// accepted the frame; a missing or stale handle is not an error.
    pub async fn send_to_session<T: Serialize>(
        &self,
        session_id: &str,
        event: &str,
        payload: &T,
    ) -> bool {
        let Some(frame) = encode_frame(event, payload) else {
            return false;
        };
        let sessions = self.sessions.read().await;
        match sessions.get(session_id) {
            Some(session) => session.sender.send(frame).is_ok(),
            None => false,
        }
    }

    /// Push a named event to every session bound to a visitor.
    ///
    /// Returns the number of sessions the frame was sent to.
    pub async fn send_to_visitor<T: Serialize>(
        &self,
        visitor_id: DbId,
        event: &str,
        payload: &T,
    ) -> usize {
        let Some(frame) = encode_frame(event, payload) else {
            return 0;
        };
        let sessions = self.sessions.read().await;
        let mut count = 0;
        for session in sessions.values() {
            if session.visitor_id == Some(visitor_id) && session.sender.send(frame.clone()).is_ok()
            {
                count += 1;
            }
        }
        count
    }

    /// Return the current number of active sessions.
    pub async fn connection_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Send a Close frame to every session, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut sessions = self.sessions.write().await;
        let count = sessions.len();
        for session in sessions.values() {
            let _ = session.sender.send(Message::Close(None));
        }
        sessions.clear();
        tracing::info!(count, "Closed all WebSocket sessions");
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) -> usize {
        let sessions = self.sessions.read().await;
        for session in sessions.values() {
            let _ = session.sender.send(Message::Ping(Bytes::new()));
        }
        sessions.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize an outbound `{event, data}` frame. Serialization of our own
/// payload types cannot realistically fail; if it does, log and drop.
fn encode_frame<T: Serialize>(event: &str, payload: &T) -> Option<Message> {
    let body = serde_json::json!({
        "event": event,
        "data": serde_json::to_value(payload).ok()?,
    });
    match serde_json::to_string(&body) {
        Ok(text) => Some(Message::Text(text.into())),
        Err(e) => {
            tracing::error!(event, error = %e, "Failed to encode outbound frame");
            None
        }
    }
}
