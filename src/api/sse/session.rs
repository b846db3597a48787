//! Session management for Streamable HTTP connections

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::ClientSession;

/// Session manager for tracking connected clients
pub struct SessionManager {
    sessions: RwLock<HashMap<String, ClientSession>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Generate a new session ID
    pub fn generate_session_id() -> String {
        format!("sess_{}", Uuid::new_v4().simple())
    }

    /// Create a new session and register it
    pub async fn create_session(&self) -> ClientSession {
        let session = ClientSession::new(Self::generate_session_id());
        self.sessions
            .write()
            .await
            .insert(session.session_id.clone(), session.clone());
        session
    }

    /// Remove a session
    pub async fn remove_session(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }

    /// Get session by ID
    pub async fn get_session(&self, session_id: &str) -> Option<ClientSession> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Get active session count
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::event_store::EventMessage;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let manager = SessionManager::new();

        // Create session
        let session = manager.create_session().await;
        assert!(session.session_id.starts_with("sess_"));

        // Get session
        let retrieved = manager.get_session(&session.session_id).await;
        assert!(retrieved.is_some());

        // Count
        assert_eq!(manager.session_count().await, 1);

        // Remove
        manager.remove_session(&session.session_id).await;
        assert_eq!(manager.session_count().await, 0);
        assert!(manager.get_session(&session.session_id).await.is_none());
    }

    #[tokio::test]
    async fn test_session_ids_are_unique() {
        let manager = SessionManager::new();
        let a = manager.create_session().await;
        let b = manager.create_session().await;
        assert_ne!(a.session_id, b.session_id);
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let manager = SessionManager::new();
        let session = manager.create_session().await;
        let mut receiver = session.subscribe();

        session.publish(EventMessage {
            event_id: "evt_1".to_string(),
            message: json!({"hello": "world"}),
        });

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event_id, "evt_1");
        assert_eq!(event.message["hello"], "world");
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_is_silent() {
        let manager = SessionManager::new();
        let session = manager.create_session().await;
        session.publish(EventMessage {
            event_id: "evt_1".to_string(),
            message: json!({}),
        });
    }
}
