//! Per-conversation session state
//!
//! A session owns the ordered history of one conversation. History only grows
//! while the session lives; starting a chat again replaces the session with a
//! fresh one. Nothing is persisted.

use std::collections::HashMap;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::agent::Message;

/// One conversation
#[derive(Debug)]
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    history: Vec<Message>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Append a message to the history
    pub fn push(&mut self, message: Message) {
        self.history.push(message);
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// Shared handle to a session; the lock serializes turns within one chat
pub type SessionHandle = Arc<Mutex<Session>>;

/// In-memory map of live sessions keyed by session id
#[derive(Debug, Default, Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session, replacing any existing one with the same id
    pub async fn start(&self, id: &str) -> SessionHandle {
        let handle = Arc::new(Mutex::new(Session::new(id)));
        self.sessions.lock().await.insert(id.to_string(), handle.clone());
        tracing::debug!("Started session {}", id);
        handle
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.lock().await.get(id).cloned()
    }

    /// Existing session for `id`, or a newly started one
    pub async fn get_or_start(&self, id: &str) -> SessionHandle {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(id))))
            .clone()
    }

    /// End a session; its history is dropped
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.lock().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_appends_in_order() {
        let mut session = Session::new("cli:1");
        session.push(Message::user("Hi"));
        session.push(Message::assistant("Hello"));

        assert_eq!(session.id(), "cli:1");
        assert_eq!(session.len(), 2);
        assert_eq!(session.history()[0].content, "Hi");
        assert_eq!(session.history()[1].content, "Hello");
    }

    #[tokio::test]
    async fn test_get_or_start_reuses_session() {
        let store = SessionStore::new();
        let first = store.get_or_start("telegram:1").await;
        first.lock().await.push(Message::user("one"));

        let again = store.get_or_start("telegram:1").await;
        assert_eq!(again.lock().await.len(), 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_start_replaces_history() {
        let store = SessionStore::new();
        let old = store.start("cli:a").await;
        old.lock().await.push(Message::user("old"));

        let fresh = store.start("cli:a").await;
        assert!(fresh.lock().await.is_empty());
        assert!(store.get("cli:a").await.unwrap().lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        store.get_or_start("a").await.lock().await.push(Message::user("for a"));

        assert!(store.get_or_start("b").await.lock().await.is_empty());
        assert!(store.remove("a").await);
        assert!(store.get("a").await.is_none());
        assert!(!store.remove("a").await);
    }
}
