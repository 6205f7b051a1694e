//! Caller-owned store of topic discussion sessions.
//!
//! A session is created when a topic discussion starts, collects the transcript,
//! and is removed when the note is saved or the caller clears it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use notecraft_shared::{Message, NotecraftError, Result, Role, SessionId};

/// One topic discussion in progress.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub topic: String,
    pub started_at: DateTime<Utc>,
    pub messages: Vec<Message>,
}

/// In-memory session registry. Not shared implicitly; pass it by reference.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<SessionId, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `topic`.
    pub fn start(&mut self, topic: &str) -> Result<SessionId> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(NotecraftError::validation("a topic name is required to start a session"));
        }

        let id = SessionId::new();
        self.sessions.insert(
            id,
            Session {
                id,
                topic: topic.to_string(),
                started_at: Utc::now(),
                messages: Vec::new(),
            },
        );
        debug!(%id, topic, "session started");
        Ok(id)
    }

    /// Append a message to a session's transcript.
    pub fn add_message(&mut self, id: SessionId, role: Role, content: impl Into<String>) -> Result<()> {
        let session = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| unknown_session(id))?;
        session.messages.push(Message::new(role, content));
        Ok(())
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Remove and return a session, typically once its note is saved.
    pub fn finish(&mut self, id: SessionId) -> Result<Session> {
        let session = self.sessions.remove(&id).ok_or_else(|| unknown_session(id))?;
        debug!(%id, messages = session.messages.len(), "session finished");
        Ok(session)
    }

    /// Drop a session without saving. Returns whether it existed.
    pub fn clear(&mut self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

fn unknown_session(id: SessionId) -> NotecraftError {
    NotecraftError::session(format!("no active session {id}"))
}
