//! In-memory session store.
//!
//! Holds one [`Session`] and keeps its transcript bounded: when an append
//! pushes the transcript past `max_messages`, the oldest entries are dropped
//! so exactly the most recent `max_messages` remain.

use relaychat_types::chat::{Message, MessageRole, Session, SessionId};
use tracing::debug;

/// Owns the transcript of one session. Never shared across sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    session: Session,
    max_messages: u32,
}

impl SessionStore {
    /// Create a store holding a fresh session.
    pub fn create(max_messages: u32) -> Self {
        Self {
            session: Session::new(),
            max_messages,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_id(&self) -> SessionId {
        self.session.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.session.messages
    }

    /// Total messages appended to this session, including truncated ones.
    pub fn message_count(&self) -> u32 {
        self.session.message_count
    }

    pub fn max_messages(&self) -> u32 {
        self.max_messages
    }

    /// Append a message and enforce the transcript bound.
    pub fn append_message(&mut self, role: MessageRole, content: impl Into<String>) {
        self.session.messages.push(Message::new(role, content));
        self.session.message_count = self.session.message_count.saturating_add(1);

        let max = self.max_messages as usize;
        let len = self.session.messages.len();
        if len > max {
            let overflow = len - max;
            self.session.messages.drain(..overflow);
            debug!(
                session_id = %self.session.id,
                dropped = overflow,
                "Transcript truncated to most recent messages"
            );
        }
    }

    /// Discard the transcript and identifier, starting a fresh session.
    pub fn reset(&mut self) -> &Session {
        self.session = Session::new();
        &self.session
    }
}
