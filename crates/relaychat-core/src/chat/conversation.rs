//! Turn-taking state machine for one conversation.
//!
//! A [`Conversation`] is either waiting for user input or waiting for the
//! webhook's reply. A turn is split into [`Conversation::begin_turn`] and
//! [`Conversation::complete_turn`] so callers can release any lock on the
//! conversation while the webhook call is in flight; the `AwaitingReply`
//! state is what keeps a second turn from starting in the meantime.

use serde::{Deserialize, Serialize};

use relaychat_types::chat::{MessageRole, Session, SessionId};
use relaychat_types::config::MessageLimit;
use relaychat_types::error::TurnRejected;

use std::fmt;

use super::store::SessionStore;

/// Where a conversation is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    AwaitingInput,
    AwaitingReply,
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationState::AwaitingInput => write!(f, "awaiting_input"),
            ConversationState::AwaitingReply => write!(f, "awaiting_reply"),
        }
    }
}

/// Proof that a turn was started. Consumed by `complete_turn`.
#[derive(Debug)]
pub struct PendingTurn {
    session_id: SessionId,
    input: String,
}

impl PendingTurn {
    /// Session the turn was started in.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// The user text to relay.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// One user's conversation: a session store plus the turn state.
#[derive(Debug, Clone)]
pub struct Conversation {
    store: SessionStore,
    state: ConversationState,
    limit: MessageLimit,
}

impl Conversation {
    /// Start a conversation with a fresh session, awaiting input.
    pub fn new(limit: MessageLimit) -> Self {
        Self {
            store: SessionStore::create(limit.message_cap()),
            state: ConversationState::AwaitingInput,
            limit,
        }
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn session(&self) -> &Session {
        self.store.session()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn limit(&self) -> MessageLimit {
        self.limit
    }

    /// True once the cap leaves no room for another full turn.
    pub fn is_limit_reached(&self) -> bool {
        !self.limit.has_room_for_turn(self.store.message_count())
    }

    pub fn remaining_turns(&self) -> u32 {
        self.limit.remaining_turns(self.store.message_count())
    }

    /// Start a turn: record the user message and wait for the reply.
    ///
    /// Rejected without side effects while a reply is pending, when the
    /// input is blank, or when the cap has no room for another turn.
    pub fn begin_turn(&mut self, input: impl Into<String>) -> Result<PendingTurn, TurnRejected> {
        if self.state == ConversationState::AwaitingReply {
            return Err(TurnRejected::AwaitingReply);
        }

        let input = input.into();
        if input.trim().is_empty() {
            return Err(TurnRejected::EmptyInput);
        }

        if self.is_limit_reached() {
            return Err(TurnRejected::LimitReached {
                cap: self.limit.message_cap(),
            });
        }

        self.store.append_message(MessageRole::User, input.clone());
        self.state = ConversationState::AwaitingReply;

        Ok(PendingTurn {
            session_id: self.store.session_id(),
            input,
        })
    }

    /// Finish a turn by recording the assistant text.
    ///
    /// Returns `false` and records nothing if the conversation was reset
    /// after the turn began.
    pub fn complete_turn(&mut self, turn: PendingTurn, reply_text: impl Into<String>) -> bool {
        self.finish_turn(turn.session_id, reply_text)
    }

    /// Close a turn whose reply will never arrive, recording `notice` as the
    /// assistant text.
    ///
    /// Used when the caller driving the turn goes away mid-call. Same
    /// session check as [`complete_turn`](Self::complete_turn).
    pub fn abandon_turn(&mut self, session_id: SessionId, notice: impl Into<String>) -> bool {
        self.finish_turn(session_id, notice)
    }

    fn finish_turn(&mut self, session_id: SessionId, text: impl Into<String>) -> bool {
        if session_id != self.store.session_id() || self.state != ConversationState::AwaitingReply {
            return false;
        }

        self.store.append_message(MessageRole::Assistant, text);
        self.state = ConversationState::AwaitingInput;
        true
    }

    /// Drop the session and start over. Valid in any state.
    pub fn reset(&mut self) {
        self.store.reset();
        self.state = ConversationState::AwaitingInput;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaychat_types::config::CapUnit;

    fn conversation(max: u32, unit: CapUnit) -> Conversation {
        Conversation::new(MessageLimit::new(max, unit))
    }

    #[test]
    fn test_new_conversation_awaits_input() {
        let conv = conversation(10, CapUnit::Messages);
        assert_eq!(conv.state(), ConversationState::AwaitingInput);
        assert!(conv.session().messages.is_empty());
        assert!(!conv.is_limit_reached());
    }

    #[test]
    fn test_begin_turn_appends_user_message() {
        let mut conv = conversation(10, CapUnit::Messages);
        let turn = conv.begin_turn("hello").unwrap();

        assert_eq!(turn.input(), "hello");
        assert_eq!(turn.session_id(), conv.session().id);
        assert_eq!(conv.state(), ConversationState::AwaitingReply);
        assert_eq!(conv.session().messages.len(), 1);
        assert_eq!(conv.session().messages[0].role, MessageRole::User);
    }

    #[test]
    fn test_second_begin_while_awaiting_reply_is_rejected() {
        let mut conv = conversation(10, CapUnit::Messages);
        let _turn = conv.begin_turn("first").unwrap();

        let err = conv.begin_turn("second").unwrap_err();
        assert_eq!(err, TurnRejected::AwaitingReply);
        assert_eq!(conv.session().messages.len(), 1);
    }

    #[test]
    fn test_complete_turn_returns_to_awaiting_input() {
        let mut conv = conversation(10, CapUnit::Messages);
        let turn = conv.begin_turn("hello").unwrap();

        assert!(conv.complete_turn(turn, "X"));
        assert_eq!(conv.state(), ConversationState::AwaitingInput);

        let messages = &conv.session().messages;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, "X");
    }

    #[test]
    fn test_blank_input_is_rejected() {
        let mut conv = conversation(10, CapUnit::Messages);
        assert_eq!(conv.begin_turn("   ").unwrap_err(), TurnRejected::EmptyInput);
        assert_eq!(conv.state(), ConversationState::AwaitingInput);
        assert!(conv.session().messages.is_empty());
    }

    #[test]
    fn test_limit_in_messages() {
        let mut conv = conversation(4, CapUnit::Messages);
        for i in 0..2 {
            let turn = conv.begin_turn(format!("q{i}")).unwrap();
            conv.complete_turn(turn, format!("a{i}"));
        }

        assert!(conv.is_limit_reached());
        assert_eq!(conv.remaining_turns(), 0);
        let err = conv.begin_turn("one more").unwrap_err();
        assert_eq!(err, TurnRejected::LimitReached { cap: 4 });
        assert_eq!(conv.session().message_count, 4);
        assert_eq!(conv.state(), ConversationState::AwaitingInput);
    }

    #[test]
    fn test_limit_in_turns() {
        let mut conv = conversation(2, CapUnit::Turns);
        for i in 0..2 {
            let turn = conv.begin_turn(format!("listing {i}")).unwrap();
            conv.complete_turn(turn, "analysis");
        }
        assert!(conv.is_limit_reached());
        assert!(matches!(
            conv.begin_turn("third listing"),
            Err(TurnRejected::LimitReached { cap: 4 })
        ));
    }

    #[test]
    fn test_reset_from_awaiting_reply() {
        let mut conv = conversation(10, CapUnit::Messages);
        let old_id = conv.session().id;
        let _turn = conv.begin_turn("hello").unwrap();

        conv.reset();

        assert_eq!(conv.state(), ConversationState::AwaitingInput);
        assert!(conv.session().messages.is_empty());
        assert_ne!(conv.session().id, old_id);
    }

    #[test]
    fn test_reply_for_reset_session_is_discarded() {
        let mut conv = conversation(10, CapUnit::Messages);
        let stale = conv.begin_turn("before reset").unwrap();
        conv.reset();
        let fresh = conv.begin_turn("after reset").unwrap();

        assert!(!conv.complete_turn(stale, "late reply"));
        assert_eq!(conv.state(), ConversationState::AwaitingReply);
        assert_eq!(conv.session().messages.len(), 1);

        assert!(conv.complete_turn(fresh, "fresh reply"));
        assert_eq!(conv.session().messages[1].content, "fresh reply");
    }

    #[test]
    fn test_abandon_turn_returns_to_awaiting_input() {
        let mut conv = conversation(10, CapUnit::Messages);
        let turn = conv.begin_turn("hello").unwrap();

        assert!(conv.abandon_turn(turn.session_id(), "interrupted"));
        assert_eq!(conv.state(), ConversationState::AwaitingInput);
        assert_eq!(conv.session().messages[1].content, "interrupted");

        // Nothing left to close.
        assert!(!conv.abandon_turn(turn.session_id(), "again"));
        assert_eq!(conv.session().messages.len(), 2);
    }

    #[test]
    fn test_reset_restores_room_after_limit() {
        let mut conv = conversation(2, CapUnit::Messages);
        let turn = conv.begin_turn("q").unwrap();
        conv.complete_turn(turn, "a");
        assert!(conv.is_limit_reached());

        conv.reset();
        assert!(!conv.is_limit_reached());
        assert!(conv.begin_turn("again").is_ok());
    }
}
