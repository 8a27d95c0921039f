//! Per-user conversation registry for multi-user front ends.
//!
//! Each connected user gets a conversation handle (a UUID the front end keeps,
//! e.g. in a cookie). The handle survives resets; the session id inside does
//! not. Conversations never share transcript or in-flight state.
//!
//! Map guards are only held for the synchronous halves of a turn, never
//! across the webhook await, so a slow agent cannot block other users.
//!
//! Handles are unauthenticated, so a registry built with an idle TTL forgets
//! conversations nobody has touched for that long. Eviction runs on every
//! `create` and through [`ConversationRegistry::evict_idle`] for periodic
//! sweeps. A conversation with a reply in flight is never evicted.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use relaychat_types::chat::{Session, SessionId};
use relaychat_types::error::TurnRejected;

use crate::webhook::client::WebhookClient;

use super::controller::{ConversationController, TurnOutcome};
use super::conversation::{Conversation, ConversationState};

/// Errors from registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("conversation not found")]
    NotFound,

    #[error(transparent)]
    Rejected(#[from] TurnRejected),
}

/// Read-only view of a conversation for presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub conversation_id: Uuid,
    pub session: Session,
    pub state: ConversationState,
    pub limit_reached: bool,
    pub remaining_turns: u32,
    pub message_cap: u32,
}

impl ConversationSnapshot {
    fn of(conversation_id: Uuid, conversation: &Conversation) -> Self {
        Self {
            conversation_id,
            session: conversation.session().clone(),
            state: conversation.state(),
            limit_reached: conversation.is_limit_reached(),
            remaining_turns: conversation.remaining_turns(),
            message_cap: conversation.limit().message_cap(),
        }
    }
}

/// A registered conversation plus the last time anyone used it.
struct Tracked {
    conversation: Conversation,
    last_active: Instant,
}

impl Tracked {
    fn new(conversation: Conversation) -> Self {
        Self {
            conversation,
            last_active: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    fn is_idle(&self, ttl: Duration) -> bool {
        self.conversation.state() == ConversationState::AwaitingInput
            && self.last_active.elapsed() >= ttl
    }
}

/// Closes a turn with fallback text if the submit future is dropped while
/// the webhook call is in flight (client disconnect, proxy timeout).
struct InFlightTurn<'a> {
    conversations: &'a DashMap<Uuid, Tracked>,
    id: Uuid,
    session_id: SessionId,
    notice: &'a str,
    armed: bool,
}

impl InFlightTurn<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightTurn<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(mut tracked) = self.conversations.get_mut(&self.id) {
            if tracked.conversation.abandon_turn(self.session_id, self.notice) {
                tracked.touch();
                warn!(
                    conversation_id = %self.id,
                    session_id = %self.session_id,
                    "Turn abandoned before the reply arrived, recorded fallback text"
                );
            }
        }
    }
}

/// DashMap-backed store of conversations keyed by handle.
#[derive(Default)]
pub struct ConversationRegistry {
    conversations: DashMap<Uuid, Tracked>,
    idle_ttl: Option<Duration>,
}

impl ConversationRegistry {
    /// A registry that keeps conversations until they are removed.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that forgets conversations idle for longer than `ttl`.
    pub fn with_idle_ttl(ttl: Duration) -> Self {
        Self {
            conversations: DashMap::new(),
            idle_ttl: Some(ttl),
        }
    }

    pub fn idle_ttl(&self) -> Option<Duration> {
        self.idle_ttl
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Register a fresh conversation and return its snapshot.
    pub fn create<W: WebhookClient>(
        &self,
        controller: &ConversationController<W>,
    ) -> ConversationSnapshot {
        self.evict_idle();

        let id = Uuid::now_v7();
        let conversation = controller.start_conversation();
        let snapshot = ConversationSnapshot::of(id, &conversation);
        self.conversations.insert(id, Tracked::new(conversation));
        info!(conversation_id = %id, session_id = %snapshot.session.id, "Conversation created");
        snapshot
    }

    /// Drop conversations idle for longer than the TTL. Returns how many went.
    pub fn evict_idle(&self) -> usize {
        let Some(ttl) = self.idle_ttl else {
            return 0;
        };

        let before = self.conversations.len();
        self.conversations.retain(|_, tracked| !tracked.is_idle(ttl));
        let evicted = before.saturating_sub(self.conversations.len());
        if evicted > 0 {
            debug!(evicted, ttl_secs = ttl.as_secs(), "Evicted idle conversations");
        }
        evicted
    }

    /// Snapshot of one conversation. Counts as activity.
    pub fn snapshot(&self, id: &Uuid) -> Option<ConversationSnapshot> {
        self.conversations.get_mut(id).map(|mut tracked| {
            tracked.touch();
            ConversationSnapshot::of(*id, &tracked.conversation)
        })
    }

    /// Run one turn on a registered conversation.
    ///
    /// The user message is recorded and the conversation marked as awaiting a
    /// reply before the webhook is called, so a concurrent submit for the
    /// same handle is rejected with `AwaitingReply`. If this future is
    /// dropped mid-call the turn is closed with the error fallback text.
    pub async fn submit<W: WebhookClient>(
        &self,
        controller: &ConversationController<W>,
        id: &Uuid,
        user_input: impl Into<String>,
    ) -> Result<TurnOutcome, RegistryError> {
        let turn = {
            let mut tracked = self.conversations.get_mut(id).ok_or(RegistryError::NotFound)?;
            tracked.touch();
            tracked.conversation.begin_turn(user_input)?
        };

        let in_flight = InFlightTurn {
            conversations: &self.conversations,
            id: *id,
            session_id: turn.session_id(),
            notice: &controller.fallback().error,
            armed: true,
        };
        let reply = controller.relay(&turn).await;
        in_flight.disarm();

        let mut tracked = self.conversations.get_mut(id).ok_or(RegistryError::NotFound)?;
        tracked.touch();
        let recorded = tracked.conversation.complete_turn(turn, reply.text.clone());
        if !recorded {
            debug!(conversation_id = %id, "Discarded reply for a session reset mid-turn");
        }

        Ok(TurnOutcome {
            reply,
            limit_reached: tracked.conversation.is_limit_reached(),
            discarded: !recorded,
        })
    }

    /// Reset a conversation to a fresh session.
    pub fn reset<W: WebhookClient>(
        &self,
        controller: &ConversationController<W>,
        id: &Uuid,
    ) -> Result<ConversationSnapshot, RegistryError> {
        let mut tracked = self.conversations.get_mut(id).ok_or(RegistryError::NotFound)?;
        tracked.touch();
        controller.reset(&mut tracked.conversation);
        Ok(ConversationSnapshot::of(*id, &tracked.conversation))
    }

    /// Forget a conversation. Returns false if it was not registered.
    pub fn remove(&self, id: &Uuid) -> bool {
        self.conversations.remove(id).is_some()
    }
}
