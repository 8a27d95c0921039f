//! Conversation controller: drives one turn through the webhook.
//!
//! The controller is framework-agnostic. Presentation layers own the
//! [`Conversation`] values (one per user) and pass them in; the controller
//! holds only the read-only pieces: the webhook client, the message cap, and
//! the fallback texts.
//!
//! Every webhook failure is absorbed here and turned into fallback text, so
//! a completed turn always ends with an assistant message.

use std::time::Instant;

use serde::Serialize;
use tracing::{Instrument, info, info_span, warn};

use relaychat_types::config::{FallbackMessages, MessageLimit};
use relaychat_types::error::{TurnRejected, WebhookError};
use relaychat_types::webhook::ReplyFailure;

use crate::webhook::client::WebhookClient;

use super::conversation::{Conversation, PendingTurn};

/// The assistant text produced for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReply {
    pub text: String,
    /// Set when `text` is fallback text rather than the agent's answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ReplyFailure>,
}

impl TurnReply {
    pub fn is_fallback(&self) -> bool {
        self.failure.is_some()
    }
}

/// Result of a completed `submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnOutcome {
    pub reply: TurnReply,
    /// Whether this turn used up the last of the cap.
    pub limit_reached: bool,
    /// The session was reset while the webhook was working; `reply` was not
    /// recorded and belongs to a session that no longer exists.
    pub discarded: bool,
}

/// Orchestrates turns for any number of independently owned conversations.
///
/// Generic over `WebhookClient` so tests can substitute an in-process agent.
pub struct ConversationController<W: WebhookClient> {
    client: W,
    limit: MessageLimit,
    fallback: FallbackMessages,
}

impl<W: WebhookClient> ConversationController<W> {
    pub fn new(client: W, limit: MessageLimit, fallback: FallbackMessages) -> Self {
        Self {
            client,
            limit,
            fallback,
        }
    }

    pub fn client(&self) -> &W {
        &self.client
    }

    pub fn limit(&self) -> MessageLimit {
        self.limit
    }

    pub fn fallback(&self) -> &FallbackMessages {
        &self.fallback
    }

    /// A new conversation with a fresh session, awaiting input.
    pub fn start_conversation(&self) -> Conversation {
        Conversation::new(self.limit)
    }

    /// Run a full turn on a conversation the caller owns exclusively.
    ///
    /// Rejections leave the conversation untouched and make no webhook call.
    pub async fn submit(
        &self,
        conversation: &mut Conversation,
        user_input: impl Into<String>,
    ) -> Result<TurnOutcome, TurnRejected> {
        let turn = conversation.begin_turn(user_input)?;
        let reply = self.relay(&turn).await;
        let recorded = conversation.complete_turn(turn, reply.text.clone());

        Ok(TurnOutcome {
            reply,
            limit_reached: conversation.is_limit_reached(),
            discarded: !recorded,
        })
    }

    /// Send a started turn to the webhook and resolve it to display text.
    ///
    /// Never fails: errors become the matching fallback text.
    pub async fn relay(&self, turn: &PendingTurn) -> TurnReply {
        let start = Instant::now();
        let session_id = turn.session_id();

        let span = info_span!(
            "webhook.send",
            http.request.method = "POST",
            server.endpoint = self.client.endpoint(),
            relay.session_id = %session_id,
            relay.input_chars = turn.input().chars().count(),
        );

        match self.client.send(session_id, turn.input()).instrument(span).await {
            Ok(reply) => {
                info!(
                    session_id = %session_id,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Webhook reply received"
                );
                TurnReply {
                    text: reply.text,
                    failure: None,
                }
            }
            Err(err) => {
                warn!(
                    session_id = %session_id,
                    endpoint = self.client.endpoint(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    error = %err,
                    "Webhook call failed, using fallback text"
                );
                TurnReply {
                    text: self.fallback_text(&err).to_string(),
                    failure: Some(err.failure()),
                }
            }
        }
    }

    /// Start over with a fresh session. Valid in any state.
    pub fn reset(&self, conversation: &mut Conversation) {
        let old = conversation.session().id;
        conversation.reset();
        info!(
            old_session_id = %old,
            session_id = %conversation.session().id,
            "Conversation reset"
        );
    }

    fn fallback_text(&self, err: &WebhookError) -> &str {
        match err {
            WebhookError::Timeout => &self.fallback.timeout,
            WebhookError::Network(_) | WebhookError::Upstream { .. } => &self.fallback.error,
            WebhookError::MalformedResponse(_) => &self.fallback.unprocessable,
        }
    }
}
