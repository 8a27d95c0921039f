//! Webhook wire types.
//!
//! The relay sends one [`WebhookRequest`] per user turn and expects a JSON
//! object carrying an `output` string back.

use serde::{Deserialize, Serialize};

use crate::chat::SessionId;

/// JSON body POSTed to the webhook.
///
/// Serializes as `{"sessionId": "...", "chatInput": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    pub session_id: SessionId,
    pub chat_input: String,
}

/// Expected success body. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookResponse {
    pub output: Option<String>,
}

/// The text the agent produced for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
}

impl Reply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Why a turn ended with fallback text instead of a real reply.
///
/// Presentation layers use this to tailor their notice (e.g. suggest waiting
/// after a timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyFailure {
    Timeout,
    Network,
    Upstream,
    MalformedResponse,
}
