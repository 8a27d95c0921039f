//! Relay configuration types.
//!
//! `RelaySettings` is the on-disk shape of `relaychat.toml`. Every field has a
//! default except the webhook URL and bearer token, which have no safe
//! default and are validated by the loader in relaychat-infra.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Number of transcript messages one completed turn produces (user + assistant).
pub const TURN_MESSAGES: u32 = 2;

/// What `max_messages` counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapUnit {
    /// `max_messages` is the total number of transcript messages.
    #[default]
    Messages,
    /// `max_messages` is the number of completed turns (two messages each).
    Turns,
}

impl fmt::Display for CapUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapUnit::Messages => write!(f, "messages"),
            CapUnit::Turns => write!(f, "turns"),
        }
    }
}

impl FromStr for CapUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "messages" | "message" => Ok(CapUnit::Messages),
            "turns" | "turn" => Ok(CapUnit::Turns),
            other => Err(format!("invalid cap unit: '{other}' (expected 'messages' or 'turns')")),
        }
    }
}

/// The per-session message cap, resolved to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLimit {
    pub max_messages: u32,
    pub unit: CapUnit,
}

impl MessageLimit {
    pub fn new(max_messages: u32, unit: CapUnit) -> Self {
        Self { max_messages, unit }
    }

    /// The cap expressed as a number of transcript messages.
    pub fn message_cap(&self) -> u32 {
        match self.unit {
            CapUnit::Messages => self.max_messages,
            CapUnit::Turns => self.max_messages.saturating_mul(TURN_MESSAGES),
        }
    }

    /// Whether a session with `message_count` messages can start one more turn.
    ///
    /// A turn is only admitted if both of its messages fit under the cap, so
    /// the counter never exceeds [`message_cap`](Self::message_cap).
    pub fn has_room_for_turn(&self, message_count: u32) -> bool {
        message_count.saturating_add(TURN_MESSAGES) <= self.message_cap()
    }

    /// Completed turns still available to a session with `message_count` messages.
    pub fn remaining_turns(&self, message_count: u32) -> u32 {
        self.message_cap().saturating_sub(message_count) / TURN_MESSAGES
    }
}

impl Default for MessageLimit {
    fn default() -> Self {
        Self::new(default_max_messages(), CapUnit::default())
    }
}

/// User-visible texts substituted when a turn cannot produce a real reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackMessages {
    /// Shown when the webhook did not answer within the timeout budget.
    #[serde(default = "default_timeout_text")]
    pub timeout: String,

    /// Shown on connection failures and non-success HTTP statuses.
    #[serde(default = "default_error_text")]
    pub error: String,

    /// Shown when the webhook answered but without a usable `output`.
    #[serde(default = "default_unprocessable_text")]
    pub unprocessable: String,

    /// Shown by presentation layers once the message cap stops input.
    #[serde(default = "default_limit_reached_text")]
    pub limit_reached: String,
}

fn default_timeout_text() -> String {
    "The agent is taking too long to respond. Please wait a moment and try again.".to_string()
}

fn default_error_text() -> String {
    "Sorry, something went wrong while processing your request. Please try again.".to_string()
}

fn default_unprocessable_text() -> String {
    "Sorry, your request could not be processed.".to_string()
}

fn default_limit_reached_text() -> String {
    "You have reached the message limit for this conversation. Start a new conversation to continue."
        .to_string()
}

impl Default for FallbackMessages {
    fn default() -> Self {
        Self {
            timeout: default_timeout_text(),
            error: default_error_text(),
            unprocessable: default_unprocessable_text(),
            limit_reached: default_limit_reached_text(),
        }
    }
}

/// Contents of `relaychat.toml`.
///
/// Values here are overridden by environment variables at load time.
#[derive(Clone, Serialize, Deserialize)]
pub struct RelaySettings {
    /// Webhook endpoint. Required after all sources are merged.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Bearer token for the webhook. Prefer the `BEARER_TOKEN` env var.
    #[serde(default)]
    pub bearer_token: Option<String>,

    #[serde(default = "default_max_messages")]
    pub max_messages: u32,

    #[serde(default)]
    pub cap_unit: CapUnit,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Budget for the whole response once connected.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,

    /// How long the HTTP server keeps a conversation nobody touches.
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,

    #[serde(default)]
    pub fallback: FallbackMessages,
}

fn default_max_messages() -> u32 {
    50
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_read_timeout_secs() -> u64 {
    60
}

fn default_idle_ttl_secs() -> u64 {
    3600
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            bearer_token: None,
            max_messages: default_max_messages(),
            cap_unit: CapUnit::default(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            idle_ttl_secs: default_idle_ttl_secs(),
            fallback: FallbackMessages::default(),
        }
    }
}

// Hand-written so the bearer token never reaches logs.
impl fmt::Debug for RelaySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelaySettings")
            .field("webhook_url", &self.webhook_url)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[REDACTED]"))
            .field("max_messages", &self.max_messages)
            .field("cap_unit", &self.cap_unit)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("read_timeout_secs", &self.read_timeout_secs)
            .field("idle_ttl_secs", &self.idle_ttl_secs)
            .field("fallback", &self.fallback)
            .finish()
    }
}
