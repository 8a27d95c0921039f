use thiserror::Error;

use crate::webhook::ReplyFailure;

/// Errors raised while resolving relay configuration. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0} (set it in the environment, .env, or relaychat.toml)")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("failed to read config file {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },
}

/// Failures of a single webhook call. All are recoverable.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("webhook did not respond within the timeout")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("webhook returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("malformed webhook response: {0}")]
    MalformedResponse(String),
}

impl WebhookError {
    /// The user-facing failure category for this error.
    pub fn failure(&self) -> ReplyFailure {
        match self {
            WebhookError::Timeout => ReplyFailure::Timeout,
            WebhookError::Network(_) => ReplyFailure::Network,
            WebhookError::Upstream { .. } => ReplyFailure::Upstream,
            WebhookError::MalformedResponse(_) => ReplyFailure::MalformedResponse,
        }
    }
}

/// Why a conversation refused to start a new turn.
///
/// These are soft stops, not faults: the conversation is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnRejected {
    #[error("message limit reached ({cap} messages)")]
    LimitReached { cap: u32 },

    #[error("a reply is still pending for this session")]
    AwaitingReply,

    #[error("message is empty")]
    EmptyInput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display_names_setting() {
        let err = ConfigError::Missing("WEBHOOK_URL");
        assert!(err.to_string().contains("WEBHOOK_URL"));
    }

    #[test]
    fn test_webhook_error_display() {
        let err = WebhookError::Upstream {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "webhook returned HTTP 500: boom");
    }

    #[test]
    fn test_webhook_error_failure_kinds_are_distinct() {
        assert_eq!(WebhookError::Timeout.failure(), ReplyFailure::Timeout);
        assert_eq!(
            WebhookError::Network("refused".to_string()).failure(),
            ReplyFailure::Network
        );
        assert_ne!(
            WebhookError::Timeout.failure(),
            WebhookError::Network("x".to_string()).failure()
        );
    }

    #[test]
    fn test_turn_rejected_display() {
        let err = TurnRejected::LimitReached { cap: 4 };
        assert_eq!(err.to_string(), "message limit reached (4 messages)");
    }
}
