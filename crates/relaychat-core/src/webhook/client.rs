//! WebhookClient trait definition.
//!
//! The single outbound dependency of the relay: given a session id and the
//! user's text, ask the remote agent for a reply. Uses RPITIT (Rust 2024
//! edition) like the other async ports in this workspace.

use relaychat_types::chat::SessionId;
use relaychat_types::error::WebhookError;
use relaychat_types::webhook::Reply;

/// Transport to the remote agent.
///
/// Implementations must make exactly one request per call: no retries and
/// no caching. Implementations live in relaychat-infra (e.g. `HttpWebhookClient`).
pub trait WebhookClient: Send + Sync {
    /// Where requests go, for logging. Must not include credentials.
    fn endpoint(&self) -> &str;

    /// Relay one user message and wait for the agent's reply.
    fn send(
        &self,
        session_id: SessionId,
        user_input: &str,
    ) -> impl std::future::Future<Output = Result<Reply, WebhookError>> + Send;
}
