//! Application state wiring the controller and registry together.
//!
//! The controller is generic over `WebhookClient`; AppState pins it to the
//! reqwest implementation from relaychat-infra.

use std::sync::Arc;
use std::time::Duration;

use relaychat_core::chat::controller::ConversationController;
use relaychat_core::chat::registry::ConversationRegistry;
use relaychat_infra::config::RelayConfig;
use relaychat_infra::webhook::HttpWebhookClient;

/// Concrete controller type pinned to the HTTP webhook client.
pub type ConcreteController = ConversationController<HttpWebhookClient>;

/// Shortest gap between two idle sweeps.
const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers. The controller is
/// read-only after startup; per-user state lives in the registry (HTTP) or
/// in the chat loop's own `Conversation` (terminal).
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<ConcreteController>,
    pub registry: Arc<ConversationRegistry>,
}

impl AppState {
    pub fn new(controller: ConcreteController, registry: ConversationRegistry) -> Self {
        Self {
            controller: Arc::new(controller),
            registry: Arc::new(registry),
        }
    }

    /// Build the webhook client, controller, and registry from a validated config.
    pub fn from_config(config: &RelayConfig) -> anyhow::Result<Self> {
        let client = HttpWebhookClient::from_config(config)?;
        Ok(Self::new(
            ConversationController::new(client, config.limit, config.fallback.clone()),
            ConversationRegistry::with_idle_ttl(config.idle_ttl),
        ))
    }

    /// Periodically drop idle conversations for the life of the server.
    ///
    /// Returns `None` when the registry keeps conversations forever.
    pub fn spawn_idle_sweep(&self) -> Option<tokio::task::JoinHandle<()>> {
        let ttl = self.registry.idle_ttl()?;
        let registry = Arc::clone(&self.registry);
        let period = (ttl / 4).max(MIN_SWEEP_PERIOD);

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = registry.evict_idle();
                if evicted > 0 {
                    tracing::info!(evicted, remaining = registry.len(), "Idle sweep finished");
                }
            }
        }))
    }
}
