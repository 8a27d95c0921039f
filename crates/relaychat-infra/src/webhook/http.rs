//! HttpWebhookClient -- concrete [`WebhookClient`] over reqwest.
//!
//! Sends one `POST` per turn with a JSON body of
//! `{"sessionId": ..., "chatInput": ...}` and an `Authorization: Bearer`
//! header. The bearer token is held as a [`SecretString`] and only exposed
//! while building request headers.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};

use relaychat_core::webhook::client::WebhookClient;
use relaychat_core::webhook::reply::extract_reply;
use relaychat_types::chat::SessionId;
use relaychat_types::error::WebhookError;
use relaychat_types::webhook::{Reply, WebhookRequest};

use crate::config::{redacted_endpoint, RelayConfig};

/// Longest slice of an error body kept in an `Upstream` error.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Webhook client backed by a pooled `reqwest::Client`.
///
/// Does not derive Debug; the token must never be printed.
pub struct HttpWebhookClient {
    client: reqwest::Client,
    url: Url,
    bearer_token: SecretString,
    endpoint: String,
}

impl HttpWebhookClient {
    /// Build a client.
    ///
    /// `connect_timeout` bounds connection setup; `read_timeout` bounds the
    /// whole exchange, so a stalled agent surfaces as a timeout.
    pub fn new(
        url: Url,
        bearer_token: SecretString,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()
            .map_err(|e| WebhookError::Network(format!("failed to build HTTP client: {e}")))?;

        let endpoint = redacted_endpoint(&url);
        Ok(Self {
            client,
            url,
            bearer_token,
            endpoint,
        })
    }

    pub fn from_config(config: &RelayConfig) -> Result<Self, WebhookError> {
        Self::new(
            config.webhook_url.clone(),
            SecretString::from(config.bearer_token.expose_secret().to_string()),
            config.connect_timeout,
            config.read_timeout,
        )
    }
}

fn map_transport_error(err: reqwest::Error) -> WebhookError {
    if err.is_timeout() {
        WebhookError::Timeout
    } else {
        WebhookError::Network(err.to_string())
    }
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

impl WebhookClient for HttpWebhookClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, session_id: SessionId, user_input: &str) -> Result<Reply, WebhookError> {
        let body = WebhookRequest {
            session_id,
            chat_input: user_input.to_string(),
        };

        let response = self
            .client
            .post(self.url.clone())
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.bearer_token.expose_secret()),
            )
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            // The status is the signal; a body that fails to arrive is not.
            let text = response.text().await.unwrap_or_default();
            return Err(WebhookError::Upstream {
                status: status.as_u16(),
                body: truncate_body(&text),
            });
        }

        let text = response.text().await.map_err(map_transport_error)?;
        extract_reply(&text)
    }
}
