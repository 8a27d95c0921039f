//! Parsing of the webhook's success body.
//!
//! The agent answers with a JSON object carrying an `output` string. Workflow
//! engines often wrap that object in a one-element array, so
//! `[{"output": "..."}]` is accepted as well.

use serde_json::Value;

use relaychat_types::error::WebhookError;
use relaychat_types::webhook::{Reply, WebhookResponse};

/// Extract the reply text from a webhook response body.
///
/// Fails with [`WebhookError::MalformedResponse`] when the body is not JSON,
/// has no `output` string, or the `output` is blank.
pub fn extract_reply(body: &str) -> Result<Reply, WebhookError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| WebhookError::MalformedResponse(format!("invalid JSON: {e}")))?;

    let object = match value {
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        Value::Array(items) => {
            return Err(WebhookError::MalformedResponse(format!(
                "expected a single result, got an array of {}",
                items.len()
            )));
        }
        other => other,
    };

    if !object.is_object() {
        return Err(WebhookError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    }

    let response: WebhookResponse = serde_json::from_value(object)
        .map_err(|e| WebhookError::MalformedResponse(format!("unexpected shape: {e}")))?;

    match response.output {
        Some(text) if !text.trim().is_empty() => Ok(Reply::new(text)),
        Some(_) => Err(WebhookError::MalformedResponse(
            "`output` is empty".to_string(),
        )),
        None => Err(WebhookError::MalformedResponse(
            "missing `output` field".to_string(),
        )),
    }
}
