//! `relaychat send`: one turn in a fresh session.

use anyhow::Result;
use console::style;

use crate::cli::chat::renderer::{failure_notice, ChatRenderer};
use crate::state::AppState;

/// Relay `text` once and print the reply.
///
/// Fallback replies are printed like any other reply, with a notice on
/// stderr naming the failure.
pub async fn send_message(state: &AppState, text: String, json: bool) -> Result<()> {
    let mut conversation = state.controller.start_conversation();
    let session_id = conversation.session().id;

    let outcome = state
        .controller
        .submit(&mut conversation, text)
        .await
        .map_err(|e| anyhow::anyhow!("Message not sent: {e}"))?;

    if json {
        let result = serde_json::json!({
            "session_id": session_id,
            "reply": outcome.reply.text,
            "failure": outcome.reply.failure,
            "limit_reached": outcome.limit_reached,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if let Some(failure) = outcome.reply.failure {
        eprintln!(
            "  {} {}",
            style("!").yellow().bold(),
            style(failure_notice(failure)).dim()
        );
    }

    let renderer = ChatRenderer::new();
    println!("{}", renderer.render(&outcome.reply.text).trim_end());

    Ok(())
}
