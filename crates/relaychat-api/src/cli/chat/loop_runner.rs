//! Main chat loop orchestration.
//!
//! Owns one `Conversation` for the lifetime of the loop. Input is read only
//! while the conversation awaits input; the turn runs to completion (reply
//! or fallback) before the prompt comes back. Lines are gathered by a
//! `MultilineBuffer`, so a pasted block can go out as one message.

use console::style;
use tracing::{debug, info};

use relaychat_core::chat::conversation::Conversation;
use relaychat_core::webhook::client::WebhookClient;
use relaychat_types::chat::MessageRole;
use relaychat_types::error::TurnRejected;

use crate::state::AppState;

use super::banner::{print_session_line, print_welcome_banner};
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::multiline::{MultilineBuffer, PASTE_TERMINATOR};
use super::renderer::{failure_notice, preview, ChatRenderer};

/// Run the interactive chat loop until `/exit` or Ctrl+D.
pub async fn run_chat_loop(
    state: &AppState,
    title: &str,
    instructions: Option<&str>,
) -> anyhow::Result<()> {
    let controller = &state.controller;
    let mut conversation = controller.start_conversation();
    let renderer = ChatRenderer::new();

    print_welcome_banner(
        title,
        instructions,
        controller.client().endpoint(),
        &conversation.session().id.to_string(),
        controller.limit(),
    );
    info!(session_id = %conversation.session().id, "Chat started");

    let prompt = format!("  {} ", style("You >").green().bold());
    let continuation_prompt = format!("  {} ", style("  ... ").dim());
    let (mut chat_input, _writer) = ChatInput::new(prompt.clone())
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;
    let mut pending = MultilineBuffer::new();

    loop {
        let text = match chat_input.read_line().await {
            // Ctrl+D ends a multi-line message before it ends the chat.
            InputEvent::Eof if pending.is_collecting() => {
                chat_input.update_prompt(&prompt);
                match pending.finish() {
                    Some(text) => text,
                    None => continue,
                }
            }
            InputEvent::Eof => {
                println!("\n  {}", style("Chat ended.").dim());
                break;
            }
            InputEvent::Interrupted if pending.is_collecting() => {
                pending.cancel();
                chat_input.update_prompt(&prompt);
                println!("\n  {}", style("Multi-line message discarded.").dim());
                continue;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            // Commands are not recognised inside a multi-line message.
            InputEvent::Message(line) if pending.is_collecting() => {
                match pending.push_line(&line) {
                    Some(text) => {
                        chat_input.update_prompt(&prompt);
                        text
                    }
                    None => {
                        if !pending.is_collecting() {
                            chat_input.update_prompt(&prompt);
                        }
                        continue;
                    }
                }
            }
            InputEvent::Message(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&line) {
                    if conversation.is_limit_reached() && !cmd.allowed_at_limit() {
                        print_limit_notice(state);
                        continue;
                    }
                    match cmd {
                        ChatCommand::Help => commands::print_help(),
                        ChatCommand::Clear => chat_input.clear(),
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Chat ended.").dim());
                            break;
                        }
                        ChatCommand::New => {
                            pending.cancel();
                            controller.reset(&mut conversation);
                            println!("\n  {} New session started.", style("*").cyan().bold());
                            print_session_line(&conversation.session().id.to_string());
                            println!();
                        }
                        ChatCommand::History => print_history(&conversation),
                        ChatCommand::Paste => {
                            pending.start_paste();
                            chat_input.update_prompt(&continuation_prompt);
                            println!(
                                "\n  {}",
                                style(format!(
                                    "Paste your text. Finish with a line containing only '{PASTE_TERMINATOR}' or press Ctrl+D."
                                ))
                                .dim()
                            );
                        }
                        ChatCommand::Unknown(name) => {
                            println!(
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(name).dim()
                            );
                        }
                    }
                    continue;
                }

                match pending.push_line(&line) {
                    Some(text) => text,
                    None => {
                        chat_input.update_prompt(&continuation_prompt);
                        continue;
                    }
                }
            }
        };

        if conversation.is_limit_reached() {
            print_limit_notice(state);
            continue;
        }

        let spinner = indicatif::ProgressBar::new_spinner();
        if let Ok(spinner_style) =
            indicatif::ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}")
        {
            spinner.set_style(spinner_style);
        }
        spinner.set_message("waiting for the agent...");
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));

        let result = controller.submit(&mut conversation, text).await;
        spinner.finish_and_clear();

        match result {
            Ok(outcome) => {
                println!();
                if let Some(failure) = outcome.reply.failure {
                    println!(
                        "  {} {}",
                        style("!").yellow().bold(),
                        style(failure_notice(failure)).dim()
                    );
                }
                println!("  {}", renderer.render(&outcome.reply.text).trim());
                println!();
                if outcome.limit_reached {
                    print_limit_notice(state);
                }
            }
            Err(TurnRejected::LimitReached { .. }) => print_limit_notice(state),
            Err(rejected) => {
                debug!(reason = %rejected, "Turn rejected");
                println!("\n  {} {rejected}\n", style("!").yellow().bold());
            }
        }
    }

    chat_input.flush();
    Ok(())
}

fn print_limit_notice(state: &AppState) {
    println!(
        "\n  {} {}",
        style("!").yellow().bold(),
        state.controller.fallback().limit_reached
    );
    println!(
        "  {}\n",
        style("Use /new to start over, /history to review, /exit to leave.").dim()
    );
}

fn print_history(conversation: &Conversation) {
    let store = conversation.store();
    println!();
    if store.messages().is_empty() {
        println!("  {}", style("No messages yet.").dim());
    }
    for msg in store.messages() {
        let role_label = match msg.role {
            MessageRole::User => format!("{}", style("You").green()),
            MessageRole::Assistant => format!("{}", style("Agent").cyan()),
        };
        println!("  {} {}", style(role_label).bold(), preview(&msg.content, 100));
    }
    println!(
        "  {}",
        style(format!(
            "{} of {} messages used, {} turns left",
            store.message_count(),
            conversation.limit().message_cap(),
            conversation.remaining_turns()
        ))
        .dim()
    );
    println!();
}
