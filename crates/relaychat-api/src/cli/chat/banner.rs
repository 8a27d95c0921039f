//! Welcome banner display for chat sessions.

use console::style;

use relaychat_types::config::MessageLimit;

/// Print the welcome banner at the start of a chat session.
///
/// Shows the title, optional instructions, the agent endpoint, the session
/// id, and how many turns the cap allows.
pub fn print_welcome_banner(
    title: &str,
    instructions: Option<&str>,
    endpoint: &str,
    session_id: &str,
    limit: MessageLimit,
) {
    println!();
    println!("  {} {}", style("*").cyan(), style(title).cyan().bold());
    if let Some(text) = instructions {
        println!("  {}", style(text).dim());
    }
    println!();
    println!("  {}    {}", style("Agent:").bold(), style(endpoint).dim());
    print_session_line(session_id);
    println!(
        "  {}    {}",
        style("Limit:").bold(),
        style(format!("{} turns per session", limit.remaining_turns(0))).dim()
    );
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}

/// Print the short session id line, also used after `/new`.
pub fn print_session_line(session_id: &str) {
    println!(
        "  {}  {}",
        style("Session:").bold(),
        style(&session_id[..8.min(session_id.len())]).dim()
    );
}
