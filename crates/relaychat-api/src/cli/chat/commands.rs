//! Slash command parsing for the chat loop.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat.
    Exit,
    /// Reset to a fresh session.
    New,
    /// Show the transcript of the current session.
    History,
    /// Enter several lines as one message.
    Paste,
    /// Unknown command.
    Unknown(String),
}

impl ChatCommand {
    /// Whether the command is still accepted once the message cap is reached.
    pub fn allowed_at_limit(&self) -> bool {
        matches!(
            self,
            ChatCommand::New | ChatCommand::History | ChatCommand::Exit | ChatCommand::Help
        )
    }
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/new" | "/reset" => Some(ChatCommand::New),
        "/history" => Some(ChatCommand::History),
        "/paste" => Some(ChatCommand::Paste),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    println!("  {}     {}", style("/help").cyan(), "Show this help message");
    println!("  {}    {}", style("/clear").cyan(), "Clear the screen");
    println!("  {}      {}", style("/new").cyan(), "Start over with a new session");
    println!("  {}  {}", style("/history").cyan(), "Show this session's messages");
    println!(
        "  {}    {}",
        style("/paste").cyan(),
        "Send several lines as one message (end with a lone '.' or Ctrl+D)"
    );
    println!("  {}     {}", style("/exit").cyan(), "End the chat");
    println!();
    println!(
        "  {}",
        style("End a line with \\ to continue the message on the next line.").dim()
    );
    println!(
        "  {}",
        style("Ctrl+D to exit. Once the message limit is reached only /new, /history and /exit work.")
            .dim()
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_help() {
        assert_eq!(parse("/help"), Some(ChatCommand::Help));
        assert_eq!(parse("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn test_parse_exit() {
        assert_eq!(parse("/exit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/quit"), Some(ChatCommand::Exit));
        assert_eq!(parse(" /Q "), Some(ChatCommand::Exit));
    }

    #[test]
    fn test_parse_new_and_reset_alias() {
        assert_eq!(parse("/new"), Some(ChatCommand::New));
        assert_eq!(parse("/reset"), Some(ChatCommand::New));
    }

    #[test]
    fn test_parse_history_ignores_arguments() {
        assert_eq!(parse("/history all"), Some(ChatCommand::History));
    }

    #[test]
    fn test_parse_paste() {
        assert_eq!(parse("/paste"), Some(ChatCommand::Paste));
        assert!(!ChatCommand::Paste.allowed_at_limit());
    }

    #[test]
    fn test_parse_not_command() {
        assert_eq!(parse("T2 in Lisbon / 85m2"), None);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse("/foo bar"), Some(ChatCommand::Unknown("/foo".to_string())));
    }

    #[test]
    fn test_allowed_at_limit() {
        assert!(ChatCommand::New.allowed_at_limit());
        assert!(ChatCommand::History.allowed_at_limit());
        assert!(ChatCommand::Exit.allowed_at_limit());
        assert!(!ChatCommand::Clear.allowed_at_limit());
        assert!(!ChatCommand::Unknown("/x".to_string()).allowed_at_limit());
    }
}
