//! Terminal markdown rendering for agent replies.

use termimad::MadSkin;

use relaychat_types::webhook::ReplyFailure;

/// Renders agent replies (which are usually markdown) with `termimad`.
pub struct ChatRenderer {
    skin: MadSkin,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.bold.set_fg(termimad::crossterm::style::Color::Cyan);
        skin.headers[0].set_fg(termimad::crossterm::style::Color::Cyan);
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);
        Self { skin }
    }

    /// Render a complete reply as styled terminal text.
    pub fn render(&self, markdown: &str) -> String {
        self.skin.term_text(markdown).to_string()
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Short explanation shown next to a fallback reply.
pub fn failure_notice(failure: ReplyFailure) -> &'static str {
    match failure {
        ReplyFailure::Timeout => "The agent did not answer in time.",
        ReplyFailure::Network => "Could not reach the agent.",
        ReplyFailure::Upstream => "The agent returned an error.",
        ReplyFailure::MalformedResponse => "The agent's answer could not be read.",
    }
}

/// Shorten `text` to at most `max_chars` characters for previews.
pub fn preview(text: &str, max_chars: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max_chars {
        return single_line;
    }
    let cut: String = single_line.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{cut}...")
}
