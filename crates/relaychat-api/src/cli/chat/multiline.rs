//! Multi-line message entry for the chat loop.
//!
//! The terminal hands over one line per newline, so a pasted listing would
//! otherwise become one turn per line. Two ways to send several lines as a
//! single message:
//!
//! - end a line with `\` to continue on the next one;
//! - `/paste`, then any number of lines, finished by a lone `.` or Ctrl+D.

/// Line that ends a `/paste` block.
pub const PASTE_TERMINATOR: &str = ".";

const CONTINUATION: char = '\\';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Continuation,
    Paste,
}

/// Collects lines until a message is complete.
#[derive(Debug)]
pub struct MultilineBuffer {
    lines: Vec<String>,
    mode: Mode,
}

impl Default for MultilineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl MultilineBuffer {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            mode: Mode::Idle,
        }
    }

    /// True while lines are being gathered into a pending message.
    pub fn is_collecting(&self) -> bool {
        self.mode != Mode::Idle
    }

    /// Enter paste mode. Lines are taken verbatim until the terminator.
    pub fn start_paste(&mut self) {
        self.lines.clear();
        self.mode = Mode::Paste;
    }

    /// Feed one input line. Returns the full message once it is complete.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        let line = line.trim_end();

        match self.mode {
            Mode::Paste => {
                if line.trim() == PASTE_TERMINATOR {
                    return self.finish();
                }
                self.lines.push(line.to_string());
                None
            }
            Mode::Idle | Mode::Continuation => match line.strip_suffix(CONTINUATION) {
                Some(head) => {
                    self.lines.push(head.trim_end().to_string());
                    self.mode = Mode::Continuation;
                    None
                }
                None => {
                    self.lines.push(line.to_string());
                    self.finish()
                }
            },
        }
    }

    /// Close whatever is pending (Ctrl+D) and return it.
    ///
    /// `None` when nothing but blank lines was collected.
    pub fn finish(&mut self) -> Option<String> {
        let text = self.lines.join("\n").trim().to_string();
        self.cancel();
        (!text.is_empty()).then_some(text)
    }

    /// Throw away the pending message (Ctrl+C).
    pub fn cancel(&mut self) {
        self.lines.clear();
        self.mode = Mode::Idle;
    }
}
