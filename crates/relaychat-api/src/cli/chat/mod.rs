//! Interactive terminal chat.
//!
//! Banner, slash commands, multi-line entry, a spinner while the agent
//! works, and markdown rendering of replies. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod multiline;
pub mod renderer;
