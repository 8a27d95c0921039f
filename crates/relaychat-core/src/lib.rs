//! Conversation logic and port definitions for Relaychat.
//!
//! This crate owns the session store, the turn-taking controller, and the
//! `WebhookClient` trait that the infrastructure layer implements. It depends
//! only on `relaychat-types` -- never on `relaychat-infra` or any HTTP crate.

pub mod chat;
pub mod webhook;
