//! Conversation state for Relaychat.
//!
//! - `store`: the in-memory session transcript with count-based truncation
//! - `conversation`: the two-state turn machine wrapping a store
//! - `controller`: drives turns through a `WebhookClient`
//! - `registry`: per-user conversation isolation for multi-user front ends

pub mod controller;
pub mod conversation;
pub mod registry;
pub mod store;
