//! Shared domain types for Relaychat.
//!
//! This crate contains the core domain types used across the relay:
//! sessions, transcript messages, webhook replies, relay settings, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod webhook;
