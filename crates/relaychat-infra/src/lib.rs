//! Infrastructure layer for Relaychat.
//!
//! Contains the implementation of the `WebhookClient` port defined in
//! `relaychat-core` (reqwest over HTTPS with bearer auth) and the loader
//! that merges `relaychat.toml`, `.env`, and the process environment into a
//! validated [`config::RelayConfig`].

pub mod config;
pub mod webhook;
