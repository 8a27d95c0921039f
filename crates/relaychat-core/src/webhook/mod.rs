//! Webhook client abstraction.
//!
//! `WebhookClient` is the port the controller calls once per turn; the
//! reqwest-backed implementation lives in relaychat-infra. `reply` holds the
//! transport-independent parsing of the webhook's JSON answer.

pub mod client;
pub mod reply;
