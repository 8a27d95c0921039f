//! Webhook transport implementations.

pub mod http;

pub use http::HttpWebhookClient;
