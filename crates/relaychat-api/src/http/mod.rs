//! HTTP/REST API layer for Relaychat.
//!
//! Axum-based REST API at `/api/v1/` with the envelope response format and
//! CORS support. Each conversation handle maps to one isolated session.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
