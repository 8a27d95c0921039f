//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use relaychat_core::chat::registry::RegistryError;
use relaychat_types::error::TurnRejected;

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Registry(RegistryError),
    /// Bad path parameter or request body.
    Validation(String),
}

impl From<RegistryError> for AppError {
    fn from(e: RegistryError) -> Self {
        AppError::Registry(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Registry(RegistryError::NotFound) => (
                StatusCode::NOT_FOUND,
                "CONVERSATION_NOT_FOUND",
                "Conversation not found".to_string(),
            ),
            AppError::Registry(RegistryError::Rejected(TurnRejected::AwaitingReply)) => (
                StatusCode::CONFLICT,
                "REPLY_PENDING",
                "A reply is still pending for this conversation".to_string(),
            ),
            AppError::Registry(RegistryError::Rejected(TurnRejected::LimitReached { cap })) => (
                StatusCode::CONFLICT,
                "LIMIT_REACHED",
                format!("Message limit reached ({cap} messages)"),
            ),
            AppError::Registry(RegistryError::Rejected(TurnRejected::EmptyInput)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Message content must not be empty".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = ApiResponse::<()>::error(code, &message, Uuid::now_v7().to_string());

        let json = serde_json::to_string(&body).unwrap_or_else(|_| {
            r#"{"errors":[{"code":"SERIALIZATION_ERROR","message":"Failed to serialize response"}]}"#
                .to_string()
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            json,
        )
            .into_response()
    }
}
