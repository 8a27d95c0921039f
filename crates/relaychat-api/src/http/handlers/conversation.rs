//! Conversation HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/conversations                - Start a conversation
//! - GET    /api/v1/conversations/{id}           - Transcript, state, and limit status
//! - POST   /api/v1/conversations/{id}/messages  - Submit one user message
//! - POST   /api/v1/conversations/{id}/reset     - Start over with a fresh session
//! - DELETE /api/v1/conversations/{id}           - Forget the conversation

use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use relaychat_core::chat::controller::TurnReply;
use relaychat_core::chat::registry::{ConversationSnapshot, RegistryError};
use relaychat_types::chat::SessionId;
use relaychat_types::error::TurnRejected;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitMessageRequest {
    pub content: String,
}

/// Result of a submit: the reply, or a notice when the cap stopped the turn.
#[derive(Debug, Serialize)]
pub struct SubmitMessageResponse {
    pub conversation_id: Uuid,
    pub session_id: SessionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<TurnReply>,
    pub limit_reached: bool,
    /// True when the conversation was reset while the agent was answering;
    /// the late reply is dropped and `session_id` names the new session.
    pub discarded: bool,
    /// Limit notice text, present once the cap is reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub remaining_turns: u32,
}

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

fn conversation_link(id: &Uuid) -> String {
    format!("/api/v1/conversations/{id}")
}

/// POST /api/v1/conversations - Start a conversation with a fresh session.
pub async fn create_conversation(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<ConversationSnapshot>>) {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let snapshot = state.registry.create(&*state.controller);
    let link = conversation_link(&snapshot.conversation_id);

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(snapshot, request_id, elapsed).with_link("self", &link);
    (StatusCode::CREATED, Json(resp))
}

/// GET /api/v1/conversations/{id} - Snapshot of one conversation.
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ConversationSnapshot>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&id)?;
    let snapshot = state
        .registry
        .snapshot(&id)
        .ok_or(AppError::Registry(RegistryError::NotFound))?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(snapshot, request_id, elapsed)
        .with_link("self", &conversation_link(&id));
    Ok(Json(resp))
}

/// POST /api/v1/conversations/{id}/messages - Relay one user message.
///
/// At the cap this answers 200 with `limit_reached: true` and the limit
/// notice; no webhook call is made.
pub async fn submit_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SubmitMessageRequest>,
) -> Result<Json<ApiResponse<SubmitMessageResponse>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&id)?;
    let limit_notice = || state.controller.fallback().limit_reached.clone();

    let (reply, limit_reached, discarded) = match state
        .registry
        .submit(&*state.controller, &id, body.content)
        .await
    {
        Ok(outcome) if outcome.discarded => (None, outcome.limit_reached, true),
        Ok(outcome) => (Some(outcome.reply), outcome.limit_reached, false),
        Err(RegistryError::Rejected(TurnRejected::LimitReached { .. })) => (None, true, false),
        Err(e) => return Err(e.into()),
    };

    let snapshot = state
        .registry
        .snapshot(&id)
        .ok_or(AppError::Registry(RegistryError::NotFound))?;

    let data = SubmitMessageResponse {
        conversation_id: id,
        session_id: snapshot.session.id,
        reply,
        limit_reached,
        discarded,
        notice: limit_reached.then(limit_notice),
        remaining_turns: snapshot.remaining_turns,
    };

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(data, request_id, elapsed)
        .with_link("conversation", &conversation_link(&id));
    Ok(Json(resp))
}

/// POST /api/v1/conversations/{id}/reset - Replace the session, keep the handle.
pub async fn reset_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ConversationSnapshot>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&id)?;
    let snapshot = state.registry.reset(&*state.controller, &id)?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(snapshot, request_id, elapsed)
        .with_link("self", &conversation_link(&id));
    Ok(Json(resp))
}

/// DELETE /api/v1/conversations/{id} - Forget a conversation.
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let id = parse_uuid(&id)?;
    if !state.registry.remove(&id) {
        return Err(AppError::Registry(RegistryError::NotFound));
    }
    tracing::info!(conversation_id = %id, "Conversation deleted");

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": true, "conversation_id": id }),
        request_id,
        elapsed,
    )))
}
