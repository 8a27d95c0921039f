//! Axum router configuration with middleware.
//!
//! All conversation routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/conversations",
            post(handlers::conversation::create_conversation),
        )
        .route(
            "/conversations/{id}",
            get(handlers::conversation::get_conversation)
                .delete(handlers::conversation::delete_conversation),
        )
        .route(
            "/conversations/{id}/messages",
            post(handlers::conversation::submit_message),
        )
        .route(
            "/conversations/{id}/reset",
            post(handlers::conversation::reset_conversation),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness check. Does not call the webhook.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use relaychat_infra::config::resolve_config;
    use relaychat_types::config::{FallbackMessages, RelaySettings};

    const MAX_SIZE: usize = 1024 * 1024;

    fn app_for(server: &MockServer, max_messages: u32) -> Router {
        let settings = RelaySettings {
            webhook_url: Some(format!("{}/webhook/chat", server.uri())),
            bearer_token: Some("test-token".to_string()),
            max_messages,
            connect_timeout_secs: 1,
            read_timeout_secs: 5,
            ..RelaySettings::default()
        };
        let config = resolve_config(settings, |_| None).unwrap();
        build_router(AppState::from_config(&config).unwrap())
    }

    async fn mount_reply(server: &MockServer, text: &str) {
        Mock::given(method("POST"))
            .and(path("/webhook/chat"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": text })))
            .mount(server)
            .await;
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), MAX_SIZE).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn create(app: &Router) -> String {
        let (status, body) = call(app, "POST", "/api/v1/conversations", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["conversation_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_state_registry_forgets_idle_conversations() {
        let server = MockServer::start().await;
        let settings = RelaySettings {
            webhook_url: Some(format!("{}/webhook/chat", server.uri())),
            bearer_token: Some("test-token".to_string()),
            idle_ttl_secs: 1,
            ..RelaySettings::default()
        };
        let config = resolve_config(settings, |_| None).unwrap();
        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.registry.idle_ttl(), Some(Duration::from_secs(1)));

        let app = build_router(state.clone());
        let stale = create(&app).await;
        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert_eq!(state.registry.evict_idle(), 1);

        let (status, _) = call(&app, "GET", &format!("/api/v1/conversations/{stale}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        let app = app_for(&server, 10);
        let (status, body) = call(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_returns_fresh_empty_session() {
        let server = MockServer::start().await;
        let app = app_for(&server, 10);

        let (status, body) = call(&app, "POST", "/api/v1/conversations", None).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["state"], "awaiting_input");
        assert_eq!(body["data"]["limit_reached"], false);
        assert_eq!(body["data"]["session"]["messages"], json!([]));
        assert!(body["data"]["session"]["id"].is_string());
    }

    #[tokio::test]
    async fn test_submit_relays_and_records_turn() {
        let server = MockServer::start().await;
        mount_reply(&server, "Bright two-bedroom flat.").await;
        let app = app_for(&server, 10);
        let id = create(&app).await;

        let (status, body) = call(
            &app,
            "POST",
            &format!("/api/v1/conversations/{id}/messages"),
            Some(json!({ "content": "T2 in Lisbon" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["reply"]["text"], "Bright two-bedroom flat.");
        assert!(body["data"]["reply"].get("failure").is_none());
        assert_eq!(body["data"]["limit_reached"], false);
        assert_eq!(body["data"]["discarded"], false);

        let (_, snap) = call(&app, "GET", &format!("/api/v1/conversations/{id}"), None).await;
        let messages = snap["data"]["session"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "T2 in Lisbon");
        assert_eq!(messages[1]["role"], "assistant");
    }

    #[tokio::test]
    async fn test_upstream_failure_returns_fallback_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        let app = app_for(&server, 10);
        let id = create(&app).await;

        let (status, body) = call(
            &app,
            "POST",
            &format!("/api/v1/conversations/{id}/messages"),
            Some(json!({ "content": "hello" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["reply"]["text"], FallbackMessages::default().error);
        assert_eq!(body["data"]["reply"]["failure"], "upstream");
    }

    #[tokio::test]
    async fn test_limit_reached_makes_no_further_webhook_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": "ok" })))
            .expect(1)
            .mount(&server)
            .await;
        let app = app_for(&server, 2);
        let id = create(&app).await;
        let uri = format!("/api/v1/conversations/{id}/messages");

        let (_, first) = call(&app, "POST", &uri, Some(json!({ "content": "one" }))).await;
        assert_eq!(first["data"]["limit_reached"], true);
        assert_eq!(first["data"]["notice"], FallbackMessages::default().limit_reached);

        let (status, second) = call(&app, "POST", &uri, Some(json!({ "content": "two" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["data"]["limit_reached"], true);
        assert!(second["data"].get("reply").is_none());
        assert_eq!(second["data"]["remaining_turns"], 0);
    }

    #[tokio::test]
    async fn test_second_submit_while_pending_conflicts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "output": "slow" }))
                    .set_delay(Duration::from_millis(800)),
            )
            .expect(1)
            .mount(&server)
            .await;
        let app = app_for(&server, 10);
        let id = create(&app).await;
        let uri = format!("/api/v1/conversations/{id}/messages");

        let first = {
            let app = app.clone();
            let uri = uri.clone();
            tokio::spawn(async move {
                call(&app, "POST", &uri, Some(json!({ "content": "first" }))).await
            })
        };
        tokio::time::sleep(Duration::from_millis(200)).await;

        let (status, body) = call(&app, "POST", &uri, Some(json!({ "content": "second" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["errors"][0]["code"], "REPLY_PENDING");

        let (first_status, first_body) = first.await.unwrap();
        assert_eq!(first_status, StatusCode::OK);
        assert_eq!(first_body["data"]["reply"]["text"], "slow");
    }

    #[tokio::test]
    async fn test_reply_for_reset_session_is_not_returned() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "output": "answer for the old session" }))
                    .set_delay(Duration::from_millis(800)),
            )
            .mount(&server)
            .await;
        let app = app_for(&server, 10);
        let id = create(&app).await;

        let pending = {
            let app = app.clone();
            let uri = format!("/api/v1/conversations/{id}/messages");
            tokio::spawn(async move {
                call(&app, "POST", &uri, Some(json!({ "content": "old question" }))).await
            })
        };
        tokio::time::sleep(Duration::from_millis(200)).await;
        let (_, reset) =
            call(&app, "POST", &format!("/api/v1/conversations/{id}/reset"), None).await;

        let (status, body) = pending.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["discarded"], true);
        assert!(body["data"].get("reply").is_none());
        assert_eq!(body["data"]["session_id"], reset["data"]["session"]["id"]);

        let (_, snap) = call(&app, "GET", &format!("/api/v1/conversations/{id}"), None).await;
        assert_eq!(snap["data"]["session"]["messages"], json!([]));
    }

    #[tokio::test]
    async fn test_empty_content_is_rejected() {
        let server = MockServer::start().await;
        let app = app_for(&server, 10);
        let id = create(&app).await;

        let (status, body) = call(
            &app,
            "POST",
            &format!("/api/v1/conversations/{id}/messages"),
            Some(json!({ "content": "   " })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_and_invalid_ids() {
        let server = MockServer::start().await;
        let app = app_for(&server, 10);

        let (status, body) = call(
            &app,
            "GET",
            &format!("/api/v1/conversations/{}", uuid::Uuid::now_v7()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"][0]["code"], "CONVERSATION_NOT_FOUND");

        let (status, _) = call(&app, "GET", "/api/v1/conversations/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reset_replaces_session() {
        let server = MockServer::start().await;
        mount_reply(&server, "hi").await;
        let app = app_for(&server, 10);

        let (_, created) = call(&app, "POST", "/api/v1/conversations", None).await;
        let id = created["data"]["conversation_id"].as_str().unwrap().to_string();
        let old_session = created["data"]["session"]["id"].clone();
        call(
            &app,
            "POST",
            &format!("/api/v1/conversations/{id}/messages"),
            Some(json!({ "content": "hello" })),
        )
        .await;

        let (status, body) =
            call(&app, "POST", &format!("/api/v1/conversations/{id}/reset"), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_ne!(body["data"]["session"]["id"], old_session);
        assert_eq!(body["data"]["session"]["messages"], json!([]));
        assert_eq!(body["data"]["conversation_id"], id.as_str());
    }

    #[tokio::test]
    async fn test_delete_forgets_conversation() {
        let server = MockServer::start().await;
        let app = app_for(&server, 10);
        let id = create(&app).await;
        let uri = format!("/api/v1/conversations/{id}");

        let (status, body) = call(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["deleted"], true);

        let (status, _) = call(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
