//! Test utilities for integration tests
#![allow(dead_code)]
use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use ccmi_assistant::ai::chat::PROBE_PROMPT;
use ccmi_assistant::api::AppState;
use ccmi_assistant::api::app;
use ccmi_assistant::core::AppConfig;
use ccmi_assistant::gemini::GeminiClient;

pub const TEST_MODEL: &str = "gemini-1.5-flash";
pub const TEST_PREAMBLE: &str = "You are a helpful assistant.";
pub const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

/// Creates a test application router that sends all generation
/// requests to `api_hostname`, usually a `mockito` server.
pub fn test_app(api_hostname: &str) -> Router {
    test_app_with_session_ttl(api_hostname, Duration::from_secs(3600))
}

/// Same as `test_app` but sessions expire after `session_ttl` of
/// inactivity.
pub fn test_app_with_session_ttl(api_hostname: &str, session_ttl: Duration) -> Router {
    let app_config = AppConfig {
        gemini_api_hostname: api_hostname.to_string(),
        gemini_model: TEST_MODEL.to_string(),
        system_preamble: TEST_PREAMBLE.to_string(),
        web_ui_path: String::from("./web-ui/src"),
        session_ttl,
    };
    let generator = GeminiClient::new(api_hostname, TEST_MODEL);
    let app_state = AppState::new(app_config, Arc::new(generator));
    app(Arc::new(RwLock::new(app_state)))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Gemini response body with a single text part.
pub fn gemini_reply(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

/// Mocks the API key probe so that it succeeds.
pub async fn mock_valid_key(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", GENERATE_PATH)
        .match_body(Matcher::PartialJson(json!({
            "contents": [{ "parts": [{ "text": PROBE_PROMPT }] }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_reply("Hello! Your key works."))
        .create_async()
        .await
}

/// Starts a session and returns its ID.
pub async fn create_session(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/chat/sessions")
                .method("POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = serde_json::from_str(&body_to_string(response.into_body()).await).unwrap();
    body["session_id"].as_str().unwrap().to_string()
}

/// Starts a session and stores a validated API key in it. Requires
/// `mock_valid_key` to be in place.
pub async fn authorized_session(app: &Router) -> String {
    let id = create_session(app).await;
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/chat/sessions/{}/credential", id),
            json!({ "api_key": "test-api-key" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    id
}
