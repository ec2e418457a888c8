//! Router for the chat API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use super::public;
use crate::ai::chat::{Turn, credential_status};
use crate::api::state::{AppState, SharedSession};

type SharedState = Arc<RwLock<AppState>>;

const RESET_MESSAGE: &str = "Conversation has been reset.";

const EXAMPLE_QUESTIONS: &[(&str, &[&str])] = &[
    (
        "VBA Questions",
        &[
            "How do I write a VBA macro to automate data entry?",
            "How can I loop through all cells in a range using VBA?",
        ],
    ),
    (
        "Power Query Questions",
        &[
            "How do I merge two tables in Power Query?",
            "How can I unpivot columns in Power Query?",
        ],
    ),
    (
        "M Code Examples",
        &[
            "What's the M code to filter rows based on a condition?",
            "How do I create a custom column using M code?",
        ],
    ),
];

// Takes the write lock because a lookup also refreshes the session's
// idle timer
fn find_session(state: &SharedState, id: &str) -> Option<SharedSession> {
    state.write().expect("Unable to write share state").session(id)
}

fn session_not_found(id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        format!("Chat session {} not found", id),
    )
        .into_response()
}

/// Start a new chat session
async fn create_session(State(state): State<SharedState>) -> impl IntoResponse {
    let (id, session) = state
        .write()
        .expect("Unable to write share state")
        .create_session();
    tracing::info!(session_id = %id, "Chat session started");

    let session = session.lock().await;
    (
        StatusCode::CREATED,
        Json(public::SessionResponse::new(&id, &session)),
    )
}

/// Get the current state of a chat session
async fn get_session(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let Some(session) = find_session(&state, &id) else {
        return session_not_found(&id);
    };
    let session = session.lock().await;

    Json(public::SessionResponse::new(&id, &session)).into_response()
}

/// End a chat session, discarding the transcript and API key
async fn end_session(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let removed = state
        .write()
        .expect("Unable to write share state")
        .end_session(&id);

    if removed {
        tracing::info!(session_id = %id, "Chat session ended");
        StatusCode::NO_CONTENT.into_response()
    } else {
        session_not_found(&id)
    }
}

/// Validate an API key and store it in the session if it works
async fn set_credential(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<public::CredentialRequest>,
) -> Response {
    let Some(session) = find_session(&state, &id) else {
        return session_not_found(&id);
    };
    let generator = state
        .read()
        .expect("Unable to read share state")
        .generator
        .clone();

    let mut session = session.lock().await;
    let (valid, message) = credential_status(
        session
            .set_credential(generator.as_ref(), &payload.api_key)
            .await,
    );

    let status = if valid {
        tracing::info!(session_id = %id, "API key validated");
        StatusCode::OK
    } else {
        tracing::warn!(session_id = %id, "API key rejected: {}", message);
        StatusCode::UNAUTHORIZED
    };
    (status, Json(public::CredentialResponse { valid, message })).into_response()
}

/// Send a message and wait for the assistant's reply
async fn send_message(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<public::SendMessageRequest>,
) -> Response {
    let Some(session) = find_session(&state, &id) else {
        return session_not_found(&id);
    };
    let generator = state
        .read()
        .expect("Unable to read share state")
        .generator
        .clone();

    let mut session = session.lock().await;
    session.set_input(&payload.message);

    match session.send_message(generator.as_ref()).await {
        Ok(turn) => {
            match &turn {
                Turn::Skipped => tracing::debug!(session_id = %id, "Ignoring blank message"),
                Turn::Fallback(_) => {
                    tracing::warn!(session_id = %id, "Model returned no text")
                }
                Turn::Failed { error, .. } => {
                    tracing::error!(session_id = %id, "Generation failed: {}", error)
                }
                Turn::Replied(_) => {}
            }
            Json(public::SessionResponse::new(&id, &session)).into_response()
        }
        // A missing key is the only error, anything else ends up in the
        // transcript
        Err(e) => (StatusCode::UNAUTHORIZED, e.to_string()).into_response(),
    }
}

/// Clear the conversation but keep the API key
async fn reset_session(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let Some(session) = find_session(&state, &id) else {
        return session_not_found(&id);
    };
    let mut session = session.lock().await;
    session.reset();

    Json(public::ResetResponse {
        message: RESET_MESSAGE.to_string(),
        session: public::SessionResponse::new(&id, &session),
    })
    .into_response()
}

/// Example questions to suggest in the UI
async fn examples() -> Json<public::ExamplesResponse> {
    let topics = EXAMPLE_QUESTIONS
        .iter()
        .map(|(title, questions)| public::ExampleTopic {
            title: title.to_string(),
            questions: questions.iter().map(|q| q.to_string()).collect(),
        })
        .collect();

    Json(public::ExamplesResponse { topics })
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).delete(end_session))
        .route("/sessions/{id}/credential", post(set_credential))
        .route("/sessions/{id}/messages", post(send_message))
        .route("/sessions/{id}/reset", post(reset_session))
        .route("/examples", get(examples))
}
