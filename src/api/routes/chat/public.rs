//! Public types for the chat API
use serde::{Deserialize, Serialize};

use crate::ai::chat::{ChatSession, GREETING, Message, SessionState};

/// Everything the UI needs to render a session. The API key itself is
/// never sent back.
#[derive(Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub state: SessionState,
    pub has_credential: bool,
    pub transcript: Vec<Message>,
    // Only set while the transcript is empty
    pub greeting: Option<String>,
}

impl SessionResponse {
    pub fn new(session_id: &str, session: &ChatSession) -> Self {
        Self {
            session_id: session_id.to_string(),
            state: session.state(),
            has_credential: session.has_credential(),
            transcript: session.transcript().messages(),
            greeting: session
                .transcript()
                .is_empty()
                .then(|| GREETING.to_string()),
        }
    }
}

#[derive(Deserialize)]
pub struct CredentialRequest {
    pub api_key: String,
}

#[derive(Serialize, Deserialize)]
pub struct CredentialResponse {
    pub valid: bool,
    pub message: String,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct ResetResponse {
    pub message: String,
    #[serde(flatten)]
    pub session: SessionResponse,
}

#[derive(Serialize, Deserialize)]
pub struct ExampleTopic {
    pub title: String,
    pub questions: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ExamplesResponse {
    pub topics: Vec<ExampleTopic>,
}
