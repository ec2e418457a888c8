//! Client for the Gemini `generateContent` endpoint of the Generative
//! Language API.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

pub const DEFAULT_GEMINI_API_HOST: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The API answered with a non-success status.
    #[error("{status} {message}")]
    Api { status: u16, message: String },
    #[error("{0}")]
    Network(String),
    #[error("Unable to decode response: {0}")]
    Decode(String),
}

/// Anything that can turn a prompt into text on behalf of an API key.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns `Ok(None)` when the call succeeded but the model
    /// produced no text (e.g. the prompt was blocked).
    async fn generate(&self, api_key: &str, prompt: &str)
    -> Result<Option<String>, GenerationError>;
}

pub type SharedGenerator = Arc<dyn TextGenerator>;

#[derive(Clone)]
pub struct GeminiClient {
    api_hostname: String,
    model: String,
    http: reqwest::Client,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_hostname", &self.api_hostname)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(api_hostname: &str, model: &str) -> Self {
        Self {
            api_hostname: api_hostname.to_string(),
            model: model.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_hostname.trim_end_matches('/'),
            self.model
        )
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new(DEFAULT_GEMINI_API_HOST, DEFAULT_GEMINI_MODEL)
    }
}

/// Concatenates the text parts of the first candidate. Responses
/// without candidates or text parts yield `None`.
fn response_text(resp: &Value) -> Option<String> {
    let text: String = resp["candidates"][0]["content"]["parts"]
        .as_array()?
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();

    if text.is_empty() { None } else { Some(text) }
}

// Google wraps failures as `{"error": {"code", "message", "status"}}`
// but proxies in front of it may not, so fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        api_key: &str,
        prompt: &str,
    ) -> Result<Option<String>, GenerationError> {
        let payload = json!({
            "contents": [
                { "parts": [{ "text": prompt }] }
            ]
        });

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Gemini request");

        let response = self
            .http
            .post(self.api_url())
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let resp: Value =
            serde_json::from_str(&body).map_err(|e| GenerationError::Decode(e.to_string()))?;

        Ok(response_text(&resp))
    }
}
