//! API key validation by way of a single probe request.

use crate::gemini::TextGenerator;

use super::error::ChatError;

pub const PROBE_PROMPT: &str = "Hello, this is a test prompt to validate the API key.";

const VALIDATED: &str = "API key successfully validated.";
const NO_RESPONSE: &str = "API key validation failed. No response received.";

/// Sends the probe prompt with `api_key`. Any failure, including a
/// reply without text, is reported as `ChatError::CredentialInvalid`
/// with a message suitable for showing to the user. Never retries.
pub async fn validate_api_key(
    generator: &dyn TextGenerator,
    api_key: &str,
) -> Result<String, ChatError> {
    match generator.generate(api_key, PROBE_PROMPT).await {
        Ok(Some(text)) if !text.is_empty() => Ok(VALIDATED.to_string()),
        Ok(_) => Err(ChatError::CredentialInvalid(NO_RESPONSE.to_string())),
        Err(e) => Err(ChatError::CredentialInvalid(format!(
            "API key validation error: {}",
            e
        ))),
    }
}

/// Flattens a validation result into the `(valid, message)` pair the
/// UI displays.
pub fn credential_status(result: Result<String, ChatError>) -> (bool, String) {
    match result {
        Ok(message) => (true, message),
        Err(e) => (false, e.to_string()),
    }
}

/// Same as `validate_api_key` but flattened with `credential_status`.
pub async fn check_api_key(generator: &dyn TextGenerator, api_key: &str) -> (bool, String) {
    credential_status(validate_api_key(generator, api_key).await)
}
