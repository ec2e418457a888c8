use handlebars::RenderError;

use crate::gemini::GenerationError;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Carries the message shown to whoever submitted the key.
    #[error("{0}")]
    CredentialInvalid(String),
    #[error("No API key has been set for this session")]
    MissingCredential,
    #[error(transparent)]
    GenerationFailed(#[from] GenerationError),
    #[error("Unable to build prompt: {0}")]
    Prompt(#[from] RenderError),
}
