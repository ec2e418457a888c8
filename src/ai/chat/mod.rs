//! Conversation state and the operations a user performs on it.

mod credential;
mod error;
#[cfg(test)]
pub(crate) mod fake;
mod models;
mod session;

pub use credential::{PROBE_PROMPT, check_api_key, credential_status, validate_api_key};
pub use error::ChatError;
pub use models::{Message, Role, Transcript};
pub use session::{ChatSession, FALLBACK_REPLY, GREETING, SessionState, Turn};
