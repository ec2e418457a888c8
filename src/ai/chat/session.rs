use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ai::prompt::conversation_prompt;
use crate::gemini::TextGenerator;

use super::credential::validate_api_key;
use super::error::ChatError;
use super::models::{Message, Role, Transcript};

pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't generate a response.";

/// Shown in place of an empty conversation. Display only, it is never
/// added to the transcript or sent to the model.
pub const GREETING: &str = "👋 Hello! I'm your Generative AI assistant, developed by Naadir, here to assist you with coding challenges, Excel queries, VBA scripts, Power Query, M code, and more. Feel free to ask me anything to streamline your data analysis tasks!";

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NoCredential,
    AwaitingInput,
}

/// What happened to the transcript as a result of `send_message`.
#[derive(Debug)]
pub enum Turn {
    /// The input was blank so nothing was sent or recorded.
    Skipped,
    Replied(Message),
    /// The model answered without any text.
    Fallback(Message),
    /// The call failed. `reply` is the error text that was recorded in
    /// the transcript in place of an answer.
    Failed { reply: Message, error: ChatError },
}

impl Turn {
    pub fn reply(&self) -> Option<&Message> {
        match self {
            Turn::Skipped => None,
            Turn::Replied(msg) | Turn::Fallback(msg) => Some(msg),
            Turn::Failed { reply, .. } => Some(reply),
        }
    }
}

/// All of the state for one user's conversation: the API key, the
/// transcript and the pending input. One instance per user session,
/// dropped when the session ends.
pub struct ChatSession {
    preamble: String,
    credential: String,
    transcript: Transcript,
    input: String,
}

impl fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatSession")
            .field("credential", &"[REDACTED]")
            .field("transcript", &self.transcript)
            .field("input", &self.input)
            .finish()
    }
}

impl ChatSession {
    pub fn new(preamble: &str) -> Self {
        Self {
            preamble: preamble.to_string(),
            credential: String::new(),
            transcript: Transcript::new(),
            input: String::new(),
        }
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn has_credential(&self) -> bool {
        !self.credential.is_empty()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: &str) {
        self.input = input.to_string();
    }

    pub fn state(&self) -> SessionState {
        if self.has_credential() {
            SessionState::AwaitingInput
        } else {
            SessionState::NoCredential
        }
    }

    /// Validates `api_key` and stores it only if validation succeeds.
    /// The key is not checked again before later calls.
    pub async fn set_credential(
        &mut self,
        generator: &dyn TextGenerator,
        api_key: &str,
    ) -> Result<String, ChatError> {
        let message = validate_api_key(generator, api_key).await?;
        self.credential = api_key.to_string();
        Ok(message)
    }

    /// Sends the pending input along with the conversation so far and
    /// records the reply.
    ///
    /// Generation failures are not returned as `Err`. They are written
    /// to the transcript as an `"Error: ..."` assistant turn and handed
    /// back in `Turn::Failed` so the caller can decide whether to log
    /// them. The only `Err` is `ChatError::MissingCredential`, in which
    /// case nothing is changed.
    pub async fn send_message(&mut self, generator: &dyn TextGenerator) -> Result<Turn, ChatError> {
        if !self.has_credential() {
            return Err(ChatError::MissingCredential);
        }
        if self.input.trim().is_empty() {
            return Ok(Turn::Skipped);
        }

        let user_input = std::mem::take(&mut self.input);
        self.transcript.push(Message::new(Role::User, &user_input));

        let turn = match self.complete(generator).await {
            Ok(Some(text)) if !text.trim().is_empty() => {
                Turn::Replied(Message::new(Role::Assistant, text.trim()))
            }
            Ok(_) => Turn::Fallback(Message::new(Role::Assistant, FALLBACK_REPLY)),
            Err(error) => Turn::Failed {
                reply: Message::new(Role::Assistant, &format!("Error: {}", error)),
                error,
            },
        };

        if let Some(reply) = turn.reply() {
            self.transcript.push(reply.clone());
        }

        Ok(turn)
    }

    async fn complete(&self, generator: &dyn TextGenerator) -> Result<Option<String>, ChatError> {
        let prompt = conversation_prompt(&self.preamble, &self.transcript)?;
        let text = generator.generate(&self.credential, &prompt).await?;
        Ok(text)
    }

    /// Clears the conversation. The API key and pending input are kept.
    pub fn reset(&mut self) {
        self.transcript.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::chat::fake::FakeGenerator;
    use crate::gemini::GenerationError;

    const PREAMBLE: &str = "You are a test assistant.";

    async fn session_with_key() -> ChatSession {
        let generator = FakeGenerator::new(vec![Ok(Some("ok".to_string()))]);
        let mut session = ChatSession::new(PREAMBLE);
        session.set_credential(&generator, "test-key").await.unwrap();
        session
    }

    #[test]
    fn test_new_session_has_no_credential() {
        let session = ChatSession::new(PREAMBLE);
        assert_eq!(session.state(), SessionState::NoCredential);
        assert!(session.transcript().is_empty());
        assert_eq!(session.input(), "");
    }

    #[test]
    fn test_debug_redacts_credential() {
        let mut session = ChatSession::new(PREAMBLE);
        session.credential = "super-secret".to_string();
        let debug = format!("{:?}", session);
        assert!(!debug.contains("super-secret"));
    }

    #[tokio::test]
    async fn test_set_credential_failure_keeps_session_unset() {
        let generator = FakeGenerator::new(vec![Err(GenerationError::Api {
            status: 400,
            message: "API key not valid.".to_string(),
        })]);
        let mut session = ChatSession::new(PREAMBLE);

        let result = session.set_credential(&generator, "bad-key").await;

        assert!(matches!(result, Err(ChatError::CredentialInvalid(_))));
        assert_eq!(session.state(), SessionState::NoCredential);
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_set_credential_success() {
        let session = session_with_key().await;
        assert_eq!(session.state(), SessionState::AwaitingInput);
        assert_eq!(session.credential(), "test-key");
    }

    #[tokio::test]
    async fn test_send_without_credential_is_refused() {
        let generator = FakeGenerator::new(vec![]);
        let mut session = ChatSession::new(PREAMBLE);
        session.set_input("Hello");

        let result = session.send_message(&generator).await;

        assert!(matches!(result, Err(ChatError::MissingCredential)));
        assert!(session.transcript().is_empty());
        assert_eq!(session.input(), "Hello");
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_input_is_ignored() {
        let generator = FakeGenerator::new(vec![]);
        let mut session = session_with_key().await;
        session.set_input("  \n\t ");

        let turn = session.send_message(&generator).await.unwrap();

        assert!(matches!(turn, Turn::Skipped));
        assert!(session.transcript().is_empty());
        assert!(generator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_send_appends_user_then_assistant() {
        let generator = FakeGenerator::new(vec![Ok(Some("  Hi! How can I help?\n".to_string()))]);
        let mut session = session_with_key().await;
        session.set_input("Hello");

        let turn = session.send_message(&generator).await.unwrap();

        assert!(matches!(turn, Turn::Replied(_)));
        assert_eq!(
            session.transcript().messages(),
            vec![
                Message::new(Role::User, "Hello"),
                Message::new(Role::Assistant, "Hi! How can I help?"),
            ]
        );
        assert_eq!(session.input(), "");
    }

    #[tokio::test]
    async fn test_prompt_includes_preamble_history_and_cue() {
        let generator = FakeGenerator::new(vec![
            Ok(Some("first reply".to_string())),
            Ok(Some("second reply".to_string())),
        ]);
        let mut session = session_with_key().await;

        session.set_input("first");
        session.send_message(&generator).await.unwrap();
        session.set_input("second");
        session.send_message(&generator).await.unwrap();

        let calls = generator.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "test-key");
        assert_eq!(
            calls[0].1,
            "You are a test assistant.\nUser: first\nAssistant:"
        );
        assert_eq!(
            calls[1].1,
            "You are a test assistant.\nUser: first\nAssistant: first reply\nUser: second\nAssistant:"
        );
        // The preamble is never part of the visible transcript
        assert!(session.transcript().iter().all(|m| m.content != PREAMBLE));
        assert_eq!(session.transcript().len(), 4);
    }

    #[tokio::test]
    async fn test_empty_reply_uses_fallback() {
        let generator = FakeGenerator::new(vec![Ok(None), Ok(Some("   ".to_string()))]);
        let mut session = session_with_key().await;

        session.set_input("Hello");
        let turn = session.send_message(&generator).await.unwrap();
        assert!(matches!(turn, Turn::Fallback(_)));

        session.set_input("Again");
        session.send_message(&generator).await.unwrap();

        let messages = session.transcript().messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].content, FALLBACK_REPLY);
        assert_eq!(messages[3].content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_failure_is_recorded_as_error_turn() {
        let generator = FakeGenerator::new(vec![Err(GenerationError::Network(
            "timeout".to_string(),
        ))]);
        let mut session = session_with_key().await;
        session.set_input("Hello");

        let turn = session.send_message(&generator).await.unwrap();

        match &turn {
            Turn::Failed { reply, error } => {
                assert_eq!(reply.content, "Error: timeout");
                assert!(matches!(error, ChatError::GenerationFailed(_)));
            }
            other => panic!("Unexpected turn: {:?}", other),
        }
        let messages = session.transcript().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::new(Role::User, "Hello"));
        assert_eq!(messages[1], Message::new(Role::Assistant, "Error: timeout"));
        // A failed turn doesn't lose the key
        assert_eq!(session.state(), SessionState::AwaitingInput);
    }

    #[tokio::test]
    async fn test_reset_keeps_credential_and_input() {
        let generator = FakeGenerator::new(vec![Ok(Some("reply".to_string()))]);
        let mut session = session_with_key().await;
        session.set_input("Hello");
        session.send_message(&generator).await.unwrap();
        session.set_input("draft");

        session.reset();

        assert!(session.transcript().is_empty());
        assert_eq!(session.credential(), "test-key");
        assert_eq!(session.input(), "draft");

        // Resetting an empty conversation is fine too
        session.reset();
        assert!(session.transcript().is_empty());
    }
}
