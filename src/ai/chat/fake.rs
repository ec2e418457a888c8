use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::gemini::{GenerationError, TextGenerator};

type Reply = Result<Option<String>, GenerationError>;

/// Replays canned replies in order and records every call as
/// `(api_key, prompt)`.
pub struct FakeGenerator {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeGenerator {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, api_key: &str, prompt: &str) -> Reply {
        self.calls
            .lock()
            .unwrap()
            .push((api_key.to_string(), prompt.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Network("no reply queued".to_string())))
    }
}
