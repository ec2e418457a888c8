use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::ai::chat::ChatSession;
use crate::core::AppConfig;
use crate::gemini::SharedGenerator;

/// A session is locked for the whole of an operation, including the
/// round trip to the model, so requests for one session run one at a
/// time.
pub type SharedSession = Arc<Mutex<ChatSession>>;

struct SessionEntry {
    session: SharedSession,
    last_used: Instant,
}

impl SessionEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.last_used) >= ttl
    }
}

pub struct AppState {
    pub config: AppConfig,
    pub generator: SharedGenerator,
    // Active chat sessions keyed by session ID
    sessions: HashMap<String, SessionEntry>,
}

impl AppState {
    pub fn new(config: AppConfig, generator: SharedGenerator) -> Self {
        Self {
            config,
            generator,
            sessions: HashMap::new(),
        }
    }

    /// Starts a new session and returns its ID along with the session.
    /// Idle sessions are discarded first.
    pub fn create_session(&mut self) -> (String, SharedSession) {
        self.sweep_idle_sessions();

        let id = Uuid::new_v4().to_string();
        let session = Arc::new(Mutex::new(ChatSession::new(&self.config.system_preamble)));
        self.sessions.insert(
            id.clone(),
            SessionEntry {
                session: Arc::clone(&session),
                last_used: Instant::now(),
            },
        );
        (id, session)
    }

    /// Looks up a session and marks it as used. A session that has been
    /// idle past the TTL is discarded and treated as missing.
    pub fn session(&mut self, id: &str) -> Option<SharedSession> {
        let now = Instant::now();
        let ttl = self.config.session_ttl;
        let entry = self.sessions.get_mut(id)?;

        if entry.is_expired(now, ttl) {
            self.sessions.remove(id);
            tracing::info!(session_id = %id, "Chat session expired");
            return None;
        }

        entry.last_used = now;
        Some(Arc::clone(&entry.session))
    }

    /// Ends a session, discarding its state. Returns `false` if there
    /// was no such session.
    pub fn end_session(&mut self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn sweep_idle_sessions(&mut self) {
        let now = Instant::now();
        let ttl = self.config.session_ttl;
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| !entry.is_expired(now, ttl));

        let swept = before - self.sessions.len();
        if swept > 0 {
            tracing::info!("Discarded {} idle chat sessions", swept);
        }
    }
}
