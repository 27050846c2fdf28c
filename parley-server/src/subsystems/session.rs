//! Per-conversation session state.
//!
//! Sessions are created lazily on first use with the server language and are
//! never removed. Each session sits behind its own async mutex; the dispatcher
//! holds that lock for the whole handling of an event, so events for one
//! conversation are processed one at a time while different conversations
//! proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use parley_core::LanguageCode;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSession {
    pub language: LanguageCode,
}

pub type SessionGuard = OwnedMutexGuard<ConversationSession>;

#[derive(Clone)]
pub struct SessionStore {
    default_language: LanguageCode,
    sessions: Arc<Mutex<HashMap<String, Arc<AsyncMutex<ConversationSession>>>>>,
}

impl SessionStore {
    pub fn new(default_language: LanguageCode) -> Self {
        Self {
            default_language,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn entry(&self, conversation_id: &str) -> Arc<AsyncMutex<ConversationSession>> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions
            .entry(conversation_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(conversation_id = conversation_id, "Creating session");
                Arc::new(AsyncMutex::new(ConversationSession {
                    language: self.default_language,
                }))
            })
            .clone()
    }

    /// Exclusive access to a conversation's session, creating it if unseen.
    pub async fn acquire(&self, conversation_id: &str) -> SessionGuard {
        self.entry(conversation_id).lock_owned().await
    }

    /// Current language of a conversation (the default for unseen ones).
    pub async fn language(&self, conversation_id: &str) -> LanguageCode {
        let existing = {
            let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
            sessions.get(conversation_id).cloned()
        };
        match existing {
            Some(session) => session.lock().await.language,
            None => self.default_language,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn default_language(&self) -> LanguageCode {
        self.default_language
    }
}
