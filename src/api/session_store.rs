//! In-memory session store (non-persistent).
//!
//! Sessions live until deleted or until they sit idle past the configured
//! timeout; see [`SessionStore::evict_idle`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use crate::session::ChatSession;

/// Shared handle to one session. The mutex keeps a session to one question at a time.
pub type SessionHandle = Arc<Mutex<ChatSession>>;

struct Entry {
    handle: SessionHandle,
    last_active: Instant,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `session` under a fresh id.
    pub async fn create(&self, session: ChatSession) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(session));
        let entry = Entry {
            handle: handle.clone(),
            last_active: Instant::now(),
        };
        self.sessions.write().await.insert(id, entry);
        (id, handle)
    }

    /// Look up a session and mark it active.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_active = Instant::now();
        Some(entry.handle.clone())
    }

    /// Drop a session. Returns false if it did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drop sessions not touched within `max_idle`. Sessions that are
    /// answering a question right now are kept. Returns how many were dropped.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let busy = entry.handle.try_lock().is_err();
            let keep = busy || entry.last_active.elapsed() < max_idle;
            if !keep {
                tracing::debug!(session_id = %id, "Evicting idle session");
            }
            keep
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
