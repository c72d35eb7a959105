//! In-memory session store.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::session::Session;

/// Shared handle to one session. Locking it serializes that user's updates.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Owns every session, keyed by chat ID. Sessions are never evicted.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<i64, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an existing session without creating one.
    pub async fn find(&self, id: i64) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        let found = sessions.get(&id).cloned();
        debug!(chat_id = %id, found = found.is_some(), "Session lookup");
        found
    }

    /// Return the session for `id`, creating a default one if absent.
    ///
    /// Concurrent callers for the same `id` always get the same session.
    pub async fn get_or_create(&self, id: i64) -> SessionHandle {
        if let Some(existing) = self.sessions.read().await.get(&id) {
            return Arc::clone(existing);
        }

        let mut sessions = self.sessions.write().await;
        let handle = sessions.entry(id).or_insert_with(|| {
            debug!(chat_id = %id, "Session created");
            Arc::new(Mutex::new(Session::new(id)))
        });
        Arc::clone(handle)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
