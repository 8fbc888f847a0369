//! In-memory per-chat sessions. Each session sits behind its own mutex so messages of one chat
//! are processed one at a time while different chats run in parallel. Sessions idle longer than
//! the session timeout are dropped by [`SessionStore::evict_idle`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use wagpt_core::Session;

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Arc<Mutex<Session>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session of `chat_id`, creating an empty one on first use.
    pub async fn get_or_create(&self, chat_id: &str) -> Arc<Mutex<Session>> {
        if let Some(session) = self.sessions.read().await.get(chat_id) {
            return session.clone();
        }
        self.sessions
            .write()
            .await
            .entry(chat_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(chat_id))))
            .clone()
    }

    pub async fn get(&self, chat_id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(chat_id).cloned()
    }

    pub async fn remove(&self, chat_id: &str) {
        self.sessions.write().await.remove(chat_id);
    }

    /// Drops sessions untouched for at least `max_idle` and returns how many were dropped.
    /// Sessions someone still holds a handle to are kept.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| {
            if Arc::strong_count(session) > 1 {
                return true;
            }
            match session.try_lock() {
                Ok(session) => session.idle_for() < max_idle,
                Err(_) => true,
            }
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wagpt_core::ChatRecord;

    #[tokio::test]
    async fn test_get_or_create_returns_same_session() {
        let store = SessionStore::new();
        let first = store.get_or_create("100@c.us").await;
        first.lock().await.history = Some(vec![ChatRecord::system("s")]);

        let again = store.get_or_create("100@c.us").await;
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(again.lock().await.history.as_ref().map(Vec::len), Some(1));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_new_session_has_no_history_and_remove_forgets_it() {
        let store = SessionStore::new();
        assert!(store.get("200@c.us").await.is_none());

        let session = store.get_or_create("200@c.us").await;
        assert!(session.lock().await.history.is_none());

        store.remove("200@c.us").await;
        assert!(store.get("200@c.us").await.is_none());
    }

    #[tokio::test]
    async fn test_evict_idle_drops_only_stale_sessions() {
        let store = SessionStore::new();
        let stale = store.get_or_create("300@c.us").await;
        stale.lock().await.last_activity = Utc::now() - chrono::Duration::minutes(45);
        drop(stale);
        let fresh = store.get_or_create("301@c.us").await;
        fresh.lock().await.touch();
        drop(fresh);

        assert_eq!(store.evict_idle(Duration::from_secs(30 * 60)).await, 1);
        assert!(store.get("300@c.us").await.is_none());
        assert!(store.get("301@c.us").await.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_evict_idle_keeps_sessions_in_use() {
        let store = SessionStore::new();
        let held = store.get_or_create("400@c.us").await;
        held.lock().await.last_activity = Utc::now() - chrono::Duration::hours(2);

        assert_eq!(store.evict_idle(Duration::from_secs(60)).await, 0);
        assert!(store.get("400@c.us").await.is_some());

        drop(held);
        assert_eq!(store.evict_idle(Duration::from_secs(60)).await, 1);
        assert_eq!(store.len().await, 0);
    }
}
