//! Per-session synthesis state
//!
//! Each MCP session carries its own voice selection so one caller's
//! `set_voice` never changes the voice another caller hears. The stdio
//! transport uses a single session; HTTP clients get one per `initialize`.
//! HTTP requests without a session header share [`SessionStore::shared`].
//! Sessions idle past the timeout expire, and the oldest are evicted once
//! the store is full.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

/// Sessions unused for this long are dropped
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Upper bound on live HTTP sessions
pub const DEFAULT_MAX_SESSIONS: usize = 256;

/// State scoped to one MCP session
#[derive(Debug)]
pub struct Session {
    id: String,
    voice_id: RwLock<String>,
    last_seen: Mutex<Instant>,
}

impl Session {
    #[must_use]
    pub fn new(id: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            voice_id: RwLock::new(voice_id.into()),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Voice used for synthesis in this session
    pub async fn voice_id(&self) -> String {
        self.voice_id.read().await.clone()
    }

    pub async fn set_voice_id(&self, voice_id: impl Into<String>) {
        *self.voice_id.write().await = voice_id.into();
    }

    fn last_seen(&self) -> Instant {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn is_idle(&self, timeout: Duration) -> bool {
        self.last_seen().elapsed() >= timeout
    }
}

/// Registry of live sessions
#[derive(Debug)]
pub struct SessionStore {
    default_voice_id: String,
    shared: Arc<Session>,
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(default_voice_id: impl Into<String>) -> Self {
        Self::with_limits(default_voice_id, DEFAULT_MAX_SESSIONS, DEFAULT_IDLE_TIMEOUT)
    }

    /// Store holding at most `max_sessions`, each expiring after `idle_timeout`
    #[must_use]
    pub fn with_limits(
        default_voice_id: impl Into<String>,
        max_sessions: usize,
        idle_timeout: Duration,
    ) -> Self {
        let default_voice_id = default_voice_id.into();
        Self {
            shared: Arc::new(Session::new("shared", default_voice_id.clone())),
            default_voice_id,
            sessions: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            idle_timeout,
        }
    }

    /// Session used by stdio and by HTTP requests without a session id
    #[must_use]
    pub fn shared(&self) -> Arc<Session> {
        Arc::clone(&self.shared)
    }

    /// Start a new session with the default voice
    ///
    /// Expired sessions are dropped first; if the store is still full the
    /// least recently used one is evicted.
    pub async fn create(&self) -> Arc<Session> {
        let id = Uuid::new_v4().to_string();
        let session = Arc::new(Session::new(id.clone(), self.default_voice_id.clone()));

        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions);
        sessions.insert(id, Arc::clone(&session));
        drop(sessions);

        tracing::debug!(session = %session.id(), "session created");
        session
    }

    /// Look up a live session and mark it used
    pub async fn get(&self, id: &str) -> Option<Arc<Session>> {
        let session = self.sessions.read().await.get(id).cloned()?;

        if session.is_idle(self.idle_timeout) {
            self.sessions.write().await.remove(id);
            tracing::debug!(session = id, "session expired");
            return None;
        }

        session.touch();
        Some(session)
    }

    /// End a session; returns false if it was unknown
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::debug!(session = id, "session closed");
        }
        removed
    }

    fn prune(&self, sessions: &mut HashMap<String, Arc<Session>>) {
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_idle(self.idle_timeout));

        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, session)| session.last_seen())
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
        }

        let dropped = before - sessions.len();
        if dropped > 0 {
            tracing::debug!(dropped, remaining = sessions.len(), "pruned sessions");
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sessions_start_with_default_voice() {
        let store = SessionStore::new("george");
        let session = store.create().await;
        assert_eq!(session.voice_id().await, "george");
        assert_eq!(store.shared().voice_id().await, "george");
    }

    #[tokio::test]
    async fn test_voice_is_isolated_per_session() {
        let store = SessionStore::new("george");
        let a = store.create().await;
        let b = store.create().await;

        a.set_voice_id("v1").await;

        assert_eq!(a.voice_id().await, "v1");
        assert_eq!(b.voice_id().await, "george");
        assert_eq!(store.shared().voice_id().await, "george");
    }

    #[tokio::test]
    async fn test_lookup_and_remove() {
        let store = SessionStore::new("george");
        let session = store.create().await;
        let id = session.id().to_string();

        assert!(store.get(&id).await.is_some());
        assert_eq!(store.len().await, 1);
        assert!(store.remove(&id).await);
        assert!(!store.remove(&id).await);
        assert!(store.get(&id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_full_store_evicts_least_recently_used() {
        let store = SessionStore::with_limits("george", 2, DEFAULT_IDLE_TIMEOUT);
        let first = store.create().await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = store.create().await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        // Using the first session makes the second the oldest
        assert!(store.get(first.id()).await.is_some());
        tokio::time::sleep(Duration::from_millis(5)).await;
        let third = store.create().await;

        assert_eq!(store.len().await, 2);
        assert!(store.get(first.id()).await.is_some());
        assert!(store.get(second.id()).await.is_none());
        assert!(store.get(third.id()).await.is_some());
    }

    #[tokio::test]
    async fn test_many_creates_stay_bounded() {
        let store = SessionStore::with_limits("george", 8, DEFAULT_IDLE_TIMEOUT);
        for _ in 0..100 {
            store.create().await;
        }
        assert_eq!(store.len().await, 8);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let store = SessionStore::with_limits("george", 8, Duration::ZERO);
        let session = store.create().await;

        assert!(store.get(session.id()).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_expired_sessions_are_pruned_on_create() {
        let store = SessionStore::with_limits("george", 8, Duration::from_millis(20));
        store.create().await;
        store.create().await;
        tokio::time::sleep(Duration::from_millis(40)).await;

        store.create().await;
        assert_eq!(store.len().await, 1);
    }
}
