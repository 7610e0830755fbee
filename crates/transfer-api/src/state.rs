//! Application state and the in-memory session registry.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use transfer_core::{Config, SessionState};
use transfer_processing::DocumentRenderer;
use transfer_services::{EmailLogo, NotificationDispatcher};
use uuid::Uuid;

/// One session's state behind its own lock, so actions within a session run in order.
pub type SharedSession = Arc<Mutex<SessionState>>;

struct SessionEntry {
    session: SharedSession,
    last_access: Instant,
}

impl SessionEntry {
    /// No handler holds the session right now.
    fn is_idle(&self) -> bool {
        Arc::strong_count(&self.session) == 1
    }
}

/// Live sessions keyed by the id stored in the session cookie. Nothing is persisted.
///
/// Sessions idle for longer than the timeout are dropped by [`SessionStore::evict_idle`],
/// and creating a session beyond the cap drops the least recently used idle one. Either
/// way the session's document directory under the output dir goes with it.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, SessionEntry>>>,
    output_dir: PathBuf,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        idle_timeout: Duration,
        max_sessions: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            output_dir: output_dir.into(),
            idle_timeout,
            max_sessions,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.output_dir(),
            config.session_idle_timeout(),
            config.max_sessions(),
        )
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Directory holding the documents rendered for one session.
    pub fn session_dir(&self, id: Uuid) -> PathBuf {
        self.output_dir.join(id.to_string())
    }

    pub async fn create(&self) -> (Uuid, SharedSession) {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(SessionState::new()));
        let evicted = {
            let mut sessions = self.inner.lock().await;
            let evicted = if sessions.len() >= self.max_sessions {
                least_recently_used_idle(&sessions)
            } else {
                None
            };
            if let Some(old) = evicted {
                sessions.remove(&old);
            } else if sessions.len() >= self.max_sessions {
                tracing::warn!(
                    sessions = sessions.len(),
                    max_sessions = self.max_sessions,
                    "Session cap reached and every session is busy"
                );
            }
            sessions.insert(
                id,
                SessionEntry {
                    session: session.clone(),
                    last_access: Instant::now(),
                },
            );
            evicted
        };
        if let Some(old) = evicted {
            tracing::info!(session_id = %old, "Session evicted to stay under the cap");
            self.discard_documents(old).await;
        }
        tracing::debug!(session_id = %id, "Session created");
        (id, session)
    }

    /// Look a session up and mark it as used.
    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        let mut sessions = self.inner.lock().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_access = Instant::now();
        Some(entry.session.clone())
    }

    /// Drop every idle session not used within the idle timeout. Returns the evicted ids.
    pub async fn evict_idle(&self) -> Vec<Uuid> {
        let now = Instant::now();
        let expired: Vec<Uuid> = {
            let mut sessions = self.inner.lock().await;
            let expired: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, entry)| {
                    entry.is_idle() && now.duration_since(entry.last_access) >= self.idle_timeout
                })
                .map(|(id, _)| *id)
                .collect();
            for id in &expired {
                sessions.remove(id);
            }
            expired
        };
        for id in &expired {
            self.discard_documents(*id).await;
        }
        expired
    }

    /// Remove the session's rendered documents. A missing directory is not an error.
    pub async fn discard_documents(&self, id: Uuid) {
        let dir = self.session_dir(id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => tracing::debug!(session_id = %id, "Session documents removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                session_id = %id,
                dir = %dir.display(),
                error = %e,
                "Failed to remove session documents"
            ),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

fn least_recently_used_idle(sessions: &HashMap<Uuid, SessionEntry>) -> Option<Uuid> {
    sessions
        .iter()
        .filter(|(_, entry)| entry.is_idle())
        .min_by_key(|(_, entry)| entry.last_access)
        .map(|(id, _)| *id)
}

pub struct AppState {
    pub config: Arc<Config>,
    pub renderer: Arc<DocumentRenderer>,
    pub dispatcher: NotificationDispatcher,
    pub email_logo: Option<EmailLogo>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        renderer: DocumentRenderer,
        dispatcher: NotificationDispatcher,
        email_logo: Option<EmailLogo>,
    ) -> Self {
        Self {
            renderer: Arc::new(renderer),
            dispatcher,
            email_logo,
            sessions: SessionStore::from_config(&config),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn with_document(store: &SessionStore, id: Uuid) -> PathBuf {
        let dir = store.session_dir(id);
        tokio::fs::create_dir_all(&dir).await.expect("session dir");
        tokio::fs::write(dir.join("request.pdf"), b"%PDF")
            .await
            .expect("document");
        dir
    }

    #[tokio::test]
    async fn test_idle_sessions_evicted_with_their_documents() {
        let output = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(output.path(), Duration::ZERO, 10);
        let (id, session) = store.create().await;
        drop(session);
        let dir = with_document(&store, id).await;

        assert_eq!(store.evict_idle().await, vec![id]);
        assert!(store.get(id).await.is_none());
        assert!(store.is_empty().await);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_recently_used_sessions_survive_sweep() {
        let output = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(output.path(), Duration::from_secs(3600), 10);
        let (id, session) = store.create().await;
        drop(session);

        assert!(store.evict_idle().await.is_empty());
        assert!(store.get(id).await.is_some());
    }

    #[tokio::test]
    async fn test_session_in_use_is_never_evicted() {
        let output = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(output.path(), Duration::ZERO, 10);
        let (id, session) = store.create().await;
        let guard = session.lock().await;

        assert!(store.evict_idle().await.is_empty());
        assert_eq!(store.len().await, 1);
        drop(guard);
        drop(session);
        assert_eq!(store.evict_idle().await, vec![id]);
    }

    #[tokio::test]
    async fn test_cap_evicts_least_recently_used() {
        let output = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(output.path(), Duration::from_secs(3600), 2);
        let (first, _) = store.create().await;
        let (second, _) = store.create().await;
        let first_dir = with_document(&store, first).await;
        assert!(store.get(second).await.is_some());
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(store.get(first).await.is_some());

        let (third, _) = store.create().await;

        assert_eq!(store.len().await, 2);
        assert!(store.get(second).await.is_none());
        assert!(store.get(first).await.is_some());
        assert!(store.get(third).await.is_some());
        assert!(first_dir.exists());
    }

    #[tokio::test]
    async fn test_cap_exceeded_when_every_session_is_busy() {
        let output = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(output.path(), Duration::from_secs(3600), 1);
        let (first, held) = store.create().await;
        let (second, _) = store.create().await;

        assert_eq!(store.len().await, 2);
        assert!(store.get(first).await.is_some());
        assert!(store.get(second).await.is_some());
        drop(held);
    }

    #[tokio::test]
    async fn test_discard_documents_tolerates_missing_dir() {
        let output = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(output.path(), Duration::ZERO, 10);
        store.discard_documents(Uuid::new_v4()).await;
        assert!(output.path().exists());
    }
}
