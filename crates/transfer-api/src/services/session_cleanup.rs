use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::state::SessionStore;

/// Upper bound between sweeps; shorter idle timeouts sweep at their own pace.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically drops sessions that have been idle past the configured timeout.
#[derive(Clone)]
pub struct SessionCleanupService {
    sessions: SessionStore,
}

impl SessionCleanupService {
    pub fn new(sessions: SessionStore) -> Self {
        Self { sessions }
    }

    fn period(&self) -> Duration {
        self.sessions.idle_timeout().min(SWEEP_INTERVAL)
    }

    /// Start the background sweep.
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(self.period());

            loop {
                sweep_interval.tick().await;
                self.sweep().await;
            }
        })
    }

    #[tracing::instrument(skip(self), fields(cleanup.operation = "idle_sessions"))]
    pub async fn sweep(&self) -> usize {
        let evicted = self.sessions.evict_idle().await;
        if !evicted.is_empty() {
            let remaining = self.sessions.len().await;
            tracing::info!(
                evicted = evicted.len(),
                remaining = remaining,
                "Idle sessions evicted"
            );
        }
        evicted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sweep_counts_evicted_sessions() {
        let output = tempfile::tempdir().expect("tempdir");
        let sessions = SessionStore::new(output.path(), Duration::ZERO, 10);
        let _ = sessions.create().await;
        let _ = sessions.create().await;
        let service = SessionCleanupService::new(sessions.clone());

        assert_eq!(service.sweep().await, 2);
        assert!(sessions.is_empty().await);
        assert_eq!(service.sweep().await, 0);
    }

    #[test]
    fn test_period_never_exceeds_idle_timeout() {
        let sessions = SessionStore::new("out", Duration::from_secs(5), 10);
        assert_eq!(SessionCleanupService::new(sessions).period(), Duration::from_secs(5));
        let sessions = SessionStore::new("out", Duration::from_secs(7200), 10);
        assert_eq!(SessionCleanupService::new(sessions).period(), SWEEP_INTERVAL);
    }

    #[tokio::test]
    async fn test_started_service_sweeps_on_its_own() {
        let output = tempfile::tempdir().expect("tempdir");
        let sessions = SessionStore::new(output.path(), Duration::from_millis(10), 10);
        let _ = sessions.create().await;
        let handle = Arc::new(SessionCleanupService::new(sessions.clone())).start();

        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.abort();
        assert!(sessions.is_empty().await);
    }
}
