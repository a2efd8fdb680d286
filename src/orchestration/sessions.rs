use crate::store::SessionRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Periodically evicts idle builder sessions.
#[derive(Debug, Clone)]
pub struct SessionSweeper {
    registry: Arc<SessionRegistry>,
}

impl SessionSweeper {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    pub async fn sweep_once(&self) -> usize {
        let evicted = self.registry.sweep_idle().await;
        if evicted > 0 {
            tracing::info!(evicted, "Idle sessions evicted");
        }
        evicted
    }

    /// Sweep every `interval`, starting one interval from now.
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.sweep_once().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[tokio::test(start_paused = true)]
    async fn test_spawned_sweeper_evicts_idle_sessions() {
        let registry = Arc::new(SessionRegistry::new(
            Arc::new(Catalog::builtin().unwrap()),
            Duration::from_secs(60),
        ));
        registry.create().await;
        registry.create().await;

        let handle = SessionSweeper::new(registry.clone()).spawn(Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(121)).await;
        handle.abort();

        assert!(registry.is_empty().await);
    }
}
