use crate::catalog::Catalog;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use super::selection_store::SelectionStore;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(Uuid),
}

#[derive(Debug)]
struct SessionEntry {
    store: Arc<SelectionStore>,
    last_touched: Instant,
}

impl SessionEntry {
    fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_touched) > ttl
    }
}

/// In-memory builder sessions, one [`SelectionStore`] each.
///
/// A session idle for longer than `ttl` is gone: lookups treat it as
/// missing and [`SessionRegistry::sweep_idle`] drops it.
#[derive(Debug)]
pub struct SessionRegistry {
    catalog: Arc<Catalog>,
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new(catalog: Arc<Catalog>, ttl: Duration) -> Self {
        Self {
            catalog,
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create(&self) -> (Uuid, Arc<SelectionStore>) {
        let id = Uuid::new_v4();
        let store = Arc::new(SelectionStore::new(self.catalog.clone()));
        self.sessions.write().await.insert(
            id,
            SessionEntry {
                store: store.clone(),
                last_touched: Instant::now(),
            },
        );
        tracing::debug!(session = %id, "Session created");
        (id, store)
    }

    /// Look up a live session and mark it as touched.
    pub async fn get(&self, id: &Uuid) -> Result<Arc<SelectionStore>, SessionError> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let idle = match sessions.get_mut(id) {
            Some(entry) if !entry.is_idle(now, self.ttl) => {
                entry.last_touched = now;
                return Ok(entry.store.clone());
            }
            Some(_) => true,
            None => false,
        };
        if idle {
            sessions.remove(id);
            tracing::debug!(session = %id, "Session expired");
        }
        Err(SessionError::NotFound(*id))
    }

    pub async fn remove(&self, id: &Uuid) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(SessionError::NotFound(*id))
    }

    /// Drop every session idle past the TTL; returns how many went.
    pub async fn sweep_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_idle(now, self.ttl));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
