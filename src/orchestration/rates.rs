use crate::datasource::{RateSource, RateSourceError};
use crate::domain::{ProtocolId, RateBook, RateFeed};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Last successfully fetched rates, served stale when a refresh fails.
#[derive(Debug)]
pub struct RateCache {
    book: RwLock<RateBook>,
    ttl: Duration,
}

impl RateCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            book: RwLock::new(RateBook::empty()),
            ttl,
        }
    }

    /// Replace the cached book with a fresh fetch.
    ///
    /// On error the previous book is kept untouched.
    pub async fn refresh(
        &self,
        source: &dyn RateSource,
        feeds: &[(ProtocolId, RateFeed)],
    ) -> Result<usize, RateSourceError> {
        let fresh = source.fetch_rates(feeds).await?;
        let matched = fresh.len();
        *self.book.write().await = fresh;
        Ok(matched)
    }

    /// Current rates; every entry is flagged not-live once past the TTL.
    pub async fn snapshot(&self) -> RateBook {
        self.snapshot_at(Utc::now()).await
    }

    pub async fn snapshot_at(&self, now: DateTime<Utc>) -> RateBook {
        let book = self.book.read().await;
        let expired = book
            .fetched_at()
            .and_then(|fetched_at| (now - fetched_at).to_std().ok())
            .is_some_and(|age| age > self.ttl);
        if expired {
            book.marked_stale()
        } else {
            book.clone()
        }
    }
}

/// Periodically refreshes a [`RateCache`] from a [`RateSource`].
#[derive(Debug, Clone)]
pub struct RateRefresher {
    cache: Arc<RateCache>,
    source: Arc<dyn RateSource>,
    feeds: Vec<(ProtocolId, RateFeed)>,
}

impl RateRefresher {
    pub fn new(
        cache: Arc<RateCache>,
        source: Arc<dyn RateSource>,
        feeds: Vec<(ProtocolId, RateFeed)>,
    ) -> Self {
        Self {
            cache,
            source,
            feeds,
        }
    }

    /// One refresh attempt. Failures are logged and swallowed.
    pub async fn refresh_once(&self) {
        match self.cache.refresh(self.source.as_ref(), &self.feeds).await {
            Ok(matched) => {
                tracing::info!(matched, requested = self.feeds.len(), "Live rates refreshed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Live rate refresh failed, keeping cached rates");
            }
        }
    }

    /// Refresh immediately, then every `interval`.
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.refresh_once().await;
            }
        })
    }
}
