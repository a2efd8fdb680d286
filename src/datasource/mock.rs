//! Mock rate source for testing without network calls.

use super::{RateSource, RateSourceError};
use crate::domain::{LiveRate, ProtocolId, RateBook, RateFeed};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock rate source that returns predefined rates.
#[derive(Debug, Clone, Default)]
pub struct MockRateSource {
    rates: HashMap<ProtocolId, LiveRate>,
    failing: Arc<Mutex<bool>>,
    calls: Arc<AtomicUsize>,
}

impl MockRateSource {
    /// Create a new mock rate source with no rates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a live APY for a protocol.
    pub fn with_apy(mut self, id: &str, current_apy: f64) -> Self {
        self.rates.insert(
            ProtocolId::from(id),
            LiveRate {
                current_apy,
                avg_apy_7d: None,
                avg_apy_30d: None,
                tvl_usd: 0.0,
                is_live: true,
            },
        );
        self
    }

    /// Add a full rate record for a protocol.
    pub fn with_rate(mut self, id: &str, rate: LiveRate) -> Self {
        self.rates.insert(ProtocolId::from(id), rate);
        self
    }

    /// Make subsequent fetches fail (or succeed again). Shared across clones.
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut guard) = self.failing.lock() {
            *guard = failing;
        }
    }

    /// Number of fetches attempted so far, across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateSource for MockRateSource {
    async fn fetch_rates(&self, feeds: &[(ProtocolId, RateFeed)]) -> Result<RateBook, RateSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let failing = self.failing.lock().map(|guard| *guard).unwrap_or(false);
        if failing {
            return Err(RateSourceError::NetworkError("mock failure".to_string()));
        }

        let mut book = RateBook::new(Utc::now());
        for (id, _) in feeds {
            if let Some(rate) = self.rates.get(id) {
                book.insert(id.clone(), rate.clone());
            }
        }
        Ok(book)
    }
}
