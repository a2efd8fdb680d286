//! Live rate overlay records.

use crate::domain::ProtocolId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Live market figures for one protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveRate {
    pub current_apy: f64,
    pub avg_apy_7d: Option<f64>,
    pub avg_apy_30d: Option<f64>,
    pub tvl_usd: f64,
    /// False when the figure is older than the cache freshness window.
    pub is_live: bool,
}

/// Live rates keyed by protocol id, with the time they were fetched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateBook {
    rates: HashMap<ProtocolId, LiveRate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fetched_at: Option<DateTime<Utc>>,
}

impl RateBook {
    pub fn new(fetched_at: DateTime<Utc>) -> Self {
        Self {
            rates: HashMap::new(),
            fetched_at: Some(fetched_at),
        }
    }

    /// An empty book; every lookup falls back to catalog numbers.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ProtocolId, rate: LiveRate) {
        self.rates.insert(id, rate);
    }

    pub fn with_rate(mut self, id: impl Into<ProtocolId>, rate: LiveRate) -> Self {
        self.insert(id.into(), rate);
        self
    }

    pub fn get(&self, id: &ProtocolId) -> Option<&LiveRate> {
        self.rates.get(id)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Copy of this book with every entry flagged as estimated.
    pub fn marked_stale(&self) -> Self {
        let mut book = self.clone();
        for rate in book.rates.values_mut() {
            rate.is_live = false;
        }
        book
    }
}
