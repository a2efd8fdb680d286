//! DefiLlama yields API client.

use super::{RateSource, RateSourceError};
use crate::domain::{LiveRate, ProtocolId, RateBook, RateFeed};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Rate source backed by the public DefiLlama `/pools` endpoint.
#[derive(Debug, Clone)]
pub struct LlamaRateSource {
    client: Client,
    base_url: String,
}

impl LlamaRateSource {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn get_pools(&self) -> Result<serde_json::Value, RateSourceError> {
        let url = format!("{}/pools", self.base_url.trim_end_matches('/'));
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self.client.get(&url).send().await.map_err(|e| {
                backoff::Error::transient(RateSourceError::NetworkError(e.to_string()))
            })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(RateSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(RateSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(RateSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(RateSourceError::ParseError(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl RateSource for LlamaRateSource {
    async fn fetch_rates(&self, feeds: &[(ProtocolId, RateFeed)]) -> Result<RateBook, RateSourceError> {
        debug!("Fetching pools from {} for {} feeds", self.base_url, feeds.len());

        let response = self.get_pools().await?;
        let pools_json = response
            .get("data")
            .and_then(|v| v.as_array())
            .ok_or_else(|| RateSourceError::ParseError("Expected data array".to_string()))?;

        let mut pools = Vec::with_capacity(pools_json.len());
        let mut skipped = 0usize;
        for pool_json in pools_json {
            match parse_pool(pool_json) {
                Ok(pool) => pools.push(pool),
                Err(e) => {
                    skipped += 1;
                    debug!("Skipping pool: {}", e);
                }
            }
        }
        if skipped > 0 {
            warn!(skipped, parsed = pools.len(), "Skipped unparseable pool entries");
        }

        let book = match_feeds(&pools, feeds, Utc::now());
        if book.len() < feeds.len() {
            warn!(
                matched = book.len(),
                requested = feeds.len(),
                "Some protocols had no matching pool"
            );
        }
        Ok(book)
    }
}

/// One pool entry from the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolRecord {
    pub project: String,
    pub symbol: String,
    pub chain: String,
    pub apy: f64,
    pub apy_base_7d: Option<f64>,
    pub apy_mean_30d: Option<f64>,
    pub tvl_usd: f64,
}

pub fn parse_pool(pool_json: &serde_json::Value) -> Result<PoolRecord, RateSourceError> {
    let field_str = |name: &str| {
        pool_json
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| RateSourceError::ParseError(format!("Missing {} field", name)))
    };

    let apy = pool_json
        .get("apy")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| RateSourceError::ParseError("Missing apy field".to_string()))?;

    Ok(PoolRecord {
        project: field_str("project")?,
        symbol: field_str("symbol")?,
        chain: field_str("chain")?,
        apy,
        apy_base_7d: pool_json.get("apyBase7d").and_then(|v| v.as_f64()),
        apy_mean_30d: pool_json.get("apyMean30d").and_then(|v| v.as_f64()),
        tvl_usd: pool_json
            .get("tvlUsd")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0),
    })
}

/// Pair each feed with its highest-TVL matching pool.
pub fn match_feeds(
    pools: &[PoolRecord],
    feeds: &[(ProtocolId, RateFeed)],
    fetched_at: DateTime<Utc>,
) -> RateBook {
    let mut book = RateBook::new(fetched_at);

    for (id, feed) in feeds {
        let best = pools
            .iter()
            .filter(|pool| {
                pool.project.eq_ignore_ascii_case(&feed.project)
                    && pool.symbol.eq_ignore_ascii_case(&feed.symbol)
                    && pool.chain.eq_ignore_ascii_case(&feed.chain)
            })
            .max_by(|a, b| a.tvl_usd.total_cmp(&b.tvl_usd));

        if let Some(pool) = best {
            book.insert(
                id.clone(),
                LiveRate {
                    current_apy: pool.apy,
                    avg_apy_7d: pool.apy_base_7d,
                    avg_apy_30d: pool.apy_mean_30d,
                    tvl_usd: pool.tvl_usd,
                    is_live: true,
                },
            );
        }
    }

    book
}
