//! Rate source abstraction for fetching live protocol APYs from external feeds.

use crate::domain::{ProtocolId, RateBook, RateFeed};
use async_trait::async_trait;
use std::fmt;

pub mod llama;
pub mod mock;

pub use llama::LlamaRateSource;
pub use mock::MockRateSource;

/// Rate source trait for fetching live APY figures.
///
/// Implementations handle retry/backoff themselves; callers treat any error
/// as "keep the previous figures".
#[async_trait]
pub trait RateSource: Send + Sync + fmt::Debug {
    /// Fetch live rates for the given protocols.
    ///
    /// # Arguments
    /// * `feeds` - Protocol ids paired with the pool key to match in the feed
    ///
    /// # Returns
    /// A book containing an entry for every protocol that matched a pool.
    /// Protocols with no matching pool are simply absent.
    async fn fetch_rates(&self, feeds: &[(ProtocolId, RateFeed)]) -> Result<RateBook, RateSourceError>;
}

/// Error type for rate source operations.
#[derive(Debug, Clone)]
pub enum RateSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 429 rate limit, 5xx server error)
    HttpError { status: u16, message: String },
    /// Parsing error (invalid JSON or malformed response)
    ParseError(String),
    /// Rate limit exceeded
    RateLimited,
}

impl fmt::Display for RateSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            RateSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            RateSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            RateSourceError::RateLimited => write!(f, "Rate limited"),
        }
    }
}

impl std::error::Error for RateSourceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_source_error_display() {
        let err = RateSourceError::NetworkError("connection timeout".to_string());
        assert_eq!(err.to_string(), "Network error: connection timeout");

        let err = RateSourceError::HttpError {
            status: 503,
            message: "Server error".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 503: Server error");

        let err = RateSourceError::ParseError("invalid JSON".to_string());
        assert_eq!(err.to_string(), "Parse error: invalid JSON");

        assert_eq!(RateSourceError::RateLimited.to_string(), "Rate limited");
    }
}
