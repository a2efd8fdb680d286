//! Protocol catalog entries.

use crate::domain::Layer;
use serde::{Deserialize, Serialize};

/// Stable catalog identifier (e.g., "lido", "pendle-pt").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolId(pub String);

impl ProtocolId {
    pub fn new(id: impl Into<String>) -> Self {
        ProtocolId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProtocolId {
    fn from(id: String) -> Self {
        ProtocolId(id)
    }
}

impl From<&str> for ProtocolId {
    fn from(id: &str) -> Self {
        ProtocolId(id.to_string())
    }
}

/// Key used to match a protocol against pools in the live rate feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateFeed {
    pub project: String,
    pub symbol: String,
    #[serde(default = "default_chain")]
    pub chain: String,
}

fn default_chain() -> String {
    "Ethereum".to_string()
}

/// One selectable option for a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    pub id: ProtocolId,
    pub name: String,
    /// Display grouping label.
    pub category: String,
    pub layer: Layer,
    /// Signed percentage: positive is yield earned, negative is borrow cost.
    pub base_apy: f64,
    /// 0..=10; zero means the protocol carries no risk contribution.
    pub risk_score: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed: Option<RateFeed>,
}

impl Protocol {
    /// Whether this protocol participates in risk aggregation.
    pub fn is_risk_bearing(&self) -> bool {
        self.risk_score > 0.0
    }
}
