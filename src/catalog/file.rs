//! On-disk catalog format.

use crate::domain::{Layer, LeverageLoops, Protocol, ProtocolId, RateFeed};
use crate::engine::CompatibilityRules;
use serde::Deserialize;

use super::refs::StackRefs;
use super::SkipOption;

#[derive(Debug, Deserialize)]
pub(super) struct CatalogFile {
    pub layers: LayersFile,
    #[serde(default)]
    pub rules: CompatibilityRules,
    #[serde(default)]
    pub strategies: Vec<StrategyFile>,
}

/// Every layer must be present.
#[derive(Debug, Deserialize)]
pub(super) struct LayersFile {
    pub base: LayerFile,
    pub engine: LayerFile,
    pub income: LayerFile,
    pub credit: LayerFile,
    pub optimize: LayerFile,
}

impl LayersFile {
    pub fn into_layers(self) -> [(Layer, LayerFile); 5] {
        [
            (Layer::Base, self.base),
            (Layer::Engine, self.engine),
            (Layer::Income, self.income),
            (Layer::Credit, self.credit),
            (Layer::Optimize, self.optimize),
        ]
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct LayerFile {
    #[serde(default)]
    pub skip: Option<SkipOption>,
    pub protocols: Vec<ProtocolFile>,
}

/// A protocol as written under its layer; the layer is implied by nesting.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProtocolFile {
    pub id: ProtocolId,
    pub name: String,
    pub category: String,
    pub base_apy: f64,
    pub risk_score: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub feed: Option<RateFeed>,
}

impl ProtocolFile {
    pub fn into_protocol(self, layer: Layer) -> Protocol {
        Protocol {
            id: self.id,
            name: self.name,
            category: self.category,
            layer,
            base_apy: self.base_apy,
            risk_score: self.risk_score,
            description: self.description,
            feed: self.feed,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StrategyFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub stack: StackRefs,
    #[serde(default)]
    pub leverage_loops: Option<i64>,
}

impl StrategyFile {
    pub fn loops(&self) -> LeverageLoops {
        self.leverage_loops
            .map(LeverageLoops::clamped)
            .unwrap_or_default()
    }
}
