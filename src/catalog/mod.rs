//! Static protocol catalog: per-layer protocols, compatibility rules and
//! gallery strategies.
//!
//! The catalog is loaded once at startup, validated, and never mutated.

mod file;
pub mod refs;

use crate::domain::{
    Layer, LayerSelection, Protocol, ProtocolId, RateFeed, StackSelection, Strategy,
};
use crate::engine::{total_apy, total_risk, ApyResolver, CompatibilityRules, Formula, MAX_RISK};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use file::CatalogFile;
pub use refs::{LayerRef, StackRefs, SKIP};

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate protocol id: {0}")]
    DuplicateId(ProtocolId),
    #[error("protocol {id} has risk score {score} outside [0, 10]")]
    RiskOutOfRange { id: ProtocolId, score: f64 },
    #[error("protocol {0} has a non-finite APY")]
    NonFiniteApy(ProtocolId),
    #[error("compatibility rule references unknown protocol: {0}")]
    UnknownRuleReference(ProtocolId),
    #[error("duplicate strategy id: {0}")]
    DuplicateStrategy(String),
    #[error("unknown protocol: {0}")]
    UnknownProtocol(ProtocolId),
    #[error("protocol {id} belongs to layer {actual}, not {expected}")]
    WrongLayer {
        id: ProtocolId,
        expected: Layer,
        actual: Layer,
    },
    #[error("layer {0} cannot be skipped")]
    NotSkippable(Layer),
}

/// Label shown for a layer's "skip" choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipOption {
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// Options available at one layer, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerCatalog {
    pub layer: Layer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<SkipOption>,
    pub protocols: Vec<Protocol>,
}

/// A protocol annotated with whether it fits the current upstream choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolOption {
    #[serde(flatten)]
    pub protocol: Protocol,
    pub compatible: bool,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    /// Indexed by `Layer::index()`.
    layers: Vec<LayerCatalog>,
    index: HashMap<ProtocolId, Layer>,
    rules: CompatibilityRules,
    strategies: Vec<Strategy>,
}

impl Catalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// Load from `path` when given, otherwise the built-in catalog.
    pub fn load(path: Option<&str>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::builtin(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        let mut layers = Vec::with_capacity(Layer::ALL.len());
        let mut index = HashMap::new();

        for (layer, layer_file) in file.layers.into_layers() {
            if layer == Layer::Base && layer_file.skip.is_some() {
                return Err(CatalogError::NotSkippable(Layer::Base));
            }

            let mut protocols = Vec::with_capacity(layer_file.protocols.len());
            for raw in layer_file.protocols {
                let protocol = raw.into_protocol(layer);
                validate_protocol(&protocol)?;
                if index.insert(protocol.id.clone(), layer).is_some() {
                    return Err(CatalogError::DuplicateId(protocol.id));
                }
                protocols.push(protocol);
            }

            layers.push(LayerCatalog {
                layer,
                skip: layer_file.skip,
                protocols,
            });
        }

        validate_rules(&file.rules, &index)?;

        let mut catalog = Catalog {
            layers,
            index,
            rules: file.rules,
            strategies: Vec::with_capacity(file.strategies.len()),
        };

        let mut seen = HashSet::new();
        for def in file.strategies {
            if !seen.insert(def.id.clone()) {
                return Err(CatalogError::DuplicateStrategy(def.id));
            }

            let selection = catalog.resolve_stack_lenient(&def.stack, &def.id);
            let leverage_loops = def.loops();
            let apy = ApyResolver::new().with_rules(&catalog.rules);

            let strategy = Strategy {
                total_apy: total_apy(&selection, leverage_loops, &apy, Formula::Gallery),
                total_risk: total_risk(&selection, leverage_loops, Formula::Gallery),
                id: def.id,
                name: def.name,
                description: def.description,
                tags: def.tags,
                selection,
                leverage_loops,
            };
            catalog.strategies.push(strategy);
        }

        info!(
            protocols = catalog.index.len(),
            strategies = catalog.strategies.len(),
            "Catalog loaded"
        );

        Ok(catalog)
    }

    pub fn layers(&self) -> &[LayerCatalog] {
        &self.layers
    }

    pub fn layer(&self, layer: Layer) -> &LayerCatalog {
        &self.layers[layer.index()]
    }

    pub fn protocols(&self, layer: Layer) -> &[Protocol] {
        &self.layer(layer).protocols
    }

    pub fn protocol(&self, id: &ProtocolId) -> Option<&Protocol> {
        let layer = self.index.get(id)?;
        self.protocols(*layer).iter().find(|p| &p.id == id)
    }

    /// Find `id`, requiring it to belong to `layer`.
    pub fn lookup(&self, layer: Layer, id: &ProtocolId) -> Result<&Protocol, CatalogError> {
        let protocol = self
            .protocol(id)
            .ok_or_else(|| CatalogError::UnknownProtocol(id.clone()))?;
        if protocol.layer != layer {
            return Err(CatalogError::WrongLayer {
                id: id.clone(),
                expected: layer,
                actual: protocol.layer,
            });
        }
        Ok(protocol)
    }

    pub fn is_skippable(&self, layer: Layer) -> bool {
        self.layer(layer).skip.is_some()
    }

    /// Resolve one layer reference strictly.
    pub fn resolve_ref(&self, layer: Layer, layer_ref: &LayerRef) -> Result<LayerSelection, CatalogError> {
        match layer_ref {
            LayerRef::Skip if self.is_skippable(layer) => Ok(LayerSelection::Skipped),
            LayerRef::Skip => Err(CatalogError::NotSkippable(layer)),
            LayerRef::Protocol(id) => {
                self.lookup(layer, id).cloned().map(LayerSelection::Selected)
            }
        }
    }

    /// Resolve a stack by reference, failing on the first bad reference.
    pub fn resolve_stack(&self, refs: &StackRefs) -> Result<StackSelection, CatalogError> {
        let mut selection = StackSelection::new();
        for layer in Layer::ALL {
            if let Some(layer_ref) = refs.get(layer) {
                selection.set(layer, self.resolve_ref(layer, &layer_ref)?);
            }
        }
        Ok(selection)
    }

    /// Resolve a stack by reference; bad references become empty layers.
    fn resolve_stack_lenient(&self, refs: &StackRefs, owner: &str) -> StackSelection {
        let mut selection = StackSelection::new();
        for layer in Layer::ALL {
            let Some(layer_ref) = refs.get(layer) else {
                continue;
            };
            match self.resolve_ref(layer, &layer_ref) {
                Ok(slot) => selection.set(layer, slot),
                Err(e) => {
                    warn!(strategy = owner, layer = %layer, error = %e, "Dangling strategy reference");
                }
            }
        }
        selection
    }

    pub fn rules(&self) -> &CompatibilityRules {
        &self.rules
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn strategy(&self, id: &str) -> Option<&Strategy> {
        self.strategies.iter().find(|s| s.id == id)
    }

    /// Protocols that can be matched against the live rate feed.
    pub fn feeds(&self) -> Vec<(ProtocolId, RateFeed)> {
        self.layers
            .iter()
            .flat_map(|layer| layer.protocols.iter())
            .filter_map(|p| p.feed.clone().map(|feed| (p.id.clone(), feed)))
            .collect()
    }

    /// Every protocol of `layer` with its compatibility against `selection`.
    pub fn compatible_options(&self, layer: Layer, selection: &StackSelection) -> Vec<ProtocolOption> {
        self.protocols(layer)
            .iter()
            .map(|protocol| ProtocolOption {
                compatible: self.rules.is_compatible(protocol, layer, selection),
                protocol: protocol.clone(),
            })
            .collect()
    }
}

fn validate_protocol(protocol: &Protocol) -> Result<(), CatalogError> {
    if !protocol.base_apy.is_finite() {
        return Err(CatalogError::NonFiniteApy(protocol.id.clone()));
    }
    if !(0.0..=MAX_RISK).contains(&protocol.risk_score) {
        return Err(CatalogError::RiskOutOfRange {
            id: protocol.id.clone(),
            score: protocol.risk_score,
        });
    }
    Ok(())
}

fn validate_rules(
    rules: &CompatibilityRules,
    index: &HashMap<ProtocolId, Layer>,
) -> Result<(), CatalogError> {
    for (upstream, rule) in rules.iter() {
        let referenced = std::iter::once(upstream)
            .chain(rule.compatible.iter())
            .chain(rule.apy_overrides.keys());
        for id in referenced {
            if !index.contains_key(id) {
                return Err(CatalogError::UnknownRuleReference(id.clone()));
            }
        }
    }
    Ok(())
}
