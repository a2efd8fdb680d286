//! Pairwise compatibility rules between adjacent layers.

use crate::domain::{Layer, Protocol, ProtocolId, StackSelection};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Downstream protocols permitted after one upstream protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRule {
    pub compatible: HashSet<ProtocolId>,
    /// Pairing-specific APY for a downstream protocol, replacing its catalog APY.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub apy_overrides: HashMap<ProtocolId, f64>,
}

impl CompatibilityRule {
    pub fn new<I, S>(compatible: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ProtocolId>,
    {
        Self {
            compatible: compatible.into_iter().map(Into::into).collect(),
            apy_overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, id: impl Into<ProtocolId>, apy: f64) -> Self {
        self.apy_overrides.insert(id.into(), apy);
        self
    }

    pub fn permits(&self, id: &ProtocolId) -> bool {
        self.compatible.contains(id)
    }
}

/// Rules keyed by upstream protocol id. A missing key permits everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompatibilityRules {
    rules: HashMap<ProtocolId, CompatibilityRule>,
}

impl CompatibilityRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, upstream: impl Into<ProtocolId>, rule: CompatibilityRule) -> Self {
        self.rules.insert(upstream.into(), rule);
        self
    }

    pub fn get(&self, upstream: &ProtocolId) -> Option<&CompatibilityRule> {
        self.rules.get(upstream)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProtocolId, &CompatibilityRule)> {
        self.rules.iter()
    }

    /// The rule governing `layer`, keyed by the protocol selected one layer up.
    fn rule_for(&self, layer: Layer, selection: &StackSelection) -> Option<&CompatibilityRule> {
        let upstream = selection.protocol(layer.previous()?)?;
        self.rules.get(&upstream.id)
    }

    /// Whether `protocol` may sit at `layer` given the current selection.
    ///
    /// Base has no predecessor and is always compatible. An unselected
    /// upstream slot or an upstream id with no rule is compatible too.
    pub fn is_compatible(&self, protocol: &Protocol, layer: Layer, selection: &StackSelection) -> bool {
        self.rule_for(layer, selection)
            .map_or(true, |rule| rule.permits(&protocol.id))
    }

    /// Pairing APY for `protocol` at `layer` under the current upstream choice.
    pub fn apy_override(
        &self,
        protocol: &Protocol,
        layer: Layer,
        selection: &StackSelection,
    ) -> Option<f64> {
        self.rule_for(layer, selection)?
            .apy_overrides
            .get(&protocol.id)
            .copied()
    }
}

/// Free-function form of [`CompatibilityRules::is_compatible`].
pub fn is_compatible(
    protocol: &Protocol,
    layer: Layer,
    selection: &StackSelection,
    rules: &CompatibilityRules,
) -> bool {
    rules.is_compatible(protocol, layer, selection)
}
