//! Stacks written as protocol ids.

use crate::domain::{Layer, ProtocolId};
use serde::{Deserialize, Serialize};

/// Reserved id meaning "skip this layer".
pub const SKIP: &str = "skip";

/// A stack by reference: per layer, a protocol id, [`SKIP`], or nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackRefs {
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub income: Option<String>,
    #[serde(default)]
    pub credit: Option<String>,
    #[serde(default)]
    pub optimize: Option<String>,
}

/// One parsed layer reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerRef {
    Skip,
    Protocol(ProtocolId),
}

impl StackRefs {
    pub fn get(&self, layer: Layer) -> Option<LayerRef> {
        let raw = match layer {
            Layer::Base => &self.base,
            Layer::Engine => &self.engine,
            Layer::Income => &self.income,
            Layer::Credit => &self.credit,
            Layer::Optimize => &self.optimize,
        };

        raw.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s.eq_ignore_ascii_case(SKIP) {
                    LayerRef::Skip
                } else {
                    LayerRef::Protocol(ProtocolId::from(s))
                }
            })
    }
}
