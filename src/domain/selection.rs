//! A user's per-layer choices.

use crate::domain::{Layer, Protocol};
use serde::{Deserialize, Serialize};

/// State of a single layer slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "protocol", rename_all = "lowercase")]
pub enum LayerSelection {
    /// Nothing chosen yet.
    #[default]
    Empty,
    /// Deliberately left out (e.g., "no leverage", "already staked").
    Skipped,
    Selected(Protocol),
}

impl LayerSelection {
    pub fn protocol(&self) -> Option<&Protocol> {
        match self {
            LayerSelection::Selected(protocol) => Some(protocol),
            _ => None,
        }
    }

    /// Filled means the user has made a decision for this layer.
    pub fn is_filled(&self) -> bool {
        !matches!(self, LayerSelection::Empty)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, LayerSelection::Skipped)
    }
}

/// One optional protocol per layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StackSelection {
    #[serde(default)]
    pub base: LayerSelection,
    #[serde(default)]
    pub engine: LayerSelection,
    #[serde(default)]
    pub income: LayerSelection,
    #[serde(default)]
    pub credit: LayerSelection,
    #[serde(default)]
    pub optimize: LayerSelection,
}

impl StackSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, layer: Layer) -> &LayerSelection {
        match layer {
            Layer::Base => &self.base,
            Layer::Engine => &self.engine,
            Layer::Income => &self.income,
            Layer::Credit => &self.credit,
            Layer::Optimize => &self.optimize,
        }
    }

    fn slot_mut(&mut self, layer: Layer) -> &mut LayerSelection {
        match layer {
            Layer::Base => &mut self.base,
            Layer::Engine => &mut self.engine,
            Layer::Income => &mut self.income,
            Layer::Credit => &mut self.credit,
            Layer::Optimize => &mut self.optimize,
        }
    }

    pub fn set(&mut self, layer: Layer, selection: LayerSelection) {
        *self.slot_mut(layer) = selection;
    }

    /// Builder-style variant of [`StackSelection::set`].
    pub fn with(mut self, layer: Layer, selection: LayerSelection) -> Self {
        self.set(layer, selection);
        self
    }

    /// Builder-style shortcut for selecting a protocol on its own layer.
    pub fn with_protocol(self, protocol: Protocol) -> Self {
        let layer = protocol.layer;
        self.with(layer, LayerSelection::Selected(protocol))
    }

    /// The selected protocol at `layer`, if any.
    pub fn protocol(&self, layer: Layer) -> Option<&Protocol> {
        self.get(layer).protocol()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Layer, &LayerSelection)> + '_ {
        Layer::ALL.into_iter().map(move |layer| (layer, self.get(layer)))
    }

    /// Selected protocols in stacking order.
    pub fn selected(&self) -> impl Iterator<Item = (Layer, &Protocol)> + '_ {
        self.iter()
            .filter_map(|(layer, slot)| slot.protocol().map(|p| (layer, p)))
    }

    /// First layer the user has not decided on yet.
    pub fn first_unfilled(&self) -> Option<Layer> {
        self.iter()
            .find(|(_, slot)| !slot.is_filled())
            .map(|(layer, _)| layer)
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, slot)| !slot.is_filled())
    }
}
