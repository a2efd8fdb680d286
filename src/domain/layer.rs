//! The five fixed stages of a yield stack.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One stage of a yield stack, ordered from settlement asset to optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Settlement asset.
    Base,
    /// Yield-generating protocol.
    Engine,
    /// Fixed-rate wrapper.
    Income,
    /// Borrowing/leverage market.
    Credit,
    /// Automated yield aggregator.
    Optimize,
}

impl Layer {
    /// All layers in stacking order.
    pub const ALL: [Layer; 5] = [
        Layer::Base,
        Layer::Engine,
        Layer::Income,
        Layer::Credit,
        Layer::Optimize,
    ];

    /// Position in the stack (0 = base .. 4 = optimize).
    pub fn index(&self) -> usize {
        match self {
            Layer::Base => 0,
            Layer::Engine => 1,
            Layer::Income => 2,
            Layer::Credit => 3,
            Layer::Optimize => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The layer immediately upstream of this one, if any.
    pub fn previous(&self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Layers strictly before this one.
    pub fn predecessors(&self) -> &'static [Layer] {
        &Self::ALL[..self.index()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Base => "base",
            Layer::Engine => "engine",
            Layer::Income => "income",
            Layer::Credit => "credit",
            Layer::Optimize => "optimize",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = UnknownLayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(Layer::Base),
            "engine" => Ok(Layer::Engine),
            "income" => Ok(Layer::Income),
            "credit" => Ok(Layer::Credit),
            "optimize" => Ok(Layer::Optimize),
            _ => Err(UnknownLayer(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown layer: {0}")]
pub struct UnknownLayer(pub String);
