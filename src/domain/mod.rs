//! Domain types for the yield stack builder.
//!
//! This module provides:
//! - Layers and protocol catalog entries
//! - Tagged per-layer selections (empty, skipped, selected)
//! - Leverage loop count, clamped to its valid range
//! - Gallery strategies, live rate records, deploy receipts
//! - Display rounding for percentages

pub mod deploy;
pub mod display;
pub mod layer;
pub mod leverage;
pub mod protocol;
pub mod rates;
pub mod selection;
pub mod strategy;

pub use deploy::{stack_fingerprint, DeployReceipt};
pub use display::DisplayPercent;
pub use layer::{Layer, UnknownLayer};
pub use leverage::LeverageLoops;
pub use protocol::{Protocol, ProtocolId, RateFeed};
pub use rates::{LiveRate, RateBook};
pub use selection::{LayerSelection, StackSelection};
pub use strategy::Strategy;
