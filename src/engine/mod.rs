//! Pure yield/risk computation engine.
//!
//! Nothing in here performs I/O or keeps state; every function is total over
//! well-formed inputs and treats empty or skipped layers as contributing zero.

use serde::Serialize;

pub mod apy;
pub mod compatibility;
pub mod leverage;
pub mod metrics;
pub mod risk;

pub use apy::{core_yield, total_apy, ApyResolver, ApySource, ResolvedApy};
pub use compatibility::{is_compatible, CompatibilityRule, CompatibilityRules};
pub use leverage::{leveraged_apy, risk_multiplier, LeveragedPosition};
pub use metrics::{stack_metrics, LayerApy, StackMetrics};
pub use risk::{stacking_multiplier, total_risk};

/// Loan-to-value used for every loop.
pub const DEFAULT_LTV: f64 = 0.75;
pub const RISK_MULTIPLIER_CAP: f64 = 3.0;
/// Flat penalty for combining two or more risk-bearing protocols at 1x.
pub const COMPOSITION_PENALTY: f64 = 1.2;
pub const MAX_RISK: f64 = 10.0;

/// Which of the two aggregation formulas to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Formula {
    /// Step-by-step builder: layers stack additively, risk is the mean.
    /// Canonical for everything a session computes.
    #[default]
    Live,
    /// Gallery precomputation: income replaces the engine yield, risk is the max.
    Gallery,
}
