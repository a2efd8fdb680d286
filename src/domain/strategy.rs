//! Pre-built gallery strategies.

use crate::domain::{LeverageLoops, StackSelection};
use serde::{Deserialize, Serialize};

/// A named, pre-populated stack that can be cloned into a session.
///
/// `total_apy` and `total_risk` are computed once when the catalog loads,
/// using the gallery formula over static catalog numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub selection: StackSelection,
    pub leverage_loops: LeverageLoops,
    pub total_apy: f64,
    pub total_risk: f64,
}
