use crate::domain::{Layer, LeverageLoops, StackSelection};
use serde::Serialize;

use super::apy::{core_yield, total_apy, ApyResolver, ApySource};
use super::leverage::{leveraged_apy, LeveragedPosition};
use super::risk::total_risk;
use super::{Formula, DEFAULT_LTV};

/// APY a single selected layer contributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerApy {
    pub layer: Layer,
    pub apy: f64,
    pub source: ApySource,
}

/// Everything a stack summary displays, computed with one formula.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackMetrics {
    pub formula: Formula,
    pub total_apy: f64,
    pub total_risk: f64,
    pub core_yield: f64,
    /// Present whenever a credit protocol is selected.
    pub leverage: Option<LeveragedPosition>,
    pub layers: Vec<LayerApy>,
}

pub fn stack_metrics(
    selection: &StackSelection,
    loops: LeverageLoops,
    apy: &ApyResolver<'_>,
    formula: Formula,
) -> StackMetrics {
    let core = core_yield(selection, apy, formula);

    let leverage = apy.resolve(selection, Layer::Credit).map(|credit| {
        leveraged_apy(core, credit.value.abs(), DEFAULT_LTV, loops.get())
    });

    let layers = Layer::ALL
        .into_iter()
        .filter_map(|layer| {
            apy.resolve(selection, layer).map(|resolved| LayerApy {
                layer,
                apy: resolved.value,
                source: resolved.source,
            })
        })
        .collect();

    StackMetrics {
        formula,
        total_apy: total_apy(selection, loops, apy, formula),
        total_risk: total_risk(selection, loops, formula),
        core_yield: core,
        leverage,
        layers,
    }
}
