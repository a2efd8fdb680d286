//! Response shapes shared by several endpoints.
//!
//! Engine figures are carried at full precision internally and rounded
//! here, on the way out.

use crate::catalog::Catalog;
use crate::domain::{DisplayPercent, Layer, LayerSelection, StackSelection};
use crate::engine::{ApySource, Formula, LeveragedPosition, StackMetrics};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsView {
    pub formula: Formula,
    pub total_apy: DisplayPercent,
    pub total_risk: DisplayPercent,
    pub core_yield: DisplayPercent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverage: Option<LeverageView>,
    pub layers: Vec<LayerApyView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeverageView {
    pub effective_apy: DisplayPercent,
    pub total_exposure: DisplayPercent,
    /// Capital borrowed per unit of starting capital.
    pub borrowed: DisplayPercent,
    pub risk_multiplier: DisplayPercent,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerApyView {
    pub layer: Layer,
    pub apy: DisplayPercent,
    pub source: ApySource,
}

impl From<&LeveragedPosition> for LeverageView {
    fn from(position: &LeveragedPosition) -> Self {
        Self {
            effective_apy: DisplayPercent::apy(position.effective_apy),
            total_exposure: DisplayPercent::round(position.total_exposure, 4),
            borrowed: DisplayPercent::round(position.borrowed(), 4),
            risk_multiplier: DisplayPercent::round(position.risk_multiplier, 2),
        }
    }
}

impl From<&StackMetrics> for MetricsView {
    fn from(metrics: &StackMetrics) -> Self {
        Self {
            formula: metrics.formula,
            total_apy: DisplayPercent::apy(metrics.total_apy),
            total_risk: DisplayPercent::risk(metrics.total_risk),
            core_yield: DisplayPercent::apy(metrics.core_yield),
            leverage: metrics.leverage.as_ref().map(LeverageView::from),
            layers: metrics
                .layers
                .iter()
                .map(|l| LayerApyView {
                    layer: l.layer,
                    apy: DisplayPercent::apy(l.apy),
                    source: l.source,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Empty,
    Skipped,
    Selected,
}

/// One row of a stack summary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSummary {
    pub layer: Layer,
    pub status: SlotStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Summarise a stack. In whitelabel mode protocol names give way to their
/// category labels and ids are withheld.
pub fn stack_summary(
    selection: &StackSelection,
    catalog: &Catalog,
    whitelabel: bool,
) -> Vec<LayerSummary> {
    selection
        .iter()
        .map(|(layer, slot)| match slot {
            LayerSelection::Empty => LayerSummary {
                layer,
                status: SlotStatus::Empty,
                protocol_id: None,
                label: None,
            },
            LayerSelection::Skipped => LayerSummary {
                layer,
                status: SlotStatus::Skipped,
                protocol_id: None,
                label: catalog.layer(layer).skip.as_ref().map(|s| s.label.clone()),
            },
            LayerSelection::Selected(protocol) if whitelabel => LayerSummary {
                layer,
                status: SlotStatus::Selected,
                protocol_id: None,
                label: Some(protocol.category.clone()),
            },
            LayerSelection::Selected(protocol) => LayerSummary {
                layer,
                status: SlotStatus::Selected,
                protocol_id: Some(protocol.id.to_string()),
                label: Some(protocol.name.clone()),
            },
        })
        .collect()
}

/// Selected protocols the rules do not pair with their upstream choice.
pub fn compatibility_warnings(selection: &StackSelection, catalog: &Catalog) -> Vec<String> {
    selection
        .selected()
        .filter(|(layer, protocol)| !catalog.rules().is_compatible(protocol, *layer, selection))
        .filter_map(|(layer, protocol)| {
            let upstream = layer.previous().and_then(|prev| selection.protocol(prev))?;
            Some(format!(
                "{} is not a listed pairing for {}",
                protocol.name, upstream.name
            ))
        })
        .collect()
}
