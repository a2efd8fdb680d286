use crate::api::views::{stack_summary, LayerSummary};
use crate::api::AppState;
use crate::catalog::Catalog;
use crate::domain::{DisplayPercent, Strategy};
use crate::error::AppError;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

/// Gallery card. Totals are the figures precomputed at catalog load.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub leverage_loops: u32,
    pub total_apy: DisplayPercent,
    pub total_risk: DisplayPercent,
    pub stack: Vec<LayerSummary>,
}

impl StrategyView {
    fn new(strategy: &Strategy, catalog: &Catalog) -> Self {
        Self {
            id: strategy.id.clone(),
            name: strategy.name.clone(),
            description: strategy.description.clone(),
            tags: strategy.tags.clone(),
            leverage_loops: strategy.leverage_loops.get(),
            total_apy: DisplayPercent::apy(strategy.total_apy),
            total_risk: DisplayPercent::risk(strategy.total_risk),
            stack: stack_summary(&strategy.selection, catalog, false),
        }
    }
}

pub async fn list_strategies(State(state): State<AppState>) -> Json<Vec<StrategyView>> {
    Json(
        state
            .catalog
            .strategies()
            .iter()
            .map(|s| StrategyView::new(s, &state.catalog))
            .collect(),
    )
}

pub async fn get_strategy(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<StrategyView>, AppError> {
    let strategy = state
        .catalog
        .strategy(&id)
        .ok_or_else(|| AppError::NotFound(format!("strategy not found: {}", id)))?;
    Ok(Json(StrategyView::new(strategy, &state.catalog)))
}
