//! Stateless pricing of a stack given by reference.

use crate::api::views::{compatibility_warnings, stack_summary, LayerSummary, MetricsView};
use crate::api::AppState;
use crate::catalog::StackRefs;
use crate::domain::{DisplayPercent, LeverageLoops};
use crate::engine::{stack_metrics, total_apy, total_risk, ApyResolver, Formula};
use crate::error::AppError;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(default)]
    pub stack: StackRefs,
    #[serde(default)]
    pub leverage_loops: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub leverage_loops: u32,
    pub stack: Vec<LayerSummary>,
    pub metrics: MetricsView,
    /// Legacy gallery formula over static catalog numbers.
    pub gallery: GalleryFigures,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryFigures {
    pub total_apy: DisplayPercent,
    pub total_risk: DisplayPercent,
}

pub async fn post_quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, AppError> {
    let catalog = &state.catalog;
    let selection = catalog.resolve_stack(&request.stack)?;
    let loops = request
        .leverage_loops
        .map_or_else(LeverageLoops::one, LeverageLoops::clamped);

    let rates = state.rate_book().await;
    let live = ApyResolver::new()
        .with_rules(catalog.rules())
        .with_rates(&rates);
    let metrics = stack_metrics(&selection, loops, &live, Formula::Live);

    let legacy = ApyResolver::new().with_rules(catalog.rules());
    let gallery = GalleryFigures {
        total_apy: DisplayPercent::apy(total_apy(&selection, loops, &legacy, Formula::Gallery)),
        total_risk: DisplayPercent::risk(total_risk(&selection, loops, Formula::Gallery)),
    };

    Ok(Json(QuoteResponse {
        leverage_loops: loops.get(),
        stack: stack_summary(&selection, catalog, false),
        metrics: MetricsView::from(&metrics),
        gallery,
        warnings: compatibility_warnings(&selection, catalog),
    }))
}
