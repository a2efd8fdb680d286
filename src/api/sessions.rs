//! Step-by-step builder sessions.

use crate::api::views::{compatibility_warnings, stack_summary, LayerSummary, MetricsView};
use crate::api::AppState;
use crate::catalog::{ProtocolOption, SkipOption};
use crate::domain::{DeployReceipt, Layer, ProtocolId};
use crate::error::AppError;
use crate::store::{Action, SelectionStore};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub leverage_loops: u32,
    pub whitelabel: bool,
    /// First undecided layer; absent once every layer is decided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_layer: Option<Layer>,
    pub stack: Vec<LayerSummary>,
    pub metrics: MetricsView,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerChoice {
    #[serde(default)]
    pub protocol_id: Option<String>,
    #[serde(default)]
    pub skip: bool,
}

#[derive(Debug, Deserialize)]
pub struct LeverageRequest {
    pub loops: i64,
}

#[derive(Debug, Deserialize)]
pub struct WhitelabelRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse {
    pub layer: Layer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<SkipOption>,
    pub options: Vec<ProtocolOption>,
}

async fn session_view(state: &AppState, id: Uuid, store: &SelectionStore) -> SessionView {
    let rates = state.rate_book().await;
    let metrics = store.metrics(&rates);
    let snapshot = store.snapshot();

    SessionView {
        id,
        leverage_loops: snapshot.leverage_loops.get(),
        whitelabel: snapshot.whitelabel,
        next_layer: snapshot.selection.first_unfilled(),
        stack: stack_summary(&snapshot.selection, &state.catalog, snapshot.whitelabel),
        metrics: MetricsView::from(&metrics),
        warnings: compatibility_warnings(&snapshot.selection, &state.catalog),
    }
}

async fn find(state: &AppState, id: Uuid) -> Result<Arc<SelectionStore>, AppError> {
    Ok(state.sessions.get(&id).await?)
}

fn parse_layer(raw: &str) -> Result<Layer, AppError> {
    raw.parse::<Layer>()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionView>) {
    let (id, store) = state.sessions.create().await;
    tracing::info!(session = %id, "Builder session started");
    (StatusCode::CREATED, Json(session_view(&state, id, &store).await))
}

pub async fn get_session(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    let store = find(&state, id).await?;
    Ok(Json(session_view(&state, id, &store).await))
}

pub async fn delete_session(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Select or skip a layer. Every earlier layer must already be decided.
pub async fn put_layer(
    Path((id, layer)): Path<(Uuid, String)>,
    State(state): State<AppState>,
    Json(choice): Json<LayerChoice>,
) -> Result<Json<SessionView>, AppError> {
    let layer = parse_layer(&layer)?;
    let store = find(&state, id).await?;

    let snapshot = store.snapshot();
    if let Some(missing) = layer
        .predecessors()
        .iter()
        .find(|prev| !snapshot.selection.get(**prev).is_filled())
    {
        return Err(AppError::BadRequest(format!(
            "choose the {} layer before {}",
            missing, layer
        )));
    }

    let action = match (choice.protocol_id, choice.skip) {
        (Some(_), true) => {
            return Err(AppError::BadRequest(
                "give either protocolId or skip, not both".into(),
            ))
        }
        (None, false) => {
            return Err(AppError::BadRequest("protocolId or skip is required".into()))
        }
        (None, true) => {
            if !state.catalog.is_skippable(layer) {
                return Err(AppError::BadRequest(format!("layer {} cannot be skipped", layer)));
            }
            Action::Skip(layer)
        }
        (Some(protocol_id), false) => {
            let protocol = state
                .catalog
                .lookup(layer, &ProtocolId::from(protocol_id.trim()))?
                .clone();
            Action::Select { layer, protocol }
        }
    };

    store.dispatch(action);
    Ok(Json(session_view(&state, id, &store).await))
}

pub async fn clear_layer(
    Path((id, layer)): Path<(Uuid, String)>,
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    let layer = parse_layer(&layer)?;
    let store = find(&state, id).await?;
    store.dispatch(Action::Clear(layer));
    Ok(Json(session_view(&state, id, &store).await))
}

pub async fn get_options(
    Path((id, layer)): Path<(Uuid, String)>,
    State(state): State<AppState>,
) -> Result<Json<OptionsResponse>, AppError> {
    let layer = parse_layer(&layer)?;
    let store = find(&state, id).await?;
    Ok(Json(OptionsResponse {
        layer,
        skip: state.catalog.layer(layer).skip.clone(),
        options: store.options(layer),
    }))
}

pub async fn put_leverage(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<LeverageRequest>,
) -> Result<Json<SessionView>, AppError> {
    let store = find(&state, id).await?;
    store.dispatch(Action::SetLeverageLoops(request.loops));
    Ok(Json(session_view(&state, id, &store).await))
}

pub async fn put_whitelabel(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<WhitelabelRequest>,
) -> Result<Json<SessionView>, AppError> {
    let store = find(&state, id).await?;
    store.dispatch(Action::SetWhitelabel(request.enabled));
    Ok(Json(session_view(&state, id, &store).await))
}

pub async fn reset_session(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    let store = find(&state, id).await?;
    store.dispatch(Action::Reset);
    Ok(Json(session_view(&state, id, &store).await))
}

pub async fn load_strategy(
    Path((id, strategy_id)): Path<(Uuid, String)>,
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    let store = find(&state, id).await?;
    let strategy = state
        .catalog
        .strategy(&strategy_id)
        .ok_or_else(|| AppError::NotFound(format!("strategy not found: {}", strategy_id)))?;
    store.dispatch(Action::LoadStrategy(Box::new(strategy.clone())));
    Ok(Json(session_view(&state, id, &store).await))
}

/// Simulated deploy. Needs a base asset and a decided engine layer.
pub async fn deploy_session(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<DeployReceipt>, AppError> {
    let store = find(&state, id).await?;
    let snapshot = store.snapshot();

    if snapshot.selection.protocol(Layer::Base).is_none() || !snapshot.selection.engine.is_filled() {
        return Err(AppError::BadRequest(
            "a base asset and an engine choice are required to deploy".into(),
        ));
    }

    let rates = state.rate_book().await;
    let metrics = store.metrics(&rates);
    let receipt = DeployReceipt::new(
        &snapshot.selection,
        snapshot.leverage_loops,
        metrics.total_apy,
        metrics.total_risk,
        chrono::Utc::now(),
    );
    tracing::info!(
        session = %id,
        fingerprint = %receipt.stack_fingerprint,
        "Simulated stack deploy"
    );
    Ok(Json(receipt))
}
