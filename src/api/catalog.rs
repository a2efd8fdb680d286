//! Catalog browsing with the live rate overlay applied.

use crate::api::AppState;
use crate::catalog::SkipOption;
use crate::domain::{DisplayPercent, Layer, LiveRate, Protocol};
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub layers: Vec<LayerView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rates_fetched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerView {
    pub layer: Layer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<SkipOption>,
    pub protocols: Vec<ProtocolView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolView {
    #[serde(flatten)]
    pub protocol: Protocol,
    /// Live APY when available, catalog APY otherwise.
    pub current_apy: DisplayPercent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_rate: Option<LiveRate>,
}

pub async fn get_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    let rates = state.rate_book().await;

    let layers = state
        .catalog
        .layers()
        .iter()
        .map(|layer| LayerView {
            layer: layer.layer,
            skip: layer.skip.clone(),
            protocols: layer
                .protocols
                .iter()
                .map(|protocol| {
                    let live_rate = rates.get(&protocol.id).cloned();
                    let apy = live_rate
                        .as_ref()
                        .map_or(protocol.base_apy, |rate| rate.current_apy);
                    ProtocolView {
                        protocol: protocol.clone(),
                        current_apy: DisplayPercent::apy(apy),
                        live_rate,
                    }
                })
                .collect(),
        })
        .collect();

    Json(CatalogResponse {
        layers,
        rates_fetched_at: rates.fetched_at(),
    })
}
