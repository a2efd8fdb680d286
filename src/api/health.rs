use crate::api::AppState;
use axum::extract::State;
use axum::Json;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Ready once the catalog is loaded; reports whether live rates have arrived.
pub async fn ready(State(state): State<AppState>) -> Json<serde_json::Value> {
    let rates = state.rate_book().await;
    Json(serde_json::json!({
        "status": "ready",
        "strategies": state.catalog.strategies().len(),
        "liveRates": rates.len(),
    }))
}
