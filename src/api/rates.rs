use crate::api::AppState;
use crate::config::RateMode;
use crate::domain::RateBook;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesResponse {
    pub mode: &'static str,
    #[serde(flatten)]
    pub book: RateBook,
}

pub async fn get_rates(State(state): State<AppState>) -> Json<RatesResponse> {
    let mode = match state.config.rate_mode {
        RateMode::Live if state.rates.is_some() => "live",
        _ => "static",
    };
    Json(RatesResponse {
        mode,
        book: state.rate_book().await,
    })
}
