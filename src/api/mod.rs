pub mod catalog;
pub mod health;
pub mod quote;
pub mod rates;
pub mod sessions;
pub mod strategies;
pub mod views;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::domain::RateBook;
use crate::orchestration::RateCache;
use crate::store::SessionRegistry;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub sessions: Arc<SessionRegistry>,
    /// Absent in static rate mode.
    pub rates: Option<Arc<RateCache>>,
    pub config: Config,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, rates: Option<Arc<RateCache>>, config: Config) -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::new(catalog.clone(), config.session_ttl)),
            catalog,
            rates,
            config,
        }
    }

    /// Current live rates, or an empty book when the overlay is off.
    pub async fn rate_book(&self) -> RateBook {
        match &self.rates {
            Some(cache) => cache.snapshot().await,
            None => RateBook::empty(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/catalog", get(catalog::get_catalog))
        .route("/v1/strategies", get(strategies::list_strategies))
        .route("/v1/strategies/:id", get(strategies::get_strategy))
        .route("/v1/rates", get(rates::get_rates))
        .route("/v1/quote", post(quote::post_quote))
        .route("/v1/sessions", post(sessions::create_session))
        .route(
            "/v1/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route(
            "/v1/sessions/:id/layers/:layer",
            put(sessions::put_layer).delete(sessions::clear_layer),
        )
        .route("/v1/sessions/:id/options/:layer", get(sessions::get_options))
        .route("/v1/sessions/:id/leverage", put(sessions::put_leverage))
        .route("/v1/sessions/:id/whitelabel", put(sessions::put_whitelabel))
        .route("/v1/sessions/:id/reset", post(sessions::reset_session))
        .route(
            "/v1/sessions/:id/strategies/:strategy_id",
            post(sessions::load_strategy),
        )
        .route("/v1/sessions/:id/deploy", post(sessions::deploy_session))
        .layer(cors)
        .with_state(state)
}
