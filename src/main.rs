use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use yieldstack::orchestration::{RateCache, RateRefresher, SessionSweeper};
use yieldstack::{api, Catalog, Config, LlamaRateSource, RateMode, RateSource};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let catalog = Catalog::load(config.catalog_path.as_deref())
        .context("Failed to load protocol catalog")?;
    let catalog = Arc::new(catalog);

    let rates = match config.rate_mode {
        RateMode::Live => {
            let cache = Arc::new(RateCache::new(config.rates_cache_ttl));
            let source: Arc<dyn RateSource> =
                Arc::new(LlamaRateSource::new(config.rates_api_url.clone()));
            RateRefresher::new(cache.clone(), source, catalog.feeds()).spawn(config.rates_refresh);
            Some(cache)
        }
        RateMode::Static => {
            tracing::info!("Static rate mode, live overlay disabled");
            None
        }
    };

    let port = config.port;
    let session_ttl = config.session_ttl;
    let state = api::AppState::new(catalog, rates, config);
    SessionSweeper::new(state.sessions.clone()).spawn(session_ttl);
    let app = api::create_router(state);

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
