use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, AppState};
use service::{
    persons::PersonService,
    reviews::ReviewService,
    runtime,
    storage::document_store::DocumentStore,
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse::<SocketAddr>()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Wire the data file, services and router for the given config.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let data_file = &cfg.storage.data_file;
    runtime::ensure_env(data_file)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let store = DocumentStore::new(data_file.as_str())
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;
    // fail fast on an unreadable file instead of on the first request
    store.load().await.map_err(|e| StartupError::Runtime(e.to_string()))?;

    let state = AppState {
        persons: Arc::new(PersonService::new(Arc::clone(&store))),
        reviews: Arc::new(ReviewService::new(
            Arc::clone(&store),
            cfg.reviews.addressing,
            cfg.reviews.case_insensitive_usernames,
        )),
    };
    info!(
        data_file = %store.path().display(),
        review_addressing = ?cfg.reviews.addressing,
        "application state ready"
    );
    Ok(routes::build_router(state, build_cors()))
}

/// Public entry: load config, build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_or_env()?;
    run_with_config(cfg).await
}

pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;
    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
