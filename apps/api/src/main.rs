mod acquisition;
mod analysis;
mod config;
mod cover_letter;
mod errors;
mod extraction;
mod persisted;
mod routes;
mod save;
mod scoring_client;
mod state;
mod view_state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::scoring_client::ScoringClient;
use crate::state::AppState;
use crate::view_state::SessionRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Insights API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize scoring backend client
    let scoring = ScoringClient::new(
        config.scoring_api_url.clone(),
        Duration::from_secs(config.scoring_timeout_secs),
    )
    .context("Failed to build scoring backend client")?;
    info!(
        "Scoring backend: {} (timeout {}s)",
        config.scoring_api_url, config.scoring_timeout_secs
    );

    // Session registry with idle eviction
    let session_idle = Duration::from_secs(config.session_idle_secs);
    let sessions = Arc::new(SessionRegistry::with_limits(
        session_idle,
        config.input_cache_capacity,
    ));
    let sweep_every = (session_idle / 4).max(Duration::from_secs(1));
    tokio::spawn(sessions.clone().run_idle_sweeper(sweep_every));

    let state = AppState {
        scoring: Arc::new(scoring),
        sessions,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
