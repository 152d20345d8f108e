//! Netgraph Sync - Binary Entry Point
//!
//! Loads the model, then serves the synchronization socket over HTTP.

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use netgraph_sync::api::{create_router, websocket::AppState};
use netgraph_sync::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    let loaded = config.load_model()?;
    let stats = loaded.model.stats();
    info!(
        model = %stats.label,
        ensembles = stats.ensembles,
        nodes = stats.nodes,
        networks = stats.networks,
        connections = stats.connections,
        "Model ready"
    );

    let state = Arc::new(AppState::from_loaded(loaded, config.tick_interval()));
    let app = create_router(state);

    let listener = config.bind().await?;
    let addr = listener.local_addr()?;
    info!(%addr, "Netgraph server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
