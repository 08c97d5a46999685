mod config;
mod error;
mod handlers;
mod models;
mod router;
mod state;

use anyhow::Context;
use auction_engine::{AuctionEngine, ExpiryScheduler};
use clap::Parser;
use config::Config;
use persistence::FileStore;
use router::create_router;
use state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::parse();

    // Initialize tracing
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting marketplace gateway");

    let store = FileStore::open(config.store_config())
        .with_context(|| format!("failed to open store at {}", config.db_path.display()))?;
    let engine = Arc::new(AuctionEngine::new(Arc::new(store)));

    let scheduler = ExpiryScheduler::spawn(Arc::clone(&engine), config.scheduler_config());

    let app = create_router(AppState::new(engine));

    // Bind and serve
    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await;
    tracing::info!("Gateway stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
