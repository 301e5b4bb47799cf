use std::sync::Arc;

use anyhow::Result;
use dotenv::dotenv;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tradepulse_feed::api::{self, AppState};
use tradepulse_feed::config::Config;
use tradepulse_feed::db::init_database;
use tradepulse_feed::store::{PgNotifier, PgStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tradepulse_feed=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    Config::init()?;
    info!("Initialized configuration");

    // Initialize database
    let db = init_database().await?;
    info!("Connected to database");

    let pool = db.get_pool().clone();
    let store = Arc::new(PgStore::new(pool.clone()));
    let notifier = Arc::new(PgNotifier::new(pool));
    let state = AppState::new(store, notifier);

    // Start API server
    let api_handle = tokio::spawn(async move {
        if let Err(e) = api::start_api_server(state).await {
            error!("API server error: {}", e);
        }
    });

    // Handle shutdown signals
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, initiating graceful shutdown"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }

    api_handle.abort();
    info!("TradePulse feed engine shutdown complete");
    Ok(())
}
