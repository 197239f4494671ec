// API Server Binary Entry Point
//
// Purpose: serve the persisted rarity table and organized collection
// Usage: cargo run --features api --bin api_server

use anyhow::Context;
use doopiedex_engine::{create_router, AppState, EngineConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "doopiedex_engine=info,tower_http=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // Configuration from environment variables (DATA_DIR, RARITY_OUTPUT, ORGANIZED_OUTPUT, PORT)
    let config = EngineConfig::from_env();
    config.log_summary();

    // Load artifacts and build the search index
    tracing::info!("Initializing application state...");
    let state = AppState::load(&config)?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
