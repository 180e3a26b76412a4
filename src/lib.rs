pub mod ai;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod rules;
pub mod server;
pub mod services;
pub mod state;
pub mod store;

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use ai::{AiClient, AiConfigHandle};
use config::ServerConfig;
use services::watcher::{add_watched_folder, drain_processing, spawn_processing_task, stop_watcher};
use state::AppState;
use store::Store;

/// How long shutdown waits for files already queued by the watcher
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to open database: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

pub async fn run() -> Result<(), StartupError> {
    // .env next to the binary's working dir, then one level up
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path("../.env");
    }

    // RUST_LOG=debug shows raw model output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,blackhole=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        addr = %config.bind_addr(),
        db = %config.db_path.display(),
        destination = %config.default_destination.display(),
        "Loaded configuration"
    );

    let store = Arc::new(Store::open(&config.db_path)?);
    let ai_config = AiConfigHandle::new(AppState::initial_ai_config(&config));
    let analyzer = Arc::new(AiClient::new(ai_config.clone()));

    let (state, drop_rx) = AppState::new(config.clone(), store, ai_config, analyzer);
    let processing = spawn_processing_task(state.processor.clone(), drop_rx);

    for dir in &config.watch_dirs {
        if let Err(e) = add_watched_folder(&state.watcher, state.drop_tx.clone(), dir) {
            tracing::warn!(folder = %dir.display(), error = %e, "Cannot watch folder");
        }
    }

    let watcher = state.watcher.clone();
    let app = server::build_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %listener.local_addr()?, "BlackHole server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    // the router is gone; dropping the watchers drops the last senders
    stop_watcher(&watcher);
    drain_processing(processing, SHUTDOWN_GRACE).await;
    tracing::info!("Shutdown complete");

    Ok(())
}
