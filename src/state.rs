use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::ai::{AiConfig, AiConfigHandle, Analyzer};
use crate::config::ServerConfig;
use crate::services::watcher::{create_watcher_handle, DropReceiver, DropSender, WatcherHandle};
use crate::services::Processor;
use crate::store::Store;

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<Store>,
    pub ai_config: AiConfigHandle,
    pub analyzer: Arc<dyn Analyzer>,
    pub processor: Arc<Processor>,
    pub watcher: WatcherHandle,
    /// Feeds the processing task started by `run()`
    pub drop_tx: DropSender,
    pub started_at: Instant,
}

impl AppState {
    /// Returns the state and the receiving end of the watcher channel.
    pub fn new(
        config: ServerConfig,
        store: Arc<Store>,
        ai_config: AiConfigHandle,
        analyzer: Arc<dyn Analyzer>,
    ) -> (Self, DropReceiver) {
        let processor = Arc::new(Processor::new(
            store.clone(),
            analyzer.clone(),
            config.default_destination.clone(),
        ));
        let (drop_tx, drop_rx) = mpsc::unbounded_channel();

        let state = Self {
            config: Arc::new(config),
            store,
            ai_config,
            analyzer,
            processor,
            watcher: create_watcher_handle(),
            drop_tx,
            started_at: Instant::now(),
        };
        (state, drop_rx)
    }

    /// Initial AI settings: local provider with the configured URL and model
    pub fn initial_ai_config(config: &ServerConfig) -> AiConfig {
        AiConfig {
            base_url: config.ollama_url.clone(),
            model: config.ai_model.clone(),
            ..AiConfig::default()
        }
    }
}
