use axum::http::Method;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::commands::{ai, files, history, rules, system, templates, watcher};
use crate::state::AppState;

/// Routes under `/api`
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(system::health))
        .route("/status", get(system::status))
        .route("/files/process", post(files::process_file))
        .route("/history", get(history::get_history))
        .route("/history/clear", post(history::clear_history))
        .route("/rules", get(rules::get_rules).post(rules::create_rule))
        .route("/rules/{id}", put(rules::update_rule).delete(rules::delete_rule))
        .route("/templates", get(templates::get_templates))
        .route("/templates/import", post(templates::import_template))
        .route("/templates/{id}", delete(templates::delete_template))
        .route("/ollama/models", get(ai::list_ollama_models))
        .route("/ai/test-connection", post(ai::test_connection))
        .route("/ai/config", get(ai::get_ai_config).post(ai::save_ai_config))
        .route("/ai/analyze", post(ai::analyze_file))
        .route("/watcher", get(watcher::get_watcher_status))
        .route(
            "/watcher/folders",
            post(watcher::add_watched_folder).delete(watcher::remove_watched_folder),
        )
}

/// The desktop shell calls from its own origin
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
