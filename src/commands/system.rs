use axum::extract::State;
use serde::Serialize;

use crate::error::ApiResponse;
use crate::services::watcher::get_all_watching_paths;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct Status {
    pub status: &'static str,
    pub version: &'static str,
    /// Seconds since the server started
    pub uptime: u64,
    pub watching: Vec<String>,
}

pub async fn health() -> ApiResponse<Health> {
    ApiResponse::ok(
        "OK",
        Health {
            status: "healthy",
            time: chrono::Local::now().to_rfc3339(),
        },
    )
}

pub async fn status(State(state): State<AppState>) -> ApiResponse<Status> {
    ApiResponse::ok(
        "OK",
        Status {
            status: "running",
            version: env!("CARGO_PKG_VERSION"),
            uptime: state.started_at.elapsed().as_secs(),
            watching: get_all_watching_paths(&state.watcher),
        },
    )
}
