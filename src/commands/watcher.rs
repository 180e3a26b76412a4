use axum::extract::State;
use serde::Serialize;
use std::path::Path;

use crate::error::{ApiResponse, AppError, AppResult, Json};
use crate::models::WatchFolderRequest;
use crate::services::watcher::{self, get_all_watching_paths, is_watcher_running};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WatcherStatus {
    pub enabled: bool,
    pub paths: Vec<String>,
}

fn status_of(state: &AppState) -> WatcherStatus {
    WatcherStatus {
        enabled: is_watcher_running(&state.watcher),
        paths: get_all_watching_paths(&state.watcher),
    }
}

pub async fn get_watcher_status(State(state): State<AppState>) -> ApiResponse<WatcherStatus> {
    ApiResponse::ok("success", status_of(&state))
}

pub async fn add_watched_folder(
    State(state): State<AppState>,
    Json(req): Json<WatchFolderRequest>,
) -> AppResult<ApiResponse<WatcherStatus>> {
    if req.path.trim().is_empty() {
        return Err(AppError::BadRequest("path must not be empty".to_string()));
    }

    watcher::add_watched_folder(&state.watcher, state.drop_tx.clone(), Path::new(req.path.trim()))?;
    Ok(ApiResponse::ok("Folder added", status_of(&state)))
}

pub async fn remove_watched_folder(
    State(state): State<AppState>,
    Json(req): Json<WatchFolderRequest>,
) -> AppResult<ApiResponse<WatcherStatus>> {
    if !watcher::remove_watched_folder(&state.watcher, req.path.trim()) {
        return Err(AppError::BadRequest(format!("Folder is not watched: {}", req.path)));
    }
    Ok(ApiResponse::ok("Folder removed", status_of(&state)))
}
