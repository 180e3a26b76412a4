use axum::extract::State;

use crate::error::{ApiResponse, AppResult};
use crate::models::HistoryRecord;
use crate::state::AppState;

/// Latest records, newest first
pub async fn get_history(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<HistoryRecord>>> {
    Ok(ApiResponse::ok("success", state.store.get_history()?))
}

pub async fn clear_history(State(state): State<AppState>) -> AppResult<ApiResponse<()>> {
    let removed = state.store.clear_history()?;
    tracing::info!(removed, "History cleared");
    Ok(ApiResponse::done("History cleared"))
}
