use axum::extract::State;

use crate::error::{ApiResponse, AppError, AppResult, Json};
use crate::models::{FileProcessRequest, FileProcessResponse};
use crate::state::AppState;

/// Rename and file one dropped file
pub async fn process_file(
    State(state): State<AppState>,
    Json(req): Json<FileProcessRequest>,
) -> AppResult<ApiResponse<FileProcessResponse>> {
    if req.file_path.trim().is_empty() {
        return Err(AppError::BadRequest("file_path must not be empty".to_string()));
    }

    let response = state.processor.process(&req).await?;
    Ok(ApiResponse::ok("File processed", response))
}
