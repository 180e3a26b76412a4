use axum::extract::{Path, State};

use crate::error::{ApiResponse, AppError, AppResult, Json};
use crate::models::{ImportTemplateRequest, Template};
use crate::state::AppState;

pub async fn get_templates(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Template>>> {
    Ok(ApiResponse::ok("success", state.store.list_templates()?))
}

pub async fn import_template(
    State(state): State<AppState>,
    Json(req): Json<ImportTemplateRequest>,
) -> AppResult<ApiResponse<Template>> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Template name must not be empty".to_string()));
    }

    let template = state.store.insert_template(req.name.trim(), req.components)?;
    tracing::info!(id = %template.id, name = %template.name, "Template imported");
    Ok(ApiResponse::ok("Template imported", template))
}

pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    if !state.store.delete_template(&id)? {
        return Err(AppError::NotFound("Template"));
    }
    Ok(ApiResponse::done("Template deleted"))
}
