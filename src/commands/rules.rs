use axum::extract::{Path, State};

use crate::error::{ApiResponse, AppError, AppResult, Json};
use crate::models::Rule;
use crate::state::AppState;

pub async fn get_rules(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Rule>>> {
    Ok(ApiResponse::ok("success", state.store.get_rules()?))
}

pub async fn create_rule(
    State(state): State<AppState>,
    Json(rule): Json<Rule>,
) -> AppResult<ApiResponse<Rule>> {
    let rule = state.store.create_rule(rule)?;
    tracing::info!(id = %rule.id, name = %rule.name, "Rule created");
    Ok(ApiResponse::ok("Rule created", rule))
}

/// Full replacement; `created_at` is kept from the stored row
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(rule): Json<Rule>,
) -> AppResult<ApiResponse<Rule>> {
    match state.store.update_rule(&id, rule)? {
        Some(rule) => {
            tracing::info!(id = %rule.id, "Rule updated");
            Ok(ApiResponse::ok("Rule updated", rule))
        }
        None => Err(AppError::NotFound("Rule")),
    }
}

pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    if !state.store.delete_rule(&id)? {
        return Err(AppError::NotFound("Rule"));
    }
    tracing::info!(id = %id, "Rule deleted");
    Ok(ApiResponse::done("Rule deleted"))
}
