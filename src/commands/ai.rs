use axum::extract::State;
use std::path::PathBuf;

use crate::ai::{self, AiConfig, Provider};
use crate::error::{ApiResponse, AppError, AppResult, Json};
use crate::models::{AiAnalysis, AiAnalyzeRequest, AiTestRequest, ConnectionStatus};
use crate::state::AppState;

/// Models installed on the local Ollama server
pub async fn list_ollama_models(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<String>>> {
    let config = state.ai_config.snapshot().await;
    let base_url = match config.provider {
        Provider::Ollama => config.effective_base_url(),
        _ => state.config.ollama_url.clone(),
    };

    let models = ai::list_ollama_models(&base_url)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to list Ollama models: {}", e)))?;
    Ok(ApiResponse::ok("success", models))
}

pub async fn test_connection(Json(req): Json<AiTestRequest>) -> AppResult<ApiResponse<ConnectionStatus>> {
    let status = ai::test_connection(&req).await.map_err(AppError::ConnectionTest)?;
    let message = format!("Connected to {}", status.provider);
    Ok(ApiResponse::ok(message, status))
}

pub async fn get_ai_config(State(state): State<AppState>) -> ApiResponse<AiConfig> {
    ApiResponse::ok("success", state.ai_config.snapshot().await)
}

/// Replace the provider settings used by later analyses
pub async fn save_ai_config(
    State(state): State<AppState>,
    Json(config): Json<AiConfig>,
) -> ApiResponse<AiConfig> {
    state.ai_config.replace(config.clone()).await;
    tracing::info!(provider = %config.provider, model = %config.model, "AI config updated");
    ApiResponse::ok("AI config saved", config)
}

/// Analyze a file with the configured provider and model
pub async fn analyze_file(
    State(state): State<AppState>,
    Json(req): Json<AiAnalyzeRequest>,
) -> AppResult<ApiResponse<AiAnalysis>> {
    let path = PathBuf::from(&req.file_path);
    if req.file_path.trim().is_empty() || !path.exists() {
        return Err(AppError::FileNotFound(req.file_path));
    }

    let analysis = state
        .analyzer
        .analyze(&path, None)
        .await
        .map_err(AppError::Analyze)?;
    Ok(ApiResponse::ok("Analysis complete", analysis))
}
