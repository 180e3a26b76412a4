//! AI naming suggestions from a local Ollama server or a remote
//! OpenAI-compatible provider.
//!
//! The two provider families differ when the model reply holds
//! no usable JSON: the local path degrades to a zero-confidence answer, the
//! remote path returns [`AiError::Malformed`].

pub mod config;
pub mod extract;
pub mod http_client;
pub mod ollama;
pub mod openai;
pub mod pdf;
pub mod prompts;

pub use config::{AiConfig, AiConfigHandle, Provider};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::models::{AiAnalysis, AiTestRequest, ConnectionStatus};
use config::resolve_base_url;
use http_client::validation_client;

/// Longest provider error body kept in an error message
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("cannot reach {provider}: {message}")]
    Unreachable { provider: Provider, message: String },

    #[error("{provider} timed out")]
    Timeout { provider: Provider },

    #[error("{provider} returned an error (status {status}): {body}")]
    Provider {
        provider: Provider,
        status: u16,
        body: String,
    },

    #[error("malformed AI response: {0}")]
    Malformed(String),

    #[error("API key for {0} must not be empty")]
    MissingApiKey(Provider),

    #[error("API key for {0} is invalid")]
    InvalidApiKey(Provider),

    #[error("unsupported AI provider: {0}")]
    UnsupportedProvider(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AiError {
    /// Classifies a transport failure
    pub(crate) fn from_reqwest(provider: Provider, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { provider }
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Unreachable {
                provider,
                message: err.to_string(),
            }
        }
    }

    /// Non-success status with the body cut to a readable length
    pub(crate) async fn from_status(provider: Provider, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::Provider {
            provider,
            status,
            body: truncate(body.trim(), MAX_ERROR_BODY),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Produces a naming suggestion for a file
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// `model` overrides the configured model when given
    async fn analyze(&self, path: &Path, model: Option<&str>) -> Result<AiAnalysis, AiError>;
}

/// Analyzer backed by the live provider configuration
#[derive(Debug, Clone)]
pub struct AiClient {
    config: AiConfigHandle,
}

impl AiClient {
    pub fn new(config: AiConfigHandle) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Analyzer for AiClient {
    async fn analyze(&self, path: &Path, model: Option<&str>) -> Result<AiAnalysis, AiError> {
        let config = self.config.snapshot().await;
        let model = config.effective_model(model);

        match config.provider {
            Provider::Ollama => ollama::analyze(&config.effective_base_url(), path, &model).await,
            Provider::OpenAi | Provider::DeepSeek | Provider::Qwen => {
                openai::analyze(&config, path, &model).await
            }
        }
    }
}

/// Checks that a provider answers with the given settings.
///
/// Remote providers need a key; it is checked locally before any request.
pub async fn test_connection(req: &AiTestRequest) -> Result<ConnectionStatus, AiError> {
    let provider: Provider = req.provider.parse()?;
    let base_url = resolve_base_url(provider, &req.base_url);

    if provider.is_local() {
        let response = validation_client()
            .get(format!("{}/api/tags", base_url))
            .send()
            .await
            .map_err(|e| AiError::from_reqwest(provider, e))?;
        if !response.status().is_success() {
            return Err(AiError::from_status(provider, response).await);
        }
    } else {
        if req.api_key.trim().is_empty() {
            return Err(AiError::MissingApiKey(provider));
        }

        let response = validation_client()
            .get(format!("{}/models", base_url))
            .bearer_auth(req.api_key.trim())
            .send()
            .await
            .map_err(|e| AiError::from_reqwest(provider, e))?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AiError::InvalidApiKey(provider));
        }
        if !response.status().is_success() {
            return Err(AiError::from_status(provider, response).await);
        }
    }

    tracing::info!(provider = %provider, base_url = %base_url, "AI connection test passed");
    Ok(ConnectionStatus {
        status: "connected".to_string(),
        provider: provider.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// Names of the models installed on an Ollama server
pub async fn list_ollama_models(base_url: &str) -> Result<Vec<String>, AiError> {
    let provider = Provider::Ollama;
    let response = validation_client()
        .get(format!("{}/api/tags", base_url.trim_end_matches('/')))
        .send()
        .await
        .map_err(|e| AiError::from_reqwest(provider, e))?;
    if !response.status().is_success() {
        return Err(AiError::from_status(provider, response).await);
    }

    let tags: TagsResponse = response
        .json()
        .await
        .map_err(|e| AiError::from_reqwest(provider, e))?;
    Ok(tags.models.into_iter().map(|m| m.name).collect())
}


#[cfg(test)]
mod tests {
    use super::testing::{dead_url, serve};
    use super::*;
    use axum::http::{HeaderMap, StatusCode as HttpStatus};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    fn test_request(provider: &str, base_url: &str, api_key: &str) -> AiTestRequest {
        AiTestRequest {
            provider: provider.to_string(),
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            model: String::new(),
        }
    }

    async fn models_endpoint(headers: HeaderMap) -> (HttpStatus, Json<serde_json::Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if auth == "Bearer good-key" {
            (HttpStatus::OK, Json(json!({"data": [{"id": "gpt-4o-mini"}]})))
        } else {
            (HttpStatus::UNAUTHORIZED, Json(json!({"error": "bad key"})))
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }

    #[tokio::test]
    async fn test_remote_connection_needs_key() {
        // no server: the request must never be attempted
        let err = test_connection(&test_request("deepseek", &dead_url().await, "  "))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::MissingApiKey(Provider::DeepSeek)));
    }

    #[tokio::test]
    async fn test_remote_connection_key_check() {
        let base = serve(Router::new().route("/models", get(models_endpoint))).await;

        let ok = test_connection(&test_request("openai", &base, "good-key")).await.unwrap();
        assert_eq!(ok.status, "connected");
        assert_eq!(ok.provider, "openai");

        let err = test_connection(&test_request("openai", &base, "stale-key"))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::InvalidApiKey(Provider::OpenAi)));
    }

    #[tokio::test]
    async fn test_remote_connection_server_error() {
        let router = Router::new().route(
            "/models",
            get(|| async { (HttpStatus::BAD_GATEWAY, "upstream down") }),
        );
        let base = serve(router).await;
        let err = test_connection(&test_request("qwen", &base, "k")).await.unwrap_err();
        assert!(matches!(err, AiError::Provider { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_local_connection() {
        let router = Router::new().route("/api/tags", get(|| async { Json(json!({"models": []})) }));
        let base = serve(router).await;
        let ok = test_connection(&test_request("ollama", &base, "")).await.unwrap();
        assert_eq!(ok.provider, "ollama");

        let err = test_connection(&test_request("ollama", &dead_url().await, ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Unreachable { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_provider() {
        let err = test_connection(&test_request("gemini", "", "k")).await.unwrap_err();
        assert!(matches!(err, AiError::UnsupportedProvider(_)));
    }

    #[tokio::test]
    async fn test_list_models() {
        let router = Router::new().route(
            "/api/tags",
            get(|| async {
                Json(json!({"models": [{"name": "qwen3-vl:4b", "size": 1}, {"name": "llama3.2:3b"}]}))
            }),
        );
        let base = serve(router).await;
        let models = list_ollama_models(&format!("{}/", base)).await.unwrap();
        assert_eq!(models, vec!["qwen3-vl:4b", "llama3.2:3b"]);
    }
}
