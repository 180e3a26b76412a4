//! Remote OpenAI-compatible chat completions (OpenAI, DeepSeek, Qwen).

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::extract::extract_analysis;
use super::http_client::{ai_client, REMOTE_TIMEOUT};
use super::{prompts, AiConfig, AiError};
use crate::models::AiAnalysis;
use crate::rules::template::split_name;

const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [CompletionMessage<'a>; 1],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct CompletionMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Suggest a name from the file name alone.
///
/// Unlike the local path, a reply without usable JSON is an error.
pub async fn analyze(config: &AiConfig, path: &Path, model: &str) -> Result<AiAnalysis, AiError> {
    let provider = config.provider;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let (_, ext) = split_name(&file_name);

    let prompt = prompts::remote_prompt(&file_name, ext);
    let request = CompletionRequest {
        model,
        messages: [CompletionMessage {
            role: "user",
            content: &prompt,
        }],
        temperature: TEMPERATURE,
    };

    let url = format!("{}/chat/completions", config.effective_base_url());
    debug!(provider = %provider, model = %model, file = %file_name, "Sending completion request");

    let mut builder = ai_client().post(&url).timeout(REMOTE_TIMEOUT).json(&request);
    if !config.api_key.trim().is_empty() {
        builder = builder.bearer_auth(config.api_key.trim());
    }

    let response = builder
        .send()
        .await
        .map_err(|e| AiError::from_reqwest(provider, e))?;
    if !response.status().is_success() {
        return Err(AiError::from_status(provider, response).await);
    }

    let completion: CompletionResponse = response
        .json()
        .await
        .map_err(|e| AiError::from_reqwest(provider, e))?;
    let content = completion
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| AiError::Malformed(format!("{} returned no choices", provider)))?;

    debug!(provider = %provider, raw = %content, "Completion reply");

    extract_analysis(&content).map_err(|e| AiError::Malformed(e.to_string()))
}
