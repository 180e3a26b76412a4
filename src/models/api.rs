//! Request and response bodies of the local HTTP API.

use serde::{Deserialize, Serialize};

use super::{AiAnalysis, TemplateComponent};

#[derive(Debug, Clone, Deserialize)]
pub struct FileProcessRequest {
    pub file_path: String,
    #[serde(default)]
    pub use_ai: bool,
    /// Overrides the configured model for this call only
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub rule_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileProcessResponse {
    pub original_path: String,
    pub original_name: String,
    pub new_name: String,
    pub destination: String,
    pub rule_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AiAnalysis>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiTestRequest {
    pub provider: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub status: String,
    pub provider: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiAnalyzeRequest {
    pub file_path: String,
    /// Accepted for client compatibility; analysis always uses the configured provider.
    #[serde(default)]
    pub analyze_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportTemplateRequest {
    pub name: String,
    pub components: Vec<TemplateComponent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchFolderRequest {
    pub path: String,
}
