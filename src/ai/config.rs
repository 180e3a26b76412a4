//! Runtime AI provider configuration.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::AiError;

/// Local model server
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Vision-capable default; text-only requests drop the `-vl` marker
pub const DEFAULT_MODEL: &str = "qwen3-vl:4b";

/// AI backend family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Ollama,
    OpenAi,
    DeepSeek,
    Qwen,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
            Self::DeepSeek => "deepseek",
            Self::Qwen => "qwen",
        }
    }

    /// Base URL used when the config leaves it blank
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Ollama => DEFAULT_OLLAMA_URL,
            Self::OpenAi => "https://api.openai.com/v1",
            Self::DeepSeek => "https://api.deepseek.com/v1",
            Self::Qwen => "https://dashscope.aliyuncs.com/compatible-mode/v1",
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Ollama)
    }
}

impl FromStr for Provider {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            "deepseek" => Ok(Self::DeepSeek),
            "qwen" => Ok(Self::Qwen),
            other => Err(AiError::UnsupportedProvider(other.to_string())),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    pub provider: Provider,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Ollama,
            api_key: String::new(),
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl AiConfig {
    /// Configured base URL without a trailing slash, or the provider default
    pub fn effective_base_url(&self) -> String {
        resolve_base_url(self.provider, &self.base_url)
    }

    /// `requested` when non-empty, otherwise the configured model
    pub fn effective_model(&self, requested: Option<&str>) -> String {
        match requested.map(str::trim).filter(|m| !m.is_empty()) {
            Some(model) => model.to_string(),
            None => self.model.clone(),
        }
    }
}

pub(crate) fn resolve_base_url(provider: Provider, base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        provider.default_base_url().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Process-wide AI settings.
///
/// Readers take a snapshot, so an analysis never sees a half-applied save.
#[derive(Debug, Clone, Default)]
pub struct AiConfigHandle {
    inner: Arc<RwLock<AiConfig>>,
}

impl AiConfigHandle {
    pub fn new(config: AiConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub async fn snapshot(&self) -> AiConfig {
        self.inner.read().await.clone()
    }

    /// Replaces the whole configuration
    pub async fn replace(&self, config: AiConfig) {
        *self.inner.write().await = config;
    }
}
