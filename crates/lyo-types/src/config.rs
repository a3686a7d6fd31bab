use serde::{Deserialize, Serialize};

/// Top-level application configuration, persisted under `CONFIG_STORAGE_KEY`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LyoConfig {
    pub llm: LlmConfig,
    pub storage: StorageConfig,
}

pub const CONFIG_STORAGE_KEY: &str = "lyo:config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub api_key: String,
    pub api_base: Option<String>,
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            model: "gpt-4".to_string(),
            api_key: String::new(),
            api_base: None,
            max_tokens: None,
        }
    }
}

impl LlmConfig {
    pub fn base_url(&self) -> String {
        self.api_base
            .clone()
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LlmProvider {
    #[default]
    OpenAI,
    DeepSeek,
    Custom,
}

impl LlmProvider {
    pub fn default_base_url(&self) -> &str {
        match self {
            LlmProvider::OpenAI => "https://api.openai.com",
            LlmProvider::DeepSeek => "https://api.deepseek.com",
            LlmProvider::Custom => "",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            LlmProvider::OpenAI => "OpenAI",
            LlmProvider::DeepSeek => "DeepSeek",
            LlmProvider::Custom => "Custom",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackendType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StorageBackendType {
    /// localStorage when available, memory otherwise
    #[default]
    Auto,
    Memory,
    LocalStorage,
}
