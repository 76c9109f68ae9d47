//! Agent configuration: which model plays a team and how it is called.

use crate::llm_client::{LlmClient, LlmConfig, LlmProvider};
use crate::provider::{LlmAdapter, RetryPolicy};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Configuration for a model-backed player.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Agent name, used in logs and to pick agents by name.
    name: String,

    /// LLM provider (openai or anthropic).
    #[serde(default = "default_provider")]
    llm_provider: LlmProvider,

    /// LLM model name (e.g., "gpt-4o", "claude-3-5-sonnet").
    #[serde(default = "default_model")]
    llm_model: String,

    /// Maximum tokens for LLM responses.
    #[serde(default = "default_max_tokens")]
    llm_max_tokens: u32,

    /// Sampling temperature; provider default when unset.
    #[serde(default)]
    temperature: Option<f32>,

    /// Fold the system prompt into the user message (o1 family).
    #[serde(default)]
    inline_system_prompt: bool,
}

fn default_provider() -> LlmProvider {
    LlmProvider::OpenAI
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

impl AgentConfig {
    /// Creates an agent with default provider settings.
    #[instrument(skip(name), fields(agent_name = %name))]
    pub fn new(name: String) -> Self {
        Self {
            name,
            llm_provider: default_provider(),
            llm_model: default_model(),
            llm_max_tokens: default_max_tokens(),
            temperature: None,
            inline_system_prompt: false,
        }
    }

    /// Sets provider and model.
    pub fn with_model(mut self, provider: LlmProvider, model: impl Into<String>) -> Self {
        self.llm_provider = provider;
        self.llm_model = model.into();
        self
    }

    /// Reads an agent preset from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::new(format!("Cannot read {}: {}", path.display(), e)))?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| ConfigError::new(format!("Invalid agent preset {}: {}", path.display(), e)))?;
        debug!(agent_name = %config.name, model = %config.llm_model, "Agent preset loaded");
        Ok(config)
    }

    /// Client settings for this agent, with the API key taken from the
    /// provider's environment variable.
    #[instrument(skip(self), fields(provider = %self.llm_provider, model = %self.llm_model))]
    pub fn create_llm_config(&self) -> Result<LlmConfig, ConfigError> {
        let key_var = self.llm_provider.api_key_var();
        let api_key = std::env::var(key_var)
            .map_err(|_| ConfigError::new(format!("{} is not set for agent {}", key_var, self.name)))?;
        info!(agent_name = %self.name, "API key found");

        Ok(LlmConfig::new(
            self.llm_provider,
            api_key,
            self.llm_model.clone(),
            self.llm_max_tokens,
        )
        .with_temperature(self.temperature)
        .with_inline_system_prompt(self.inline_system_prompt))
    }

    /// Builds a model adapter for this agent.
    #[instrument(skip(self, retry), fields(agent_name = %self.name))]
    pub fn build_adapter(&self, retry: RetryPolicy) -> Result<LlmAdapter, ConfigError> {
        let client = LlmClient::new(self.create_llm_config()?);
        Ok(LlmAdapter::new(self.name.clone(), client).with_retry(retry))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
