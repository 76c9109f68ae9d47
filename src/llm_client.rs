//! Chat completion client for OpenAI and Anthropic models.

use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs,
    },
};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Which vendor serves the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI (GPT and o-series models).
    #[display("openai")]
    OpenAI,
    /// Anthropic (Claude models).
    #[display("anthropic")]
    Anthropic,
}

impl LlmProvider {
    /// Environment variable holding this vendor's API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// Model and sampling settings for one client.
#[derive(Debug, Clone, Getters)]
pub struct LlmConfig {
    /// Vendor serving the model.
    provider: LlmProvider,
    /// API key sent with every request.
    #[getter(skip)]
    api_key: String,
    /// Model identifier as the vendor spells it.
    model: String,
    /// Upper bound on reply tokens.
    max_tokens: u32,
    /// Sampling temperature; vendor default when absent.
    temperature: Option<f32>,
    /// Fold the system prompt into the user message.
    inline_system_prompt: bool,
}

impl LlmConfig {
    /// Settings with vendor-default sampling and a separate system message.
    pub fn new(provider: LlmProvider, api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            provider,
            api_key,
            model,
            max_tokens,
            temperature: None,
            inline_system_prompt: false,
        }
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sends the system prompt as part of the user message.
    ///
    /// o1-family models reject system messages.
    pub fn with_inline_system_prompt(mut self, inline: bool) -> Self {
        self.inline_system_prompt = inline;
        self
    }

    /// Whether the model is an OpenAI o-series reasoning model (`o1`, `o3-mini`, ...).
    pub fn is_reasoning_model(&self) -> bool {
        let mut chars = self.model.chars();
        self.provider == LlmProvider::OpenAI
            && chars.next() == Some('o')
            && chars.next().is_some_and(|c| c.is_ascii_digit())
    }
}

/// The messages of one request after system prompt folding.
struct Exchange {
    system: Option<String>,
    user: String,
}

impl Exchange {
    fn new(config: &LlmConfig, system_prompt: &str, user_message: &str) -> Self {
        if config.inline_system_prompt {
            Self {
                system: None,
                user: format!("{system_prompt}\n\n{user_message}"),
            }
        } else {
            Self {
                system: Some(system_prompt.to_string()),
                user: user_message.to_string(),
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Backend {
    OpenAI(OpenAIClient<OpenAIConfig>),
    Anthropic(reqwest::Client),
}

/// Client bound to one provider and model.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    backend: Backend,
}

impl LlmClient {
    /// Creates a client for the configured provider.
    #[instrument(skip(config), fields(provider = %config.provider, model = %config.model))]
    pub fn new(config: LlmConfig) -> Self {
        let backend = match config.provider {
            LlmProvider::OpenAI => Backend::OpenAI(OpenAIClient::with_config(
                OpenAIConfig::new().with_api_key(config.api_key.clone()),
            )),
            LlmProvider::Anthropic => Backend::Anthropic(reqwest::Client::new()),
        };
        info!("LLM client ready");
        Self { config, backend }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Sends one system prompt and user message, returning the reply text.
    #[instrument(skip_all, fields(provider = %self.config.provider, model = %self.config.model))]
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        let exchange = Exchange::new(&self.config, system_prompt, user_message);
        let content = match &self.backend {
            Backend::OpenAI(client) => self.openai(client, exchange).await?,
            Backend::Anthropic(http) => self.anthropic(http, exchange).await?,
        };
        info!(content_length = content.len(), "Completion received");
        Ok(content)
    }

    async fn anthropic(&self, http: &reqwest::Client, exchange: Exchange) -> Result<String, LlmError> {
        let body = AnthropicRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: exchange.system.as_deref(),
            temperature: self.config.temperature,
            messages: vec![AnthropicMessage {
                role: "user",
                content: &exchange.user,
            }],
        };

        debug!("Sending request to Anthropic");
        let response = http
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::new(format!("Anthropic request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::new(format!("Failed to read Anthropic response: {e}")))?;
        if !status.is_success() {
            return Err(LlmError::new(format!("Anthropic API error {status}: {text}")));
        }

        let parsed: AnthropicResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::new(format!("Unexpected Anthropic response shape: {e}")))?;
        parsed
            .content
            .into_iter()
            .find_map(|block| (block.kind == "text").then_some(block.text).flatten())
            .ok_or_else(|| LlmError::new("No text block in Anthropic response".to_string()))
    }

    async fn openai(
        &self,
        client: &OpenAIClient<OpenAIConfig>,
        exchange: Exchange,
    ) -> Result<String, LlmError> {
        let request = openai_request(&self.config, exchange)?;

        debug!("Sending request to OpenAI");
        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::new(format!("OpenAI API error: {e}")))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::new("No content in OpenAI response".to_string()))
    }
}

/// Builds the chat request for `config`.
///
/// o-series models get neither a token limit nor a temperature; other
/// models get `max_completion_tokens`.
fn openai_request(
    config: &LlmConfig,
    exchange: Exchange,
) -> Result<CreateChatCompletionRequest, LlmError> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = exchange.system {
        let message = ChatCompletionRequestSystemMessageArgs::default()
            .content(system)
            .build()
            .map_err(|e| LlmError::new(format!("Invalid system message: {e}")))?;
        messages.push(ChatCompletionRequestMessage::System(message));
    }
    let message = ChatCompletionRequestUserMessageArgs::default()
        .content(exchange.user)
        .build()
        .map_err(|e| LlmError::new(format!("Invalid user message: {e}")))?;
    messages.push(ChatCompletionRequestMessage::User(message));

    let mut args = CreateChatCompletionRequestArgs::default();
    args.model(&config.model).messages(messages);
    if config.is_reasoning_model() {
        debug!(model = %config.model, "Reasoning model, no token limit or temperature");
    } else {
        args.max_completion_tokens(config.max_tokens);
        if let Some(temperature) = config.temperature {
            args.temperature(temperature);
        }
    }
    args.build()
        .map_err(|e| LlmError::new(format!("Invalid chat request: {e}")))
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Transport or vendor failure while producing a completion.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error: {} at {}:{}", message, file, line)]
pub struct LlmError {
    /// What went wrong.
    pub message: String,
    /// Line where the error was raised.
    pub line: u32,
    /// File where the error was raised.
    pub file: &'static str,
}

impl LlmError {
    /// Creates an error stamped with the caller's location.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "LLM error");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
