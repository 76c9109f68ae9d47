//! LLM-backed implementation of [`ModelAdapter`].

use super::prompts::{clue_prompt, guess_prompt, system_prompt};
use super::response::{parse_clue, parse_guess};
use super::retry::RetryPolicy;
use super::{GuessReply, ModelAdapter, ProviderError, ProviderFailure, Role};
use crate::games::codenames::{Clue, GameState};
use crate::llm_client::{LlmClient, LlmError};
use tracing::{debug, instrument};

/// A text completion backend.
#[async_trait::async_trait]
pub trait Completion: Send + Sync {
    /// Returns the raw model text for a system prompt and user message.
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError>;
}

#[async_trait::async_trait]
impl Completion for LlmClient {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError> {
        self.generate(system_prompt, user_message).await
    }
}

/// Adapter that prompts a completion backend and validates its replies.
#[derive(Debug, Clone)]
pub struct LlmAdapter<C = LlmClient> {
    name: String,
    completion: C,
    retry: RetryPolicy,
}

impl<C: Completion> LlmAdapter<C> {
    /// Creates an adapter with the default retry policy.
    pub fn new(name: impl Into<String>, completion: C) -> Self {
        Self {
            name: name.into(),
            completion,
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The agent name used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The completion backend.
    pub fn completion(&self) -> &C {
        &self.completion
    }

    /// The retry policy in use.
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    async fn call(&self, role: Role, user_message: &str) -> Result<String, ProviderError> {
        let system = system_prompt(role);
        self.completion
            .complete(&system, user_message)
            .await
            .map_err(|e| ProviderError::Transport(e.message))
    }
}

#[async_trait::async_trait]
impl<C: Completion> ModelAdapter for LlmAdapter<C> {
    #[instrument(skip(self, state), fields(agent = %self.name, team = %state.current_team()))]
    async fn request_clue(&self, state: &GameState) -> Result<Clue, ProviderFailure> {
        let prompt = clue_prompt(state);
        self.retry
            .run(Role::ClueGiver, |attempt| {
                let prompt = &prompt;
                async move {
                    debug!(attempt, "Requesting clue");
                    let raw = self.call(Role::ClueGiver, prompt).await?;
                    parse_clue(&raw, state.board())
                }
            })
            .await
    }

    #[instrument(skip(self, state), fields(agent = %self.name, team = %state.current_team()))]
    async fn request_guess(&self, state: &GameState) -> Result<GuessReply, ProviderFailure> {
        let prompt = guess_prompt(state);
        self.retry
            .run(Role::Guesser, |attempt| {
                let prompt = &prompt;
                async move {
                    debug!(attempt, "Requesting guess");
                    let raw = self.call(Role::Guesser, prompt).await?;
                    parse_guess(&raw)
                }
            })
            .await
    }
}
