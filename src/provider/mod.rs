//! Model provider adapter: role-specific requests to a text-generation
//! service, normalized into typed clues and guesses.

mod adapter;
mod prompts;
mod response;
mod retry;

pub use adapter::{Completion, LlmAdapter};
pub use prompts::{clue_prompt, guess_prompt, system_prompt};
pub use response::{ClueResponse, GuessResponse, parse_clue, parse_guess, strip_code_fence};
pub use retry::{Backoff, RetryPolicy};

use crate::games::codenames::{Clue, GameState};
use serde::{Deserialize, Serialize};
use strum::Display;

/// The two model-played roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Proposes a clue word and count.
    #[strum(serialize = "clue giver")]
    ClueGiver,
    /// Picks board words for the active clue.
    #[strum(serialize = "guesser")]
    Guesser,
}

/// A single failed provider attempt.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ProviderError {
    /// The service could not be reached or returned an error.
    #[display("transport failure: {}", _0)]
    Transport(String),
    /// The reply did not satisfy the response schema.
    #[display("schema violation: {}", _0)]
    Schema(String),
}

impl std::error::Error for ProviderError {}

/// Terminal failure after the retry policy gave up.
///
/// Fatal to the turn, not to the game.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{} request failed after {} attempt(s): {}", role, attempts, last)]
pub struct ProviderFailure {
    /// Role that was being played.
    pub role: Role,
    /// Attempts made.
    pub attempts: u32,
    /// Cause of the last attempt's failure.
    pub last: ProviderError,
}

impl std::error::Error for ProviderFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.last)
    }
}

/// A guesser's normalized reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GuessReply {
    /// Names one board word.
    Word {
        /// The word.
        word: String,
        /// Explanation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rationale: Option<String>,
    },
    /// Passes for the rest of the turn.
    Skip {
        /// Explanation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rationale: Option<String>,
    },
}

/// Source of clues and guesses for the orchestrator.
///
/// Implementations own their retry behavior; a returned
/// [`ProviderFailure`] means retries are exhausted.
#[async_trait::async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Asks the current team's clue giver for a clue.
    async fn request_clue(&self, state: &GameState) -> Result<Clue, ProviderFailure>;

    /// Asks the current team's guesser for one guess against the active clue.
    async fn request_guess(&self, state: &GameState) -> Result<GuessReply, ProviderFailure>;
}
