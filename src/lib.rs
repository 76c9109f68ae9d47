//! Strictly Codenames library - autonomous Codenames played by language models
//!
//! A game is a single owned [`GameState`] advanced by the pure
//! [`transition`] function. The [`Orchestrator`] asks a [`ModelAdapter`]
//! for clues and guesses and feeds the replies through that function.
//!
//! # Architecture
//!
//! - **Rules**: board, scoring and the transition function
//! - **Provider**: prompts, reply validation and retries around an LLM
//! - **Orchestrator**: the turn loop, cancellable and paced
//! - **Recorder / Replay**: finished games as JSON, replayed through the rules
//! - **API**: clue and guess requests over HTTP
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_codenames::{
//!     AgentConfig, Board, GameState, Orchestrator, RetryPolicy, Shutdown,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let agent = AgentConfig::new("gpt-4o".to_string());
//! let adapter = agent.build_adapter(RetryPolicy::default())?;
//! let mut orchestrator = Orchestrator::new(Arc::new(adapter));
//!
//! let board = Board::random(&mut rand::thread_rng());
//! let outcome = orchestrator.run(GameState::new(board), Shutdown::never()).await;
//! println!("winner: {:?}", outcome.state.winner());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod agent_config;
mod agent_library;
mod api;
mod config;
mod games;
mod llm_client;
mod orchestrator;
mod provider;
mod recorder;
mod replay;
mod shutdown;

// Crate-level exports - Configuration
pub use agent_config::{AgentConfig, ConfigError};
pub use agent_library::AgentLibrary;
pub use config::GameConfig;

// Crate-level exports - LLM client
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Game rules
pub use games::codenames::{
    Affiliation, BOARD_SIZE, Board, BoardError, Cell, Clue, ClueCount, Consequence,
    DEFAULT_WORDS, Discard, Effect, Event, GUESS_CAP, GameState, Guess, Phase, Reveal,
    SKIP_WORD, StateError, Team, Transition, Turn, score_reveal, standard_affiliations,
    transition,
};

// Crate-level exports - Model provider
pub use provider::{
    Backoff, ClueResponse, Completion, GuessReply, GuessResponse, LlmAdapter, ModelAdapter,
    ProviderError, ProviderFailure, RetryPolicy, Role, clue_prompt, guess_prompt, parse_clue,
    parse_guess, strip_code_fence, system_prompt,
};

// Crate-level exports - Orchestration
pub use orchestrator::{
    DEFAULT_MAX_GUESS_REQUESTS, GameEvent, Orchestrator, OrchestratorSettings, RunOutcome,
    RunStatus, StepOutcome,
};
pub use shutdown::{Shutdown, ShutdownHandle};

// Crate-level exports - Recording and replay
pub use recorder::{
    FinalScore, GameRecord, InitialOptions, JsonFileSink, MemorySink, RecordError, RecordSink,
    record,
};
pub use replay::{Replay, ReplayDivergence, ReplayError, Snapshot, SnapshotEvent, replay};

// Crate-level exports - HTTP API
pub use api::{ApiError, ApiState, ErrorBody, TurnRequest, TurnResponse, router, serve};
