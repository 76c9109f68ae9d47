//! Game configuration: who plays each team and how the loop is paced.

use crate::agent_config::ConfigError;
use crate::games::codenames::{Affiliation, Board, BoardError};
use crate::orchestrator::{DEFAULT_MAX_GUESS_REQUESTS, OrchestratorSettings};
use crate::provider::RetryPolicy;
use derive_getters::Getters;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Settings for an automated game, usually loaded from TOML.
///
/// ```toml
/// red_agent = "gpt-4o"
/// blue_agent = "claude"
/// pacing_ms = 1500
/// records_dir = "records"
///
/// [retry]
/// max_attempts = 3
/// backoff = { kind = "exponential", base_ms = 500, cap_ms = 4000 }
/// ```
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Agent name or TOML path playing red.
    #[serde(default = "default_agent")]
    red_agent: String,

    /// Agent name or TOML path playing blue.
    #[serde(default = "default_agent")]
    blue_agent: String,

    /// Provider retry policy.
    #[serde(default)]
    retry: RetryPolicy,

    /// Delay between transitions, in milliseconds.
    #[serde(default)]
    pacing_ms: u64,

    /// Guess requests allowed per turn.
    #[serde(default = "default_max_guess_requests")]
    max_guess_requests: u32,

    /// Where finished games are written; not written when unset.
    #[serde(default)]
    records_dir: Option<PathBuf>,

    /// Custom board words; drawn from the built-in list when unset.
    #[serde(default)]
    words: Option<Vec<String>>,

    /// Fixed affiliations for `words`, in board order; shuffled when unset.
    #[serde(default)]
    card_types: Option<Vec<Affiliation>>,

    /// Seed for board shuffling.
    #[serde(default)]
    seed: Option<u64>,
}

fn default_agent() -> String {
    "gpt-4o".to_string()
}

fn default_max_guess_requests() -> u32 {
    DEFAULT_MAX_GUESS_REQUESTS
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            red_agent: default_agent(),
            blue_agent: default_agent(),
            retry: RetryPolicy::default(),
            pacing_ms: 0,
            max_guess_requests: default_max_guess_requests(),
            records_dir: None,
            words: None,
            card_types: None,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Loads a game config from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading game config");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read game config: {}", e)))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse game config: {}", e)))?;
        info!(red = %config.red_agent, blue = %config.blue_agent, "Game config loaded");
        Ok(config)
    }

    /// Overrides the agents.
    pub fn with_agents(mut self, red: Option<String>, blue: Option<String>) -> Self {
        if let Some(red) = red {
            self.red_agent = red;
        }
        if let Some(blue) = blue {
            self.blue_agent = blue;
        }
        self
    }

    /// Overrides the records directory.
    pub fn with_records_dir(mut self, dir: Option<PathBuf>) -> Self {
        if dir.is_some() {
            self.records_dir = dir;
        }
        self
    }

    /// Builds the opening board from `words` and `card_types`, seeded
    /// when `seed` is set.
    #[instrument(skip(self), fields(seed = ?self.seed))]
    pub fn build_board(&self) -> Result<Board, BoardError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        match &self.words {
            Some(words) => Board::create(words.clone(), self.card_types.clone(), &mut rng),
            None => {
                if self.card_types.is_some() {
                    warn!("card_types ignored without words");
                }
                Ok(Board::random(&mut rng))
            }
        }
    }

    /// Orchestrator settings derived from this config.
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            pacing: Duration::from_millis(self.pacing_ms),
            max_guess_requests: self.max_guess_requests,
        }
    }
}
