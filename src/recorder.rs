//! Game recorder: projects a finished game into a persisted record.

use crate::games::codenames::{Affiliation, Cell, GameState, Team, Turn};
use chrono::{DateTime, Utc};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

/// Starting layout of a recorded game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialOptions {
    /// Board words in grid order.
    pub words: Vec<String>,
    /// Affiliation of each word.
    pub card_types: Vec<Affiliation>,
}

/// Final score of both teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScore {
    /// Red's revealed words.
    pub red: u32,
    /// Blue's revealed words.
    pub blue: u32,
}

impl FinalScore {
    /// Score of `team`.
    pub fn of(&self, team: Team) -> u32 {
        match team {
            Team::Red => self.red,
            Team::Blue => self.blue,
        }
    }
}

/// Serialized record of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// When the game was recorded.
    pub date: DateTime<Utc>,
    /// Board layout at the start.
    pub initial_options: InitialOptions,
    /// Winning team.
    pub winner: Team,
    /// Scores at the end.
    pub final_score: FinalScore,
    /// Every turn, oldest first.
    pub history: Vec<Turn>,
    /// Board at the end.
    pub cards: Vec<Cell>,
}

impl GameRecord {
    /// Projects a finished game, stamped with `date`.
    pub fn from_state(state: &GameState, date: DateTime<Utc>) -> Result<Self, RecordError> {
        let winner = match (state.is_over(), state.winner()) {
            (true, Some(winner)) => winner,
            _ => return Err(RecordError::new("game is not over")),
        };
        let board = state.board();
        Ok(Self {
            date,
            initial_options: InitialOptions {
                words: board.labels(),
                card_types: board.affiliations(),
            },
            winner,
            final_score: FinalScore {
                red: state.score(Team::Red),
                blue: state.score(Team::Blue),
            },
            history: state.history().to_vec(),
            cards: board.cells().to_vec(),
        })
    }

    /// Reads a record from a JSON file.
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, RecordError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RecordError::new(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let record = serde_json::from_str(&contents).map_err(|e| {
            RecordError::new(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        debug!("Record loaded");
        Ok(record)
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, RecordError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| RecordError::new(format!("Failed to serialize record: {}", e)))
    }

    /// File name used by [`JsonFileSink`].
    pub fn file_name(&self) -> String {
        format!(
            "codenames-game-{}.json",
            self.date.format("%Y-%m-%dT%H-%M-%S%.3fZ")
        )
    }
}

/// Records a finished game as of now.
#[instrument(skip(state), fields(winner = ?state.winner()))]
pub fn record(state: &GameState) -> Result<GameRecord, RecordError> {
    let record = GameRecord::from_state(state, Utc::now())?;
    info!(turns = record.history.len(), "Game recorded");
    Ok(record)
}

/// Destination for finished game records.
pub trait RecordSink: Send + Sync {
    /// Persists one record.
    fn store(&self, record: &GameRecord) -> Result<(), RecordError>;
}

/// Writes each record to its own JSON file in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    /// Creates a sink writing into `dir`, created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a record will be written to.
    pub fn path_for(&self, record: &GameRecord) -> PathBuf {
        self.dir.join(record.file_name())
    }
}

impl RecordSink for JsonFileSink {
    #[instrument(skip(self, record), fields(dir = %self.dir.display()))]
    fn store(&self, record: &GameRecord) -> Result<(), RecordError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            RecordError::new(format!("Failed to create {}: {}", self.dir.display(), e))
        })?;
        let path = self.path_for(record);
        std::fs::write(&path, record.to_json_pretty()?).map_err(|e| {
            RecordError::new(format!("Failed to write {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), "Record written");
        Ok(())
    }
}

/// Keeps records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<GameRecord>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records stored so far.
    pub fn records(&self) -> Vec<GameRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl RecordSink for MemorySink {
    fn store(&self, record: &GameRecord) -> Result<(), RecordError> {
        self.records
            .lock()
            .map_err(|_| RecordError::new("memory sink lock poisoned"))?
            .push(record.clone());
        Ok(())
    }
}

/// Recording error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Record error: {} at {}:{}", message, file, line)]
pub struct RecordError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl RecordError {
    /// Creates a new record error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
