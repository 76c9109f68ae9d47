//! Core domain types for Codenames.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// A team in the game.
///
/// Red is team A: it holds nine words and opens the game.
/// Blue is team B with eight words.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Team {
    /// Team A (goes first).
    Red,
    /// Team B.
    Blue,
}

impl Team {
    /// Returns the opposing team.
    pub fn opponent(self) -> Self {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }

    /// Number of words this team must reveal to win.
    pub fn win_threshold(self) -> u32 {
        match self {
            Team::Red => 9,
            Team::Blue => 8,
        }
    }

    /// The affiliation carried by this team's cells.
    pub fn affiliation(self) -> Affiliation {
        match self {
            Team::Red => Affiliation::Red,
            Team::Blue => Affiliation::Blue,
        }
    }
}

/// Hidden ownership of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Affiliation {
    /// Belongs to red.
    Red,
    /// Belongs to blue.
    Blue,
    /// Bystander.
    Neutral,
    /// Revealing this ends the game.
    Assassin,
}

impl Affiliation {
    /// Returns the team owning this affiliation, if any.
    pub fn team(self) -> Option<Team> {
        match self {
            Affiliation::Red => Some(Team::Red),
            Affiliation::Blue => Some(Team::Blue),
            Affiliation::Neutral | Affiliation::Assassin => None,
        }
    }

    /// Number of cells with this affiliation on a standard board.
    pub fn standard_count(self) -> usize {
        match self {
            Affiliation::Red => 9,
            Affiliation::Blue => 8,
            Affiliation::Neutral => 7,
            Affiliation::Assassin => 1,
        }
    }
}

/// A labeled cell on the board.
///
/// Label and affiliation are fixed at creation; `revealed` only ever
/// goes from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(rename = "word")]
    label: String,
    #[serde(rename = "type")]
    affiliation: Affiliation,
    revealed: bool,
}

impl Cell {
    pub(super) fn new(label: String, affiliation: Affiliation) -> Self {
        Self {
            label,
            affiliation,
            revealed: false,
        }
    }

    /// Same cell with surrounding whitespace removed from the label.
    pub(super) fn trimmed(self) -> Self {
        Self {
            label: self.label.trim().to_string(),
            ..self
        }
    }

    /// The word printed on the cell.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The hidden affiliation.
    pub fn affiliation(&self) -> Affiliation {
        self.affiliation
    }

    /// Whether the cell has been revealed.
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Flips the cell face up. Returns `false` if it already was.
    pub(super) fn reveal(&mut self) -> bool {
        if self.revealed {
            return false;
        }
        self.revealed = true;
        true
    }

    /// Case-insensitive label comparison.
    pub fn matches(&self, word: &str) -> bool {
        self.label.trim().to_lowercase() == word.trim().to_lowercase()
    }
}
