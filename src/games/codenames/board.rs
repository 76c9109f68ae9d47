//! The 5x5 word grid and its layout invariants.

use super::types::{Affiliation, Cell};
use super::words::DEFAULT_WORDS;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::IntoEnumIterator;
use tracing::{debug, instrument, warn};

/// Number of cells on a board.
pub const BOARD_SIZE: usize = 25;

/// Error raised while building a board.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum BoardError {
    /// The word list does not have exactly 25 entries.
    #[display("Expected {} words, got {}", BOARD_SIZE, _0)]
    InvalidWordCount(usize),

    /// The affiliation list does not match the 9/8/7/1 composition.
    #[display(
        "Invalid board composition: {} red, {} blue, {} neutral, {} assassin (need 9/8/7/1)",
        red,
        blue,
        neutral,
        assassin
    )]
    InvalidBoardComposition {
        /// Red cells supplied.
        red: usize,
        /// Blue cells supplied.
        blue: usize,
        /// Neutral cells supplied.
        neutral: usize,
        /// Assassin cells supplied.
        assassin: usize,
    },

    /// Two cells share a label (case-insensitive).
    #[display("Duplicate word on board: {}", _0)]
    DuplicateWord(String),

    /// A label is blank.
    #[display("Blank word at position {}", _0)]
    BlankWord(usize),
}

impl std::error::Error for BoardError {}

/// What happened when a reveal was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    /// The cell flipped face up.
    Revealed(Affiliation),
    /// The cell was already face up; nothing changed.
    AlreadyRevealed,
    /// No cell at that index; nothing changed.
    OutOfRange,
}

/// Ordered grid of exactly 25 cells with the standard composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Cell>", into = "Vec<Cell>")]
pub struct Board {
    cells: Vec<Cell>,
}

impl Board {
    /// Creates a board, validating a supplied layout or shuffling the
    /// standard composition when none is given.
    #[instrument(skip(words, affiliations, rng), fields(words = words.len()))]
    pub fn create<R: Rng + ?Sized>(
        words: Vec<String>,
        affiliations: Option<Vec<Affiliation>>,
        rng: &mut R,
    ) -> Result<Self, BoardError> {
        match affiliations {
            Some(affiliations) => Self::from_layout(words, affiliations),
            None => Self::shuffled(words, rng),
        }
    }

    /// Builds a custom board from explicit affiliations.
    #[instrument(skip_all)]
    pub fn from_layout(
        words: Vec<String>,
        affiliations: Vec<Affiliation>,
    ) -> Result<Self, BoardError> {
        check_words(&words)?;
        check_composition(&affiliations)?;

        let cells = words
            .into_iter()
            .zip(affiliations)
            .map(|(word, affiliation)| Cell::new(word.trim().to_string(), affiliation))
            .collect();
        debug!("Custom board accepted");
        Ok(Self { cells })
    }

    /// Assigns the standard 9/8/7/1 composition by uniform shuffle.
    #[instrument(skip_all)]
    pub fn shuffled<R: Rng + ?Sized>(words: Vec<String>, rng: &mut R) -> Result<Self, BoardError> {
        check_words(&words)?;
        let mut affiliations = standard_affiliations();
        affiliations.shuffle(rng);
        Self::from_layout(words, affiliations)
    }

    /// Draws 25 words from the built-in list and shuffles a standard layout.
    #[instrument(skip_all)]
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let words: Vec<String> = DEFAULT_WORDS
            .choose_multiple(rng, BOARD_SIZE)
            .map(|w| w.to_string())
            .collect();
        let mut affiliations = standard_affiliations();
        affiliations.shuffle(rng);
        let cells = words
            .into_iter()
            .zip(affiliations)
            .map(|(word, affiliation)| Cell::new(word, affiliation))
            .collect();
        Self { cells }
    }

    /// Flips the cell at `index`.
    ///
    /// Already-revealed and out-of-range indices are reported, not errors.
    #[instrument(skip(self))]
    pub fn reveal(&mut self, index: usize) -> Reveal {
        let Some(cell) = self.cells.get_mut(index) else {
            warn!(index, "Reveal requested outside the board");
            return Reveal::OutOfRange;
        };
        if cell.reveal() {
            debug!(index, word = %cell.label(), affiliation = %cell.affiliation(), "Cell revealed");
            Reveal::Revealed(cell.affiliation())
        } else {
            debug!(index, "Cell already revealed");
            Reveal::AlreadyRevealed
        }
    }

    /// Finds an unrevealed cell whose label matches `label` case-insensitively.
    pub fn find_unrevealed_index(&self, label: &str) -> Option<usize> {
        self.cells
            .iter()
            .position(|cell| !cell.is_revealed() && cell.matches(label))
    }

    /// Finds any cell by label, revealed or not.
    pub fn find_index(&self, label: &str) -> Option<usize> {
        self.cells.iter().position(|cell| cell.matches(label))
    }

    /// Returns the cell at `index`.
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// All cells in board order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// All labels in board order.
    pub fn labels(&self) -> Vec<String> {
        self.cells.iter().map(|c| c.label().to_string()).collect()
    }

    /// All affiliations in board order.
    pub fn affiliations(&self) -> Vec<Affiliation> {
        self.cells.iter().map(Cell::affiliation).collect()
    }

    /// Labels of unrevealed cells with the given affiliation.
    pub fn unrevealed_labels(&self, affiliation: Affiliation) -> Vec<&str> {
        self.cells
            .iter()
            .filter(|c| !c.is_revealed() && c.affiliation() == affiliation)
            .map(Cell::label)
            .collect()
    }

    /// Labels of every unrevealed cell.
    pub fn unrevealed(&self) -> Vec<&str> {
        self.cells
            .iter()
            .filter(|c| !c.is_revealed())
            .map(Cell::label)
            .collect()
    }

    /// The assassin's label.
    pub fn assassin_label(&self) -> Option<&str> {
        self.cells
            .iter()
            .find(|c| c.affiliation() == Affiliation::Assassin)
            .map(Cell::label)
    }

    /// Number of revealed cells with the given affiliation.
    pub fn revealed_count(&self, affiliation: Affiliation) -> usize {
        self.cells
            .iter()
            .filter(|c| c.is_revealed() && c.affiliation() == affiliation)
            .count()
    }

}

impl TryFrom<Vec<Cell>> for Board {
    type Error = BoardError;

    fn try_from(cells: Vec<Cell>) -> Result<Self, Self::Error> {
        let words: Vec<String> = cells.iter().map(|c| c.label().to_string()).collect();
        check_words(&words)?;
        check_composition(&cells.iter().map(Cell::affiliation).collect::<Vec<_>>())?;
        Ok(Self {
            cells: cells.into_iter().map(Cell::trimmed).collect(),
        })
    }
}

impl From<Board> for Vec<Cell> {
    fn from(board: Board) -> Self {
        board.cells
    }
}

/// The 9/8/7/1 affiliations in a fixed order.
pub fn standard_affiliations() -> Vec<Affiliation> {
    Affiliation::iter()
        .flat_map(|a| std::iter::repeat_n(a, a.standard_count()))
        .collect()
}

fn check_words(words: &[String]) -> Result<(), BoardError> {
    if words.len() != BOARD_SIZE {
        return Err(BoardError::InvalidWordCount(words.len()));
    }
    let mut seen = HashSet::new();
    for (index, word) in words.iter().enumerate() {
        let key = word.trim().to_lowercase();
        if key.is_empty() {
            return Err(BoardError::BlankWord(index));
        }
        if !seen.insert(key) {
            return Err(BoardError::DuplicateWord(word.trim().to_string()));
        }
    }
    Ok(())
}

fn check_composition(affiliations: &[Affiliation]) -> Result<(), BoardError> {
    let count = |target: Affiliation| affiliations.iter().filter(|a| **a == target).count();
    let (red, blue, neutral, assassin) = (
        count(Affiliation::Red),
        count(Affiliation::Blue),
        count(Affiliation::Neutral),
        count(Affiliation::Assassin),
    );
    let valid = Affiliation::iter().all(|a| count(a) == a.standard_count());
    if affiliations.len() != BOARD_SIZE || !valid {
        return Err(BoardError::InvalidBoardComposition {
            red,
            blue,
            neutral,
            assassin,
        });
    }
    Ok(())
}
