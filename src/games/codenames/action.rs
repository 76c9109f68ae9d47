//! Clues, guesses and turns.
//!
//! These are the domain events of a game. They serialize to the
//! same shape used in saved game records.

use super::Team;
use serde::{Deserialize, Serialize};

/// Hard ceiling on counted guesses for an unbounded clue.
pub const GUESS_CAP: u32 = 100;

/// Word recorded in a turn's history when the guesser passes.
pub const SKIP_WORD: &str = "SKIP";

/// How many board words a clue claims to relate to.
///
/// On the wire this is a plain integer: `0` means no words apply and
/// `100` means all remaining words apply. Both lift the guess bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum ClueCount {
    /// The "0" sentinel.
    NoneApply,
    /// A literal count.
    Exact(u32),
    /// The "100" sentinel.
    AllRemaining,
}

impl ClueCount {
    /// Maximum number of counted guesses this clue allows.
    pub fn budget(self) -> u32 {
        match self {
            ClueCount::Exact(n) => n.saturating_add(1).min(GUESS_CAP),
            ClueCount::NoneApply | ClueCount::AllRemaining => GUESS_CAP,
        }
    }

}

impl From<u32> for ClueCount {
    fn from(n: u32) -> Self {
        match n {
            0 => ClueCount::NoneApply,
            100 => ClueCount::AllRemaining,
            n => ClueCount::Exact(n),
        }
    }
}

impl From<ClueCount> for u32 {
    fn from(count: ClueCount) -> Self {
        match count {
            ClueCount::NoneApply => 0,
            ClueCount::Exact(n) => n,
            ClueCount::AllRemaining => 100,
        }
    }
}

impl std::fmt::Display for ClueCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u32::from(*self))
    }
}

/// A one-word hint from a clue giver.
///
/// The giving team is carried by the enclosing [`Turn`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    /// The hint word.
    pub word: String,
    /// The claimed count.
    #[serde(rename = "number")]
    pub count: ClueCount,
    /// The clue giver's explanation.
    #[serde(rename = "reasoning", default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl Clue {
    /// Creates a clue from its wire number.
    pub fn new(word: impl Into<String>, number: u32) -> Self {
        Self {
            word: word.into(),
            count: ClueCount::from(number),
            rationale: None,
        }
    }

    /// Attaches a rationale.
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }
}

impl std::fmt::Display for Clue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.word, self.count)
    }
}

/// A resolved guess, or a skip marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guess {
    /// The guessed board word, or [`SKIP_WORD`].
    pub word: String,
    /// Whether the revealed cell belonged to the guessing team.
    #[serde(rename = "wasCorrect")]
    pub was_correct: bool,
    /// The guesser's explanation.
    #[serde(rename = "reasoning", default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    skip: bool,
}

impl Guess {
    /// A guess that revealed a cell.
    pub fn resolved(word: impl Into<String>, was_correct: bool, rationale: Option<String>) -> Self {
        Self {
            word: word.into(),
            was_correct,
            rationale,
            skip: false,
        }
    }

    /// The guesser passed.
    pub fn skip(rationale: Option<String>) -> Self {
        Self {
            word: SKIP_WORD.to_string(),
            was_correct: false,
            rationale,
            skip: true,
        }
    }

    /// True for the skip marker.
    ///
    /// Only the explicit flag counts; a board word spelled `SKIP` is a
    /// real guess.
    pub fn is_skip(&self) -> bool {
        self.skip
    }
}

/// One team's clue and the guesses made against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// The team that played the turn.
    pub team: Team,
    /// The clue given.
    pub clue: Clue,
    /// Guesses in the order they resolved.
    #[serde(default)]
    pub guesses: Vec<Guess>,
}

impl Turn {
    /// Opens a turn with no guesses.
    pub fn new(team: Team, clue: Clue) -> Self {
        Self {
            team,
            clue,
            guesses: Vec::new(),
        }
    }

    /// Guesses that revealed a cell (skips excluded).
    pub fn counted_guesses(&self) -> u32 {
        self.guesses.iter().filter(|g| !g.is_skip()).count() as u32
    }

    /// Budget left under this turn's clue.
    pub fn remaining_budget(&self) -> u32 {
        self.clue.count.budget().saturating_sub(self.counted_guesses())
    }

    /// One-line summary used in prompts and logs.
    pub fn summary(&self) -> String {
        let guesses = self
            .guesses
            .iter()
            .map(|g| {
                if g.is_skip() {
                    SKIP_WORD.to_string()
                } else {
                    format!("{}{}", g.word, if g.was_correct { "✓" } else { "✗" })
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}: Clue \"{}\" → Guesses: {}", self.team, self.clue, guesses)
    }
}
