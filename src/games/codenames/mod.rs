//! Codenames: board, turns and rules.

mod action;
mod board;
mod rules;
mod state;
mod types;
mod words;

pub use action::{Clue, ClueCount, GUESS_CAP, Guess, SKIP_WORD, Turn};
pub use board::{BOARD_SIZE, Board, BoardError, Reveal, standard_affiliations};
pub use rules::{Consequence, Discard, Effect, Event, Transition, score_reveal, transition};
pub use state::{GameState, Phase, StateError};
pub use types::{Affiliation, Cell, Team};
pub use words::DEFAULT_WORDS;
