//! Scoring and win detection for a single reveal.

use super::super::{Affiliation, GameState, Team};
use tracing::{info, instrument};

/// What a reveal means for the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consequence {
    /// Correct guess; the team may keep guessing.
    Continue,
    /// Wrong-team or neutral word; the turn is over.
    TurnOver,
    /// The game ended with this winner.
    Win(Team),
}

/// Applies the score for a freshly revealed cell and checks for a winner.
///
/// The assassin is checked before any threshold.
#[instrument(skip(state))]
pub fn score_reveal(state: &mut GameState, guessing: Team, affiliation: Affiliation) -> Consequence {
    if affiliation == Affiliation::Assassin {
        let winner = guessing.opponent();
        info!(%guessing, %winner, "Assassin revealed");
        state.finish(winner);
        return Consequence::Win(winner);
    }

    if let Some(owner) = affiliation.team() {
        let score = state.add_point(owner);
        if score >= owner.win_threshold() {
            info!(%owner, score, "Win threshold reached");
            state.finish(owner);
            return Consequence::Win(owner);
        }
    }

    if affiliation.team() == Some(guessing) {
        Consequence::Continue
    } else {
        Consequence::TurnOver
    }
}
