//! The single mutable game aggregate.

use super::action::{Clue, Turn};
use super::board::Board;
use super::types::Team;
use serde::{Deserialize, Serialize};
use strum::Display;

/// A supplied state that contradicts its own board or history.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum StateError {
    /// A team's score differs from its revealed cells.
    #[display("{} score {} does not match {} revealed {} cards", team, score, revealed, team)]
    ScoreMismatch {
        /// Team whose score is off.
        team: Team,
        /// Score carried by the state.
        score: u32,
        /// Cells of that team face up on the board.
        revealed: u32,
    },

    /// `gameOver` is set without a winner, or the reverse.
    #[display("gameOver and winner disagree")]
    OutcomeMismatch,

    /// The active clue was given by the other team.
    #[display("active clue does not belong to the current team")]
    ClueTeamMismatch,
}

impl std::error::Error for StateError {}

/// Where a game sits in the turn cycle.
///
/// Derived from [`GameState`]; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Phase {
    /// The current team needs a clue.
    AwaitingClue,
    /// A clue is active and guesses are being taken.
    AwaitingGuess,
    /// The turn is finished; the team switch has not happened yet.
    TurnEndPending,
    /// Terminal.
    GameOver,
}

/// Complete game state.
///
/// Serializes with the field names used by saved games and the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    #[serde(rename = "cards")]
    board: Board,
    current_team: Team,
    red_score: u32,
    blue_score: u32,
    #[serde(rename = "gameOver")]
    over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    winner: Option<Team>,
    #[serde(rename = "lastClue", default, skip_serializing_if = "Option::is_none")]
    active_clue: Option<Clue>,
    #[serde(default)]
    history: Vec<Turn>,
    #[serde(default)]
    turn_ended: bool,
}

impl GameState {
    /// Starts a game on `board` with red to play.
    pub fn new(board: Board) -> Self {
        Self {
            board,
            current_team: Team::Red,
            red_score: 0,
            blue_score: 0,
            over: false,
            winner: None,
            active_clue: None,
            history: Vec::new(),
            turn_ended: false,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Team to act.
    pub fn current_team(&self) -> Team {
        self.current_team
    }

    /// Score of `team`.
    pub fn score(&self, team: Team) -> u32 {
        match team {
            Team::Red => self.red_score,
            Team::Blue => self.blue_score,
        }
    }

    /// Whether the game has ended.
    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Winner, once the game is over.
    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    /// The clue the current team is guessing against.
    pub fn active_clue(&self) -> Option<&Clue> {
        self.active_clue.as_ref()
    }

    /// Every turn played so far, oldest first.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// The turn in progress, if a clue is active.
    pub fn current_turn(&self) -> Option<&Turn> {
        self.active_clue.as_ref().and(self.history.last())
    }

    /// Turns before the one in progress.
    pub fn completed_turns(&self) -> &[Turn] {
        match self.current_turn() {
            Some(_) => &self.history[..self.history.len() - 1],
            None => &self.history,
        }
    }

    /// Derives the turn-cycle phase.
    pub fn phase(&self) -> Phase {
        if self.over {
            Phase::GameOver
        } else if self.active_clue.is_none() {
            Phase::AwaitingClue
        } else if self.turn_ended {
            Phase::TurnEndPending
        } else {
            Phase::AwaitingGuess
        }
    }

    /// Checks that scores, winner and clue agree with the board.
    ///
    /// Used on states supplied from outside the orchestrator.
    pub fn check_consistency(&self) -> Result<(), StateError> {
        for team in [Team::Red, Team::Blue] {
            let revealed = self.board.revealed_count(team.affiliation()) as u32;
            let score = self.score(team);
            if revealed != score {
                return Err(StateError::ScoreMismatch {
                    team,
                    score,
                    revealed,
                });
            }
        }
        if self.over != self.winner.is_some() {
            return Err(StateError::OutcomeMismatch);
        }
        if self.active_clue.is_some() && self.history.last().map(|t| t.team) != Some(self.current_team) {
            return Err(StateError::ClueTeamMismatch);
        }
        Ok(())
    }

    pub(super) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub(super) fn add_point(&mut self, team: Team) -> u32 {
        let score = match team {
            Team::Red => &mut self.red_score,
            Team::Blue => &mut self.blue_score,
        };
        *score += 1;
        *score
    }

    pub(super) fn finish(&mut self, winner: Team) {
        self.over = true;
        self.winner = Some(winner);
    }

    pub(super) fn open_turn(&mut self, clue: Clue) {
        self.history.push(Turn::new(self.current_team, clue.clone()));
        self.active_clue = Some(clue);
        self.turn_ended = false;
    }

    pub(super) fn current_turn_mut(&mut self) -> Option<&mut Turn> {
        match self.active_clue {
            Some(_) => self.history.last_mut(),
            None => None,
        }
    }

    pub(super) fn end_turn(&mut self) {
        self.turn_ended = true;
    }

    pub(super) fn switch_team(&mut self) {
        self.active_clue = None;
        self.turn_ended = false;
        self.current_team = self.current_team.opponent();
    }

    /// Hands the turn to `team` without any other change.
    ///
    /// Replay uses this to follow a log whose team order differs from
    /// what the rules would produce.
    pub(crate) fn set_current_team(&mut self, team: Team) {
        self.current_team = team;
    }

    /// Overwrites the outcome with externally recorded values.
    pub(crate) fn overwrite_outcome(&mut self, winner: Team, red_score: u32, blue_score: u32) {
        self.over = true;
        self.winner = Some(winner);
        self.red_score = red_score;
        self.blue_score = blue_score;
        self.active_clue = None;
        self.turn_ended = false;
    }
}
