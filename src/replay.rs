//! Replay driver: rebuilds a recorded game through the same transition
//! function used in live play, without calling any model.

use crate::games::codenames::{
    Affiliation, Board, BoardError, Clue, Discard, Effect, Event, GameState, Guess, Phase,
    SKIP_WORD, Team, transition,
};
use crate::recorder::{FinalScore, GameRecord};
use crate::shutdown::Shutdown;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// The UI-relevant moment a snapshot was taken at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotEvent {
    /// A clue was shown.
    ClueShown {
        /// Team giving the clue.
        team: Team,
        /// The clue.
        clue: Clue,
    },
    /// A guess was applied.
    GuessRevealed {
        /// Word guessed, or `SKIP`.
        word: String,
        /// Affiliation of the revealed cell; `None` for a skip.
        affiliation: Option<Affiliation>,
        /// Whether it belonged to the guessing team.
        correct: bool,
    },
    /// Play passed to the other team.
    TurnSwitched {
        /// Team now acting.
        to: Team,
    },
    /// The game ended.
    GameEnded {
        /// Recorded winner.
        winner: Team,
        /// Recorded scores.
        final_score: FinalScore,
    },
}

/// State materialized after one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// What happened.
    pub event: SnapshotEvent,
    /// State right after it.
    pub state: GameState,
}

/// A difference between a log and what its replay produces.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ReplayDivergence {
    /// The log gives a turn to the team that was not due.
    #[display("turn {}: recorded team {} but {} was due", turn, recorded, expected)]
    TurnTeamMismatch {
        /// Turn index.
        turn: usize,
        /// Team the rules expected.
        expected: Team,
        /// Team in the log.
        recorded: Team,
    },
    /// A guessed word matches no unrevealed cell.
    #[display("turn {}: guess '{}' does not resolve", turn, word)]
    UnresolvedGuess {
        /// Turn index.
        turn: usize,
        /// The word.
        word: String,
    },
    /// `wasCorrect` disagrees with the cell's affiliation.
    #[display("turn {}: guess '{}' recorded as correct={} but replays as {}", turn, word, recorded, replayed)]
    CorrectnessMismatch {
        /// Turn index.
        turn: usize,
        /// The word.
        word: String,
        /// Value in the log.
        recorded: bool,
        /// Value from the rules.
        replayed: bool,
    },
    /// Guesses continue after the rules ended the turn.
    #[display("turn {}: {} guess(es) after the turn ended", turn, count)]
    GuessAfterTurnEnded {
        /// Turn index.
        turn: usize,
        /// Guesses ignored.
        count: usize,
    },
    /// Turns continue after the game ended.
    #[display("turn {}: played after the game ended", turn)]
    TurnAfterGameOver {
        /// Turn index.
        turn: usize,
    },
    /// Recorded winner differs from the replayed one.
    #[display("recorded winner {} but replay gives {:?}", recorded, replayed)]
    WinnerMismatch {
        /// Winner in the log.
        recorded: Team,
        /// Winner from the rules.
        replayed: Option<Team>,
    },
    /// Recorded score differs from the replayed one.
    #[display("recorded {} score {} but replay gives {}", team, recorded, replayed)]
    ScoreMismatch {
        /// Team concerned.
        team: Team,
        /// Score in the log.
        recorded: u32,
        /// Score from the rules.
        replayed: u32,
    },
}

/// A log that cannot be replayed at all.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ReplayError {
    /// The initial layout is not a valid board.
    #[display("invalid initial layout: {}", _0)]
    InvalidLayout(BoardError),
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReplayError::InvalidLayout(e) => Some(e),
        }
    }
}

impl From<BoardError> for ReplayError {
    fn from(err: BoardError) -> Self {
        ReplayError::InvalidLayout(err)
    }
}

/// A replayed game ready for playback.
#[derive(Debug, Clone)]
pub struct Replay {
    snapshots: Vec<Snapshot>,
    divergences: Vec<ReplayDivergence>,
}

impl Replay {
    /// Snapshots in playback order.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Differences found between the log and the rules.
    pub fn divergences(&self) -> &[ReplayDivergence] {
        &self.divergences
    }

    /// Whether the log replayed without any divergence.
    pub fn is_faithful(&self) -> bool {
        self.divergences.is_empty()
    }

    /// State shown at the end of playback.
    pub fn final_state(&self) -> Option<&GameState> {
        self.snapshots.last().map(|s| &s.state)
    }

    /// Sends snapshots one by one, `interval` apart.
    ///
    /// Returns how many were delivered before the receiver went away or
    /// `shutdown` fired.
    #[instrument(skip(self, sender, shutdown), fields(snapshots = self.snapshots.len()))]
    pub async fn play(
        &self,
        interval: Duration,
        sender: &mpsc::UnboundedSender<Snapshot>,
        shutdown: &Shutdown,
    ) -> usize {
        let mut delivered = 0;
        for (i, snapshot) in self.snapshots.iter().enumerate() {
            if shutdown.is_cancelled() || sender.send(snapshot.clone()).is_err() {
                break;
            }
            delivered += 1;
            if i + 1 == self.snapshots.len() {
                break;
            }
            let cancelled = tokio::select! {
                _ = tokio::time::sleep(interval) => false,
                _ = shutdown.cancelled() => true,
            };
            if cancelled {
                break;
            }
        }
        info!(delivered, "Playback stopped");
        delivered
    }
}

struct Replayer {
    state: GameState,
    snapshots: Vec<Snapshot>,
    divergences: Vec<ReplayDivergence>,
}

impl Replayer {
    fn flag(&mut self, divergence: ReplayDivergence) {
        warn!(%divergence, "Replay diverges from log");
        self.divergences.push(divergence);
    }

    fn apply(&mut self, event: Event) -> Effect {
        let next = transition(self.state.clone(), event);
        self.state = next.state;
        next.effect
    }

    fn snapshot(&mut self, event: SnapshotEvent) {
        self.snapshots.push(Snapshot {
            event,
            state: self.state.clone(),
        });
    }
}

/// Whether a logged guess was a pass.
///
/// Logs without the skip flag mark a pass with the `SKIP` word; that
/// reading applies only when no board cell carries the word.
fn is_recorded_skip(guess: &Guess, board: &Board) -> bool {
    guess.is_skip()
        || (guess.word.eq_ignore_ascii_case(SKIP_WORD)
            && !guess.was_correct
            && board.find_index(&guess.word).is_none())
}

/// Replays `log` against its own initial layout.
///
/// Divergences are collected as warnings; the final snapshot always
/// shows the recorded outcome.
#[instrument(skip(log), fields(turns = log.history.len()))]
pub fn replay(log: &GameRecord) -> Result<Replay, ReplayError> {
    let board = Board::from_layout(
        log.initial_options.words.clone(),
        log.initial_options.card_types.clone(),
    )?;
    let mut r = Replayer {
        state: GameState::new(board),
        snapshots: Vec::new(),
        divergences: Vec::new(),
    };

    for (index, turn) in log.history.iter().enumerate() {
        if r.state.is_over() {
            r.flag(ReplayDivergence::TurnAfterGameOver { turn: index });
            continue;
        }
        if r.state.current_team() != turn.team {
            r.flag(ReplayDivergence::TurnTeamMismatch {
                turn: index,
                expected: r.state.current_team(),
                recorded: turn.team,
            });
            r.state.set_current_team(turn.team);
        }

        r.apply(Event::ClueGiven(turn.clue.clone()));
        r.snapshot(SnapshotEvent::ClueShown {
            team: turn.team,
            clue: turn.clue.clone(),
        });

        for (g, guess) in turn.guesses.iter().enumerate() {
            if r.state.phase() != Phase::AwaitingGuess {
                r.flag(ReplayDivergence::GuessAfterTurnEnded {
                    turn: index,
                    count: turn.guesses.len() - g,
                });
                break;
            }

            if is_recorded_skip(guess, r.state.board()) {
                let effect = r.apply(Event::Skip {
                    rationale: guess.rationale.clone(),
                });
                if effect == Effect::Skipped {
                    r.snapshot(SnapshotEvent::GuessRevealed {
                        word: guess.word.clone(),
                        affiliation: None,
                        correct: false,
                    });
                } else {
                    debug!(?effect, "Recorded skip not applied");
                }
                continue;
            }

            match r.apply(Event::Guess {
                word: guess.word.clone(),
                rationale: guess.rationale.clone(),
            }) {
                Effect::Revealed {
                    affiliation,
                    correct,
                    ..
                } => {
                    if correct != guess.was_correct {
                        r.flag(ReplayDivergence::CorrectnessMismatch {
                            turn: index,
                            word: guess.word.clone(),
                            recorded: guess.was_correct,
                            replayed: correct,
                        });
                    }
                    r.snapshot(SnapshotEvent::GuessRevealed {
                        word: guess.word.clone(),
                        affiliation: Some(affiliation),
                        correct,
                    });
                }
                Effect::Discarded(Discard::UnresolvedGuessWord(word)) => {
                    r.flag(ReplayDivergence::UnresolvedGuess { turn: index, word });
                }
                effect => debug!(?effect, "Recorded guess not applied"),
            }
        }

        if r.state.is_over() {
            continue;
        }
        if r.state.phase() == Phase::AwaitingGuess {
            r.apply(Event::CloseTurn);
        }
        if let Effect::TurnSwitched { to } = r.apply(Event::SwitchTurn) {
            r.snapshot(SnapshotEvent::TurnSwitched { to });
        }
    }

    check_outcome(&mut r, log);
    r.snapshot(SnapshotEvent::GameEnded {
        winner: log.winner,
        final_score: log.final_score,
    });

    info!(
        snapshots = r.snapshots.len(),
        divergences = r.divergences.len(),
        "Replay complete"
    );
    Ok(Replay {
        snapshots: r.snapshots,
        divergences: r.divergences,
    })
}

fn check_outcome(r: &mut Replayer, log: &GameRecord) {
    let mut diverged = false;
    if r.state.winner() != Some(log.winner) {
        r.flag(ReplayDivergence::WinnerMismatch {
            recorded: log.winner,
            replayed: r.state.winner(),
        });
        diverged = true;
    }
    for team in [Team::Red, Team::Blue] {
        let replayed = r.state.score(team);
        let recorded = log.final_score.of(team);
        if replayed != recorded {
            r.flag(ReplayDivergence::ScoreMismatch {
                team,
                recorded,
                replayed,
            });
            diverged = true;
        }
    }
    if diverged || !r.state.is_over() {
        r.state
            .overwrite_outcome(log.winner, log.final_score.red, log.final_score.blue);
    }
}
