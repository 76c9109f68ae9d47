//! The transition function: `(state, event) -> state`.
//!
//! Every rule-governed mutation of a [`GameState`] goes through
//! [`transition`]. Live play and replay feed it the same events, so
//! both follow one rule set.

use super::super::{Affiliation, Clue, GameState, Guess, Phase, Reveal, Team};
use super::scoring::{Consequence, score_reveal};
use tracing::{debug, instrument};

/// Something that happened at the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The current team's clue giver produced a clue.
    ClueGiven(Clue),
    /// The guesser named a word.
    Guess {
        /// The word as returned by the guesser.
        word: String,
        /// The guesser's explanation.
        rationale: Option<String>,
    },
    /// The guesser passed.
    Skip {
        /// The guesser's explanation.
        rationale: Option<String>,
    },
    /// Ends the turn regardless of remaining budget.
    CloseTurn,
    /// Hands play to the other team.
    SwitchTurn,
}

/// Why an event was dropped without changing the state.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum Discard {
    /// Skip before any guess this turn.
    #[display("skip before any guess")]
    IllegalSkip,
    /// The word matches no unrevealed cell.
    #[display("'{}' does not match an unrevealed word", _0)]
    UnresolvedGuessWord(String),
    /// The event does not apply in this phase.
    #[display("not applicable while {}", _0)]
    OutOfPhase(Phase),
}

/// What a transition did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// A turn was opened with the clue.
    ClueAccepted,
    /// A cell was revealed.
    Revealed {
        /// Board index of the cell.
        index: usize,
        /// Its affiliation.
        affiliation: Affiliation,
        /// Whether it belonged to the guessing team.
        correct: bool,
        /// What the reveal means for the turn.
        consequence: Consequence,
    },
    /// The guesser passed and the turn ended.
    Skipped,
    /// The turn was closed early.
    TurnClosed,
    /// Play passed to `to`.
    TurnSwitched {
        /// The team now acting.
        to: Team,
    },
    /// The event was dropped; state unchanged.
    Discarded(Discard),
    /// The game is over; nothing may change.
    Ignored,
}

/// Result of [`transition`].
#[derive(Debug, Clone)]
pub struct Transition {
    /// State after the event.
    pub state: GameState,
    /// What happened.
    pub effect: Effect,
}

impl Transition {
    fn new(state: GameState, effect: Effect) -> Self {
        Self { state, effect }
    }
}

/// Applies `event` to `state`.
///
/// Events that do not apply are reported through [`Effect::Discarded`]
/// or [`Effect::Ignored`] and leave the state untouched.
#[instrument(skip(state), fields(team = %state.current_team(), phase = %state.phase()))]
pub fn transition(mut state: GameState, event: Event) -> Transition {
    let phase = state.phase();
    if phase == Phase::GameOver {
        debug!("Game over, event ignored");
        return Transition::new(state, Effect::Ignored);
    }

    match (phase, event) {
        (Phase::AwaitingClue, Event::ClueGiven(clue)) => {
            debug!(clue = %clue, "Clue accepted");
            state.open_turn(clue);
            Transition::new(state, Effect::ClueAccepted)
        }

        (Phase::AwaitingGuess, Event::Guess { word, rationale }) => {
            apply_guess(state, word, rationale)
        }

        (Phase::AwaitingGuess, Event::Skip { rationale }) => {
            let guessed = state
                .current_turn()
                .map(|turn| turn.counted_guesses())
                .unwrap_or(0);
            if guessed == 0 {
                debug!("Skip before first guess discarded");
                return Transition::new(state, Effect::Discarded(Discard::IllegalSkip));
            }
            if let Some(turn) = state.current_turn_mut() {
                turn.guesses.push(Guess::skip(rationale));
            }
            state.end_turn();
            Transition::new(state, Effect::Skipped)
        }

        (Phase::AwaitingGuess, Event::CloseTurn) => {
            state.end_turn();
            Transition::new(state, Effect::TurnClosed)
        }

        (Phase::TurnEndPending, Event::SwitchTurn) => {
            state.switch_team();
            let to = state.current_team();
            debug!(%to, "Turn switched");
            Transition::new(state, Effect::TurnSwitched { to })
        }

        (phase, _) => Transition::new(state, Effect::Discarded(Discard::OutOfPhase(phase))),
    }
}

fn apply_guess(mut state: GameState, word: String, rationale: Option<String>) -> Transition {
    let Some(index) = state.board().find_unrevealed_index(&word) else {
        debug!(word = %word, "Guess does not resolve");
        return Transition::new(
            state,
            Effect::Discarded(Discard::UnresolvedGuessWord(word)),
        );
    };

    let affiliation = match state.board_mut().reveal(index) {
        Reveal::Revealed(affiliation) => affiliation,
        Reveal::AlreadyRevealed | Reveal::OutOfRange => {
            return Transition::new(
                state,
                Effect::Discarded(Discard::UnresolvedGuessWord(word)),
            );
        }
    };

    let guessing = state.current_team();
    let correct = affiliation.team() == Some(guessing);
    let label = state
        .board()
        .get(index)
        .map(|cell| cell.label().to_string())
        .unwrap_or(word);
    if let Some(turn) = state.current_turn_mut() {
        turn.guesses.push(Guess::resolved(label, correct, rationale));
    }

    let mut consequence = score_reveal(&mut state, guessing, affiliation);
    if consequence == Consequence::Continue
        && state.current_turn().map(|t| t.remaining_budget()) == Some(0)
    {
        debug!("Guess budget exhausted");
        consequence = Consequence::TurnOver;
    }
    if consequence == Consequence::TurnOver {
        state.end_turn();
    }

    Transition::new(
        state,
        Effect::Revealed {
            index,
            affiliation,
            correct,
            consequence,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::codenames::Board;

    /// Red: R0..R8, Blue: B0..B7, Neutral: N0..N6, Assassin: X.
    fn fixed_state() -> GameState {
        let mut words = Vec::new();
        let mut affiliations = Vec::new();
        for i in 0..9 {
            words.push(format!("R{i}"));
            affiliations.push(Affiliation::Red);
        }
        for i in 0..8 {
            words.push(format!("B{i}"));
            affiliations.push(Affiliation::Blue);
        }
        for i in 0..7 {
            words.push(format!("N{i}"));
            affiliations.push(Affiliation::Neutral);
        }
        words.push("X".to_string());
        affiliations.push(Affiliation::Assassin);
        GameState::new(Board::from_layout(words, affiliations).expect("valid layout"))
    }

    fn guess(word: &str) -> Event {
        Event::Guess {
            word: word.to_string(),
            rationale: None,
        }
    }

    fn step(state: GameState, event: Event) -> (GameState, Effect) {
        let t = transition(state, event);
        (t.state, t.effect)
    }

    #[test]
    fn test_guess_before_clue_is_out_of_phase() {
        let (state, effect) = step(fixed_state(), guess("R0"));
        assert_eq!(
            effect,
            Effect::Discarded(Discard::OutOfPhase(Phase::AwaitingClue))
        );
        assert!(!state.board().cells()[0].is_revealed());
    }

    #[test]
    fn test_correct_guess_keeps_turn() {
        let (state, _) = step(fixed_state(), Event::ClueGiven(Clue::new("HINT", 2)));
        let (state, effect) = step(state, guess("r0"));
        assert!(matches!(
            effect,
            Effect::Revealed {
                correct: true,
                consequence: Consequence::Continue,
                ..
            }
        ));
        assert_eq!(state.phase(), Phase::AwaitingGuess);
        assert_eq!(state.score(Team::Red), 1);
        assert_eq!(state.history()[0].guesses[0].word, "R0");
    }

    #[test]
    fn test_budget_exhaustion_ends_turn() {
        let (mut state, _) = step(fixed_state(), Event::ClueGiven(Clue::new("HINT", 1)));
        for word in ["R0", "R1"] {
            state = step(state, guess(word)).0;
        }
        assert_eq!(state.phase(), Phase::TurnEndPending);
        assert_eq!(state.current_team(), Team::Red);
        let (state, effect) = step(state, Event::SwitchTurn);
        assert_eq!(effect, Effect::TurnSwitched { to: Team::Blue });
        assert_eq!(state.phase(), Phase::AwaitingClue);
        assert!(state.active_clue().is_none());
    }

    #[test]
    fn test_neutral_ends_turn_without_score() {
        let (state, _) = step(fixed_state(), Event::ClueGiven(Clue::new("HINT", 3)));
        let (state, _) = step(state, guess("N0"));
        assert_eq!(state.phase(), Phase::TurnEndPending);
        assert_eq!(state.score(Team::Red), 0);
        assert_eq!(state.score(Team::Blue), 0);
    }

    #[test]
    fn test_unresolved_and_repeat_guesses_discarded() {
        let (state, _) = step(fixed_state(), Event::ClueGiven(Clue::new("HINT", 3)));
        let (state, effect) = step(state, guess("NOPE"));
        assert!(matches!(
            effect,
            Effect::Discarded(Discard::UnresolvedGuessWord(_))
        ));
        let (state, _) = step(state, guess("R0"));
        let (state, effect) = step(state, guess("R0"));
        assert!(matches!(
            effect,
            Effect::Discarded(Discard::UnresolvedGuessWord(_))
        ));
        assert_eq!(state.score(Team::Red), 1);
        assert_eq!(state.current_turn().map(|t| t.guesses.len()), Some(1));
    }

    #[test]
    fn test_skip_needs_prior_guess() {
        let (state, _) = step(fixed_state(), Event::ClueGiven(Clue::new("HINT", 0)));
        let (state, effect) = step(state, Event::Skip { rationale: None });
        assert_eq!(effect, Effect::Discarded(Discard::IllegalSkip));
        assert_eq!(state.phase(), Phase::AwaitingGuess);

        let (state, _) = step(state, guess("R0"));
        let (state, effect) = step(state, Event::Skip { rationale: None });
        assert_eq!(effect, Effect::Skipped);
        assert_eq!(state.phase(), Phase::TurnEndPending);
        assert!(state.history()[0].guesses[1].is_skip());
    }

    #[test]
    fn test_win_beats_budget_exhaustion() {
        let (mut state, _) = step(fixed_state(), Event::ClueGiven(Clue::new("HINT", 8)));
        for i in 0..9 {
            state = step(state, guess(&format!("R{i}"))).0;
        }
        assert!(state.is_over());
        assert_eq!(state.winner(), Some(Team::Red));
        assert_eq!(state.phase(), Phase::GameOver);
    }

    #[test]
    fn test_revealing_opponents_last_word_wins_for_opponent() {
        let (mut state, _) = step(fixed_state(), Event::ClueGiven(Clue::new("HINT", 0)));
        // Red keeps hitting blue words; blue burns its turns on neutrals.
        for i in 0..8 {
            if state.phase() == Phase::TurnEndPending {
                state = step(state, Event::SwitchTurn).0;
                state = step(state, Event::ClueGiven(Clue::new("HINT", 0))).0;
                state = step(state, guess(&format!("N{}", i % 7))).0;
                state = step(state, Event::SwitchTurn).0;
                state = step(state, Event::ClueGiven(Clue::new("HINT", 0))).0;
            }
            state = step(state, guess(&format!("B{i}"))).0;
        }
        assert_eq!(state.winner(), Some(Team::Blue));
    }

    #[test]
    fn test_assassin_wins_for_opponent() {
        let (state, _) = step(fixed_state(), Event::ClueGiven(Clue::new("HINT", 2)));
        let (state, effect) = step(state, guess("X"));
        assert!(matches!(
            effect,
            Effect::Revealed {
                consequence: Consequence::Win(Team::Blue),
                ..
            }
        ));
        let (state, effect) = step(state, Event::SwitchTurn);
        assert_eq!(effect, Effect::Ignored);
        assert_eq!(state.current_team(), Team::Red);
    }

    #[test]
    fn test_close_turn_forces_turn_end() {
        let (state, _) = step(fixed_state(), Event::ClueGiven(Clue::new("HINT", 0)));
        let (state, effect) = step(state, Event::CloseTurn);
        assert_eq!(effect, Effect::TurnClosed);
        assert_eq!(state.phase(), Phase::TurnEndPending);
    }
}
