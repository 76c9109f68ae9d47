//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use strictly_codenames::{
    Board, Clue, GameState, GuessReply, ModelAdapter, ProviderError, ProviderFailure, Role,
    standard_affiliations,
};

/// Board with red `R0..R8`, blue `B0..B7`, neutral `N0..N6` and assassin `X`,
/// in that grid order.
pub fn fixed_board() -> Board {
    let mut words: Vec<String> = Vec::new();
    words.extend((0..9).map(|i| format!("R{i}")));
    words.extend((0..8).map(|i| format!("B{i}")));
    words.extend((0..7).map(|i| format!("N{i}")));
    words.push("X".to_string());
    Board::from_layout(words, standard_affiliations()).expect("fixed board is valid")
}

pub fn fixed_state() -> GameState {
    GameState::new(fixed_board())
}

pub fn word(w: &str) -> Result<GuessReply, ProviderFailure> {
    Ok(GuessReply::Word {
        word: w.to_string(),
        rationale: None,
    })
}

pub fn skip() -> Result<GuessReply, ProviderFailure> {
    Ok(GuessReply::Skip { rationale: None })
}

pub fn failure(role: Role) -> ProviderFailure {
    ProviderFailure {
        role,
        attempts: 3,
        last: ProviderError::Transport("connection refused".to_string()),
    }
}

/// Adapter that replays canned replies in order.
#[derive(Default)]
pub struct ScriptedAdapter {
    clues: Mutex<VecDeque<Result<Clue, ProviderFailure>>>,
    guesses: Mutex<VecDeque<Result<GuessReply, ProviderFailure>>>,
    clue_calls: AtomicU32,
    guess_calls: AtomicU32,
}

impl ScriptedAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clue(self, word: &str, number: u32) -> Self {
        self.push_clue(Ok(Clue::new(word, number)))
    }

    pub fn push_clue(self, reply: Result<Clue, ProviderFailure>) -> Self {
        self.clues.lock().expect("lock").push_back(reply);
        self
    }

    pub fn guess(self, reply: Result<GuessReply, ProviderFailure>) -> Self {
        self.guesses.lock().expect("lock").push_back(reply);
        self
    }

    pub fn guesses(self, words: &[&str]) -> Self {
        words.iter().fold(self, |adapter, w| adapter.guess(word(w)))
    }

    pub fn clue_calls(&self) -> u32 {
        self.clue_calls.load(Ordering::SeqCst)
    }

    pub fn guess_calls(&self) -> u32 {
        self.guess_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ModelAdapter for ScriptedAdapter {
    async fn request_clue(&self, _state: &GameState) -> Result<Clue, ProviderFailure> {
        self.clue_calls.fetch_add(1, Ordering::SeqCst);
        self.clues
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Err(failure(Role::ClueGiver)))
    }

    async fn request_guess(&self, _state: &GameState) -> Result<GuessReply, ProviderFailure> {
        self.guess_calls.fetch_add(1, Ordering::SeqCst);
        self.guesses
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Err(failure(Role::Guesser)))
    }
}

/// Adapter whose requests never complete.
#[derive(Default)]
pub struct StalledAdapter {
    pub started: tokio::sync::Notify,
}

#[async_trait::async_trait]
impl ModelAdapter for StalledAdapter {
    async fn request_clue(&self, _state: &GameState) -> Result<Clue, ProviderFailure> {
        self.started.notify_one();
        std::future::pending().await
    }

    async fn request_guess(&self, _state: &GameState) -> Result<GuessReply, ProviderFailure> {
        self.started.notify_one();
        std::future::pending().await
    }
}

/// Applies `events` in order through the transition function.
pub fn apply_all(state: GameState, events: Vec<strictly_codenames::Event>) -> GameState {
    events
        .into_iter()
        .fold(state, |state, event| strictly_codenames::transition(state, event).state)
}

pub fn guess_event(w: &str) -> strictly_codenames::Event {
    strictly_codenames::Event::Guess {
        word: w.to_string(),
        rationale: None,
    }
}

/// Red reveals R0 and R1 on "SEA 1", blue hits the assassin on "LAKE 1".
pub fn finished_state() -> GameState {
    use strictly_codenames::Event;
    apply_all(
        fixed_state(),
        vec![
            Event::ClueGiven(Clue::new("SEA", 1)),
            guess_event("R0"),
            guess_event("R1"),
            Event::SwitchTurn,
            Event::ClueGiven(Clue::new("LAKE", 1)),
            guess_event("X"),
        ],
    )
}
