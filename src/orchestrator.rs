//! Turn orchestration: drives a game by asking model adapters for clues
//! and guesses and feeding the replies through the transition function.

use crate::games::codenames::{Effect, Event, GameState, Phase, Team, transition};
use crate::provider::{GuessReply, ModelAdapter, ProviderFailure, Role};
use crate::recorder::{GameRecord, RecordSink, record};
use crate::shutdown::Shutdown;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Default number of guess requests allowed in one turn.
pub const DEFAULT_MAX_GUESS_REQUESTS: u32 = 100;

/// Progress messages for presentation.
///
/// States are snapshots taken between transitions.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// A provider request is in flight.
    Thinking {
        /// Team being asked.
        team: Team,
        /// Role being played.
        role: Role,
    },
    /// A transition was applied.
    Transitioned {
        /// What it did.
        effect: Effect,
        /// State after it.
        state: GameState,
    },
    /// A provider gave up; the game is halted.
    Halted(ProviderFailure),
    /// The game ended.
    GameOver {
        /// Winning team.
        winner: Team,
        /// Final state.
        state: GameState,
    },
}

/// Tunables for [`Orchestrator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Delay after each transition. Cosmetic only.
    pub pacing: Duration,
    /// Guess requests allowed per turn before it is closed.
    pub max_guess_requests: u32,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            pacing: Duration::ZERO,
            max_guess_requests: DEFAULT_MAX_GUESS_REQUESTS,
        }
    }
}

/// Result of a single [`Orchestrator::step`].
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// A transition was applied.
    Applied {
        /// What it did.
        effect: Effect,
        /// Set when this step ended the game.
        record: Option<GameRecord>,
    },
    /// The provider gave up; state unchanged.
    Failed(ProviderFailure),
    /// Cancelled before any mutation.
    Cancelled,
    /// The game was already over.
    AlreadyOver,
}

/// How [`Orchestrator::run`] stopped.
#[derive(Debug, Clone)]
pub enum RunStatus {
    /// The game ended. Carries the record if this run ended it.
    Finished(Option<GameRecord>),
    /// A provider gave up. The state is stable and can be resumed.
    Halted(ProviderFailure),
    /// The hosting session was torn down.
    Cancelled,
}

/// Result of [`Orchestrator::run`].
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// State when the run stopped.
    pub state: GameState,
    /// Why it stopped.
    pub status: RunStatus,
}

/// Drives one game at a time, one provider request at a time.
pub struct Orchestrator {
    red: Arc<dyn ModelAdapter>,
    blue: Arc<dyn ModelAdapter>,
    settings: OrchestratorSettings,
    sink: Option<Box<dyn RecordSink>>,
    events: Option<mpsc::UnboundedSender<GameEvent>>,
    guess_requests: u32,
}

impl Orchestrator {
    /// Creates an orchestrator where one adapter plays both teams.
    pub fn new(adapter: Arc<dyn ModelAdapter>) -> Self {
        Self::with_teams(Arc::clone(&adapter), adapter)
    }

    /// Creates an orchestrator with a separate adapter per team.
    pub fn with_teams(red: Arc<dyn ModelAdapter>, blue: Arc<dyn ModelAdapter>) -> Self {
        Self {
            red,
            blue,
            settings: OrchestratorSettings::default(),
            sink: None,
            events: None,
            guess_requests: 0,
        }
    }

    /// Replaces the settings.
    pub fn with_settings(mut self, settings: OrchestratorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sends finished games to `sink`.
    pub fn with_sink(mut self, sink: Box<dyn RecordSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Publishes progress on `events`.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<GameEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Current settings.
    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    fn adapter_for(&self, team: Team) -> Arc<dyn ModelAdapter> {
        match team {
            Team::Red => Arc::clone(&self.red),
            Team::Blue => Arc::clone(&self.blue),
        }
    }

    fn emit(&self, event: GameEvent) {
        if let Some(events) = &self.events
            && events.send(event).is_err()
        {
            debug!("Event receiver dropped");
        }
    }

    /// Performs one transition, making at most one provider request.
    ///
    /// On failure or cancellation the returned state equals the input.
    #[instrument(skip(self, state, shutdown), fields(team = %state.current_team(), phase = %state.phase()))]
    pub async fn step(&mut self, state: GameState, shutdown: &Shutdown) -> (GameState, StepOutcome) {
        let team = state.current_team();
        let event = match state.phase() {
            Phase::GameOver => return (state, StepOutcome::AlreadyOver),
            Phase::TurnEndPending => Event::SwitchTurn,
            Phase::AwaitingClue => {
                let adapter = self.adapter_for(team);
                self.emit(GameEvent::Thinking {
                    team,
                    role: Role::ClueGiver,
                });
                let reply = tokio::select! {
                    reply = adapter.request_clue(&state) => Some(reply),
                    _ = shutdown.cancelled() => None,
                };
                match reply {
                    None => {
                        info!("Clue request abandoned");
                        return (state, StepOutcome::Cancelled);
                    }
                    Some(Err(failure)) => return self.halt(state, failure),
                    Some(Ok(clue)) => Event::ClueGiven(clue),
                }
            }
            Phase::AwaitingGuess => {
                if self.guess_requests >= self.settings.max_guess_requests {
                    warn!(
                        requests = self.guess_requests,
                        "Guess request cap reached, closing turn"
                    );
                    Event::CloseTurn
                } else {
                    self.guess_requests += 1;
                    let adapter = self.adapter_for(team);
                    self.emit(GameEvent::Thinking {
                        team,
                        role: Role::Guesser,
                    });
                    let reply = tokio::select! {
                        reply = adapter.request_guess(&state) => Some(reply),
                        _ = shutdown.cancelled() => None,
                    };
                    match reply {
                        None => {
                            info!("Guess request abandoned");
                            return (state, StepOutcome::Cancelled);
                        }
                        Some(Err(failure)) => return self.halt(state, failure),
                        Some(Ok(GuessReply::Word { word, rationale })) => {
                            Event::Guess { word, rationale }
                        }
                        Some(Ok(GuessReply::Skip { rationale })) => Event::Skip { rationale },
                    }
                }
            }
        };

        let was_over = state.is_over();
        let next = transition(state, event);
        let state = next.state;
        let effect = next.effect;
        debug!(?effect, "Transition applied");

        if matches!(effect, Effect::ClueAccepted | Effect::TurnSwitched { .. }) {
            self.guess_requests = 0;
        }
        if let Effect::Discarded(reason) = &effect {
            debug!(%reason, "Event discarded");
        }

        self.emit(GameEvent::Transitioned {
            effect: effect.clone(),
            state: state.clone(),
        });

        let record = if state.is_over() && !was_over {
            self.finish(&state)
        } else {
            None
        };
        (state, StepOutcome::Applied { effect, record })
    }

    /// Steps until the game ends, a provider gives up, or `shutdown` fires.
    #[instrument(skip(self, state, shutdown))]
    pub async fn run(&mut self, mut state: GameState, shutdown: Shutdown) -> RunOutcome {
        info!("Starting game orchestration");
        loop {
            if shutdown.is_cancelled() {
                info!("Orchestration cancelled");
                return RunOutcome {
                    state,
                    status: RunStatus::Cancelled,
                };
            }

            let (next, outcome) = self.step(state, &shutdown).await;
            state = next;
            match outcome {
                StepOutcome::AlreadyOver => {
                    return RunOutcome {
                        state,
                        status: RunStatus::Finished(None),
                    };
                }
                StepOutcome::Applied {
                    record: Some(record),
                    ..
                } => {
                    return RunOutcome {
                        state,
                        status: RunStatus::Finished(Some(record)),
                    };
                }
                StepOutcome::Applied { record: None, .. } => {}
                StepOutcome::Failed(failure) => {
                    return RunOutcome {
                        state,
                        status: RunStatus::Halted(failure),
                    };
                }
                StepOutcome::Cancelled => {
                    return RunOutcome {
                        state,
                        status: RunStatus::Cancelled,
                    };
                }
            }

            if state.is_over() {
                return RunOutcome {
                    state,
                    status: RunStatus::Finished(None),
                };
            }

            if !self.settings.pacing.is_zero() {
                let cancelled = tokio::select! {
                    _ = tokio::time::sleep(self.settings.pacing) => false,
                    _ = shutdown.cancelled() => true,
                };
                if cancelled {
                    info!("Orchestration cancelled during pacing");
                    return RunOutcome {
                        state,
                        status: RunStatus::Cancelled,
                    };
                }
            }
        }
    }

    fn halt(&self, state: GameState, failure: ProviderFailure) -> (GameState, StepOutcome) {
        error!(error = %failure, "Provider failure, halting turn loop");
        self.emit(GameEvent::Halted(failure.clone()));
        (state, StepOutcome::Failed(failure))
    }

    fn finish(&self, state: &GameState) -> Option<GameRecord> {
        let Some(winner) = state.winner() else {
            return None;
        };
        info!(%winner, red = state.score(Team::Red), blue = state.score(Team::Blue), "Game over");
        self.emit(GameEvent::GameOver {
            winner,
            state: state.clone(),
        });

        let record = match record(state) {
            Ok(record) => record,
            Err(e) => {
                error!(error = %e, "Failed to record game");
                return None;
            }
        };
        if let Some(sink) = &self.sink
            && let Err(e) = sink.store(&record)
        {
            error!(error = %e, "Failed to store game record");
        }
        Some(record)
    }
}
