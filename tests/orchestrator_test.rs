//! Turn loop tests driven by scripted adapters.

mod support;

use std::sync::Arc;

use strictly_codenames::{
    Consequence, Discard, Effect, GameEvent, MemorySink, Orchestrator, OrchestratorSettings,
    Phase, Role, RunStatus, Shutdown, ShutdownHandle, StepOutcome, Team,
};
use support::{ScriptedAdapter, StalledAdapter, failure, fixed_state, skip, word};
use tokio::sync::mpsc;

fn effect_of(outcome: StepOutcome) -> Effect {
    match outcome {
        StepOutcome::Applied { effect, .. } => effect,
        other => panic!("expected an applied step, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wrong_team_reveal_ends_turn_early() {
    let adapter = ScriptedAdapter::new().clue("OCEAN", 2).guesses(&["R0", "B0"]);
    let mut orchestrator = Orchestrator::new(Arc::new(adapter));
    let shutdown = Shutdown::never();

    let (state, outcome) = orchestrator.step(fixed_state(), &shutdown).await;
    assert_eq!(effect_of(outcome), Effect::ClueAccepted);
    assert_eq!(state.phase(), Phase::AwaitingGuess);
    assert_eq!(state.current_turn().map(|t| t.remaining_budget()), Some(3));

    let (state, outcome) = orchestrator.step(state, &shutdown).await;
    assert!(matches!(
        effect_of(outcome),
        Effect::Revealed {
            correct: true,
            consequence: Consequence::Continue,
            ..
        }
    ));

    let (state, outcome) = orchestrator.step(state, &shutdown).await;
    assert!(matches!(
        effect_of(outcome),
        Effect::Revealed {
            correct: false,
            consequence: Consequence::TurnOver,
            ..
        }
    ));
    assert_eq!(state.phase(), Phase::TurnEndPending);
    assert_eq!(state.current_team(), Team::Red);

    let (state, outcome) = orchestrator.step(state, &shutdown).await;
    assert_eq!(effect_of(outcome), Effect::TurnSwitched { to: Team::Blue });
    assert_eq!(state.current_team(), Team::Blue);
    assert_eq!(state.phase(), Phase::AwaitingClue);
    assert_eq!(state.score(Team::Red), 1);
    assert_eq!(state.score(Team::Blue), 1);
    assert_eq!(state.history().len(), 1);
    assert_eq!(state.history()[0].guesses.len(), 2);
}

#[tokio::test]
async fn test_assassin_beats_near_win() {
    let adapter = ScriptedAdapter::new()
        .clue("ALL", 0)
        .guesses(&["R0", "R1", "R2", "R3", "R4", "R5", "R6", "R7", "X"]);
    let mut orchestrator = Orchestrator::new(Arc::new(adapter));

    let outcome = orchestrator.run(fixed_state(), Shutdown::never()).await;
    let RunStatus::Finished(Some(record)) = outcome.status else {
        panic!("game should finish with a record");
    };
    assert_eq!(record.winner, Team::Blue);
    assert_eq!(record.final_score.red, 8);
    assert_eq!(outcome.state.winner(), Some(Team::Blue));
    assert_eq!(outcome.state.phase(), Phase::GameOver);
}

#[tokio::test]
async fn test_win_takes_precedence_over_budget_exhaustion() {
    let adapter = ScriptedAdapter::new()
        .clue("ALL", 8)
        .guesses(&["R0", "R1", "R2", "R3", "R4", "R5", "R6", "R7", "R8"]);
    let mut orchestrator = Orchestrator::new(Arc::new(adapter));
    let shutdown = Shutdown::never();

    let mut state = fixed_state();
    let mut last = None;
    for _ in 0..10 {
        let (next, outcome) = orchestrator.step(state, &shutdown).await;
        state = next;
        last = Some(effect_of(outcome));
    }
    assert!(matches!(
        last,
        Some(Effect::Revealed {
            consequence: Consequence::Win(Team::Red),
            ..
        })
    ));
    assert_eq!(state.winner(), Some(Team::Red));
    assert_eq!(state.score(Team::Red), 9);
}

#[tokio::test]
async fn test_skip_only_after_a_guess() {
    let adapter = ScriptedAdapter::new()
        .clue("ANY", 0)
        .guess(skip())
        .guess(word("R0"))
        .guess(skip());
    let mut orchestrator = Orchestrator::new(Arc::new(adapter));
    let shutdown = Shutdown::never();

    let (state, _) = orchestrator.step(fixed_state(), &shutdown).await;

    let (state, outcome) = orchestrator.step(state, &shutdown).await;
    assert_eq!(
        effect_of(outcome),
        Effect::Discarded(Discard::IllegalSkip)
    );
    assert_eq!(state.phase(), Phase::AwaitingGuess);

    let (state, _) = orchestrator.step(state, &shutdown).await;
    let (state, outcome) = orchestrator.step(state, &shutdown).await;
    assert_eq!(effect_of(outcome), Effect::Skipped);
    assert_eq!(state.phase(), Phase::TurnEndPending);

    let (state, _) = orchestrator.step(state, &shutdown).await;
    assert_eq!(state.current_team(), Team::Blue);
}

#[tokio::test]
async fn test_unresolved_guesses_do_not_consume_budget() {
    let adapter = ScriptedAdapter::new()
        .clue("SEA", 1)
        .guesses(&["NOPE", "R0", "r0", "R1"]);
    let mut orchestrator = Orchestrator::new(Arc::new(adapter));
    let shutdown = Shutdown::never();

    let mut state = fixed_state();
    let mut effects = Vec::new();
    for _ in 0..5 {
        let (next, outcome) = orchestrator.step(state, &shutdown).await;
        state = next;
        effects.push(effect_of(outcome));
    }

    assert!(matches!(
        &effects[1],
        Effect::Discarded(Discard::UnresolvedGuessWord(w)) if w == "NOPE"
    ));
    assert!(matches!(
        &effects[3],
        Effect::Discarded(Discard::UnresolvedGuessWord(_))
    ));
    assert!(matches!(
        &effects[4],
        Effect::Revealed {
            consequence: Consequence::TurnOver,
            ..
        }
    ));
    assert_eq!(state.score(Team::Red), 2);
    assert_eq!(state.history()[0].counted_guesses(), 2);
}

#[tokio::test]
async fn test_clue_failure_halts_without_advancing() {
    let adapter = ScriptedAdapter::new().push_clue(Err(failure(Role::ClueGiver)));
    let mut orchestrator = Orchestrator::new(Arc::new(adapter));

    let initial = fixed_state();
    let outcome = orchestrator.run(initial.clone(), Shutdown::never()).await;
    let RunStatus::Halted(failure) = outcome.status else {
        panic!("run should halt");
    };
    assert_eq!(failure.role, Role::ClueGiver);
    assert_eq!(outcome.state, initial);
}

#[tokio::test]
async fn test_guess_failure_keeps_turn_open() {
    let adapter = ScriptedAdapter::new()
        .clue("SEA", 1)
        .guess(Err(failure(Role::Guesser)));
    let mut orchestrator = Orchestrator::new(Arc::new(adapter));

    let outcome = orchestrator.run(fixed_state(), Shutdown::never()).await;
    assert!(matches!(outcome.status, RunStatus::Halted(_)));
    assert_eq!(outcome.state.phase(), Phase::AwaitingGuess);
    assert_eq!(outcome.state.current_team(), Team::Red);
    assert!(!outcome.state.is_over());
    assert_eq!(outcome.state.history().len(), 1);
}

#[tokio::test]
async fn test_request_cap_closes_turn() {
    let adapter = Arc::new(ScriptedAdapter::new().clue("SEA", 0).guesses(&["NOPE", "NADA"]));
    let mut orchestrator = Orchestrator::new(adapter.clone()).with_settings(OrchestratorSettings {
        max_guess_requests: 2,
        ..OrchestratorSettings::default()
    });
    let shutdown = Shutdown::never();

    let mut state = fixed_state();
    for _ in 0..3 {
        state = orchestrator.step(state, &shutdown).await.0;
    }
    let (state, outcome) = orchestrator.step(state, &shutdown).await;
    assert_eq!(effect_of(outcome), Effect::TurnClosed);
    assert_eq!(adapter.guess_calls(), 2);

    let (state, _) = orchestrator.step(state, &shutdown).await;
    assert_eq!(state.current_team(), Team::Blue);
}

#[tokio::test]
async fn test_cancellation_abandons_request() {
    let adapter = Arc::new(StalledAdapter::default());
    let mut orchestrator = Orchestrator::new(adapter.clone());
    let (handle, shutdown) = ShutdownHandle::new();

    let initial = fixed_state();
    let (outcome, _) = tokio::join!(orchestrator.run(initial.clone(), shutdown), async {
        adapter.started.notified().await;
        handle.cancel();
    });

    assert!(matches!(outcome.status, RunStatus::Cancelled));
    assert_eq!(outcome.state, initial);
}

#[tokio::test]
async fn test_game_recorded_once_and_events_published() {
    let sink = MemorySink::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let adapter = ScriptedAdapter::new().clue("SEA", 1).guesses(&["X"]);
    let mut orchestrator = Orchestrator::new(Arc::new(adapter))
        .with_sink(Box::new(sink.clone()))
        .with_events(tx);

    let outcome = orchestrator.run(fixed_state(), Shutdown::never()).await;
    assert!(matches!(outcome.status, RunStatus::Finished(Some(_))));

    let (state, again) = orchestrator.step(outcome.state, &Shutdown::never()).await;
    assert!(matches!(again, StepOutcome::AlreadyOver));
    assert!(state.is_over());
    drop(orchestrator);

    let mut game_overs = 0;
    let mut transitions = 0;
    while let Some(event) = rx.recv().await {
        match event {
            GameEvent::GameOver { winner, .. } => {
                assert_eq!(winner, Team::Blue);
                game_overs += 1;
            }
            GameEvent::Transitioned { .. } => transitions += 1,
            _ => {}
        }
    }
    assert_eq!(game_overs, 1);
    assert_eq!(transitions, 2);
    assert_eq!(sink.records().len(), 1);
}

#[tokio::test]
async fn test_each_team_uses_its_own_adapter() {
    let red = Arc::new(ScriptedAdapter::new().clue("SEA", 1).guesses(&["N0"]));
    let blue = Arc::new(ScriptedAdapter::new().clue("LAKE", 1).guesses(&["X"]));
    let mut orchestrator = Orchestrator::with_teams(red.clone(), blue.clone());

    let outcome = orchestrator.run(fixed_state(), Shutdown::never()).await;
    assert_eq!(outcome.state.winner(), Some(Team::Red));
    assert_eq!(red.clue_calls(), 1);
    assert_eq!(blue.clue_calls(), 1);
    assert_eq!(outcome.state.history()[1].team, Team::Blue);
}
