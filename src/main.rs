//! Strictly Codenames - Unified CLI
//!
//! Plays, serves and replays LLM-driven Codenames games.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use cli::{Cli, Command};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use strictly_codenames::{
    AgentConfig, AgentLibrary, ApiState, Effect, GameConfig, GameEvent, GameRecord,
    GameState, JsonFileSink, LlmProvider, ModelAdapter, Orchestrator, Phase, RetryPolicy,
    RunStatus, ShutdownHandle, Snapshot, SnapshotEvent, TurnRequest, replay,
};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let agents_dir = cli.agents_dir;

    match cli.command {
        Command::Play {
            config,
            red,
            blue,
            records_dir,
        } => {
            let config = load_game_config(config.as_deref())?
                .with_agents(red, blue)
                .with_records_dir(records_dir);
            run_play(config, agents_dir.as_deref()).await
        }
        Command::Clue { agent, state } => {
            run_single(Phase::AwaitingClue, &agent, state.as_deref(), agents_dir.as_deref()).await
        }
        Command::Guess { agent, state } => {
            run_single(Phase::AwaitingGuess, &agent, state.as_deref(), agents_dir.as_deref()).await
        }
        Command::Replay {
            record,
            interval_ms,
        } => run_replay(&record, Duration::from_millis(interval_ms)).await,
        Command::Serve {
            port,
            host,
            config,
            red,
            blue,
        } => {
            let config = load_game_config(config.as_deref())?.with_agents(red, blue);
            run_serve(&host, port, config, agents_dir.as_deref()).await
        }
        Command::Agents => list_agents(agents_dir.as_deref()),
    }
}

fn load_game_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => Ok(GameConfig::from_file(path)?),
        None => Ok(GameConfig::default()),
    }
}

fn load_library(agents_dir: Option<&Path>) -> Option<AgentLibrary> {
    let result = match agents_dir {
        Some(dir) => AgentLibrary::scan(dir),
        None => AgentLibrary::scan_default(),
    };
    match result {
        Ok(library) => Some(library),
        Err(e) => {
            info!(error = %e, "No agent library available");
            None
        }
    }
}

/// Resolves an agent by library name, then TOML path, then as a bare
/// OpenAI model name.
#[instrument(skip(library))]
fn resolve_agent(name: &str, library: Option<&AgentLibrary>) -> Result<AgentConfig> {
    match library {
        Some(library) => match library.resolve(name) {
            Ok(agent) => return Ok(agent),
            Err(e) if Path::new(name).is_file() => return Err(e.into()),
            Err(e) => debug!(error = %e, "Agent not in library"),
        },
        None if Path::new(name).is_file() => return Ok(AgentConfig::from_file(name)?),
        None => {}
    }
    info!(model = %name, "Using agent name as OpenAI model");
    Ok(AgentConfig::new(name.to_string()).with_model(LlmProvider::OpenAI, name))
}

fn build_adapter(
    name: &str,
    library: Option<&AgentLibrary>,
    retry: RetryPolicy,
) -> Result<Arc<dyn ModelAdapter>> {
    let agent = resolve_agent(name, library)?;
    Ok(Arc::new(agent.build_adapter(retry)?))
}

/// Play a full game
#[instrument(skip_all, fields(red = %config.red_agent(), blue = %config.blue_agent()))]
async fn run_play(config: GameConfig, agents_dir: Option<&Path>) -> Result<()> {
    let library = load_library(agents_dir);
    let red = build_adapter(config.red_agent(), library.as_ref(), *config.retry())?;
    let blue = build_adapter(config.blue_agent(), library.as_ref(), *config.retry())?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut orchestrator = Orchestrator::with_teams(red, blue)
        .with_settings(config.orchestrator_settings())
        .with_events(event_tx);
    if let Some(dir) = config.records_dir() {
        orchestrator = orchestrator.with_sink(Box::new(JsonFileSink::new(dir.clone())));
    }

    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if let Some(line) = describe_event(&event) {
                println!("{}", line);
            }
        }
    });

    let (handle, shutdown) = ShutdownHandle::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    let state = GameState::new(config.build_board()?);
    let outcome = orchestrator.run(state, shutdown).await;
    drop(orchestrator);
    let _ = printer.await;

    match outcome.status {
        RunStatus::Finished(_) => {
            println!(
                "Final score: red {} - blue {}",
                outcome.state.score(strictly_codenames::Team::Red),
                outcome.state.score(strictly_codenames::Team::Blue)
            );
            Ok(())
        }
        RunStatus::Halted(failure) => Err(anyhow!("Could not get a response: {}", failure)),
        RunStatus::Cancelled => {
            warn!("Game cancelled");
            Ok(())
        }
    }
}

fn describe_event(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::Transitioned { effect, state } => match effect {
            Effect::ClueAccepted => state
                .active_clue()
                .map(|clue| format!("[{}] clue: {}", state.current_team(), clue)),
            Effect::Revealed {
                index,
                affiliation,
                correct,
                ..
            } => state.board().get(*index).map(|cell| {
                format!(
                    "[{}] guess: {} ({}{})",
                    state.current_team(),
                    cell.label(),
                    affiliation,
                    if *correct { ", correct" } else { "" }
                )
            }),
            Effect::Skipped => Some(format!("[{}] skips", state.current_team())),
            Effect::TurnClosed => Some(format!("[{}] turn closed", state.current_team())),
            Effect::TurnSwitched { to } => Some(format!("--- {} to play ---", to)),
            Effect::Discarded(reason) => Some(format!("  (discarded: {})", reason)),
            Effect::Ignored => None,
        },
        GameEvent::GameOver { winner, .. } => Some(format!("Game over: {} wins", winner)),
        GameEvent::Halted(failure) => Some(format!("Could not get a response: {}", failure)),
        GameEvent::Thinking { .. } => None,
    }
}

/// Ask an agent for one clue or guess
#[instrument(skip(state_path, agents_dir))]
async fn run_single(
    phase: Phase,
    agent: &str,
    state_path: Option<&Path>,
    agents_dir: Option<&Path>,
) -> Result<()> {
    let result = single_request(phase, agent, state_path, agents_dir).await;
    match result {
        Ok(json) => {
            println!("{}", json);
            Ok(())
        }
        Err(e) => {
            println!("{}", serde_json::json!({ "error": e.to_string() }));
            std::process::exit(1);
        }
    }
}

async fn single_request(
    phase: Phase,
    agent: &str,
    state_path: Option<&Path>,
    agents_dir: Option<&Path>,
) -> Result<String> {
    let raw = match state_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let state: GameState = serde_json::from_str(&raw).context("Invalid game state")?;
    let request = TurnRequest {
        team: state.current_team(),
        state,
    };
    request.validate(phase)?;

    let library = load_library(agents_dir);
    let adapter = build_adapter(agent, library.as_ref(), RetryPolicy::default())?;
    let json = if phase == Phase::AwaitingClue {
        serde_json::to_string(&adapter.request_clue(&request.state).await?)?
    } else {
        serde_json::to_string(&adapter.request_guess(&request.state).await?)?
    };
    Ok(json)
}

/// Replay a recorded game
#[instrument]
async fn run_replay(path: &PathBuf, interval: Duration) -> Result<()> {
    let record = GameRecord::load(path)?;
    let replay = replay(&record)?;
    for divergence in replay.divergences() {
        println!("warning: {}", divergence);
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<Snapshot>();
    let printer = tokio::spawn(async move {
        while let Some(snapshot) = rx.recv().await {
            println!("{}", describe_snapshot(&snapshot));
        }
    });

    let (handle, shutdown) = ShutdownHandle::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    replay.play(interval, &tx, &shutdown).await;
    drop(tx);
    let _ = printer.await;
    Ok(())
}

fn describe_snapshot(snapshot: &Snapshot) -> String {
    match &snapshot.event {
        SnapshotEvent::ClueShown { team, clue } => format!("[{}] clue: {}", team, clue),
        SnapshotEvent::GuessRevealed {
            word,
            affiliation: Some(affiliation),
            correct,
        } => format!(
            "  guess: {} ({}{})",
            word,
            affiliation,
            if *correct { ", correct" } else { "" }
        ),
        SnapshotEvent::GuessRevealed { .. } => "  skip".to_string(),
        SnapshotEvent::TurnSwitched { to } => format!("--- {} to play ---", to),
        SnapshotEvent::GameEnded {
            winner,
            final_score,
        } => format!(
            "Game over: {} wins (red {} - blue {})",
            winner, final_score.red, final_score.blue
        ),
    }
}

/// Run the HTTP API
#[instrument(skip(config, agents_dir))]
async fn run_serve(
    host: &str,
    port: u16,
    config: GameConfig,
    agents_dir: Option<&Path>,
) -> Result<()> {
    let library = load_library(agents_dir);
    let red = build_adapter(config.red_agent(), library.as_ref(), *config.retry())?;
    let blue = build_adapter(config.blue_agent(), library.as_ref(), *config.retry())?;
    let addr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid address {}:{}", host, port))?;
    strictly_codenames::serve(addr, ApiState::with_teams(red, blue)).await?;
    Ok(())
}

fn list_agents(agents_dir: Option<&Path>) -> Result<()> {
    let library = match agents_dir {
        Some(dir) => AgentLibrary::scan(dir)?,
        None => AgentLibrary::scan_default()?,
    };
    for agent in library.agents() {
        println!(
            "{:<20} {:?} {}",
            agent.name(),
            agent.llm_provider(),
            agent.llm_model()
        );
    }
    Ok(())
}
