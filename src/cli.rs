//! Command-line interface for strictly_codenames.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Codenames - LLM-played Codenames
#[derive(Parser, Debug)]
#[command(name = "strictly_codenames")]
#[command(about = "Autonomous Codenames games between language models", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory of agent .toml files (defaults to $STRICTLY_CODENAMES_AGENTS,
    /// then $XDG_CONFIG_HOME/strictly_codenames/agents, then ./agents)
    #[arg(long, global = true)]
    pub agents_dir: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a full game between two agents
    Play {
        /// Game config TOML
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Agent playing red (name or .toml path)
        #[arg(long)]
        red: Option<String>,

        /// Agent playing blue (name or .toml path)
        #[arg(long)]
        blue: Option<String>,

        /// Directory to write the finished game record to
        #[arg(long)]
        records_dir: Option<PathBuf>,
    },

    /// Ask an agent for one clue
    Clue {
        /// Agent to ask (name or .toml path)
        #[arg(short, long, default_value = "gpt-4o")]
        agent: String,

        /// Game state JSON file; stdin when omitted
        #[arg(short, long)]
        state: Option<PathBuf>,
    },

    /// Ask an agent for one guess
    Guess {
        /// Agent to ask (name or .toml path)
        #[arg(short, long, default_value = "gpt-4o")]
        agent: String,

        /// Game state JSON file; stdin when omitted
        #[arg(short, long)]
        state: Option<PathBuf>,
    },

    /// Replay a recorded game
    Replay {
        /// Game record JSON file
        record: PathBuf,

        /// Delay between snapshots in milliseconds
        #[arg(long, default_value = "1000")]
        interval_ms: u64,
    },

    /// Serve the clue/guess HTTP API
    Serve {
        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Game config TOML (agents and retry policy)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Agent playing red (name or .toml path)
        #[arg(long)]
        red: Option<String>,

        /// Agent playing blue (name or .toml path)
        #[arg(long)]
        blue: Option<String>,
    },

    /// List available agents
    Agents,
}
