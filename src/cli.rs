//! Command-line interface for rps_live.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Live Rock-Paper-Scissors-Lizard-Spock match server
#[derive(Parser, Debug)]
#[command(name = "rps_live")]
#[command(about = "Live best-of-N Rock-Paper-Scissors-Lizard-Spock matches", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the server configuration file
    #[arg(short, long, global = true, default_value = "rps_live.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Host the session registry and idle eviction until interrupted
    Serve,

    /// Apply database migrations
    Migrate {
        /// Database file (overrides the config file)
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Play a scripted series between two players and store the result
    Play {
        /// First player's identity
        #[arg(long)]
        player1: String,

        /// Second player's identity
        #[arg(long)]
        player2: String,

        /// First player's moves, comma separated (e.g. rock,paper)
        #[arg(long, value_delimiter = ',')]
        moves1: Vec<String>,

        /// Second player's moves, comma separated
        #[arg(long, value_delimiter = ',')]
        moves2: Vec<String>,

        /// Series length (odd); defaults to the config file's value
        #[arg(long)]
        best_of: Option<u32>,

        /// Allow lizard and Spock
        #[arg(long)]
        extended: bool,

        /// Database file (overrides the config file)
        #[arg(long)]
        db_path: Option<String>,
    },
}
