//! Command-line interface for strictly_lasers.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Lasers - two-player laser board game engine
#[derive(Parser, Debug)]
#[command(name = "strictly_lasers")]
#[command(about = "Turn engine for a two-player laser board game", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a game configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the starting board for the configuration
    Show,

    /// Play a scripted match and print the result of every move
    Replay {
        /// Path to the match script (TOML)
        script: PathBuf,

        /// Print session snapshots as JSON instead of text boards
        #[arg(long)]
        json: bool,
    },
}
