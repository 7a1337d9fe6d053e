//! Strictly Lasers - command-line front end.
//!
//! Shows starting boards and plays scripted matches through the turn engine.

#![warn(missing_docs)]

mod cli;
mod replay;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use replay::MatchScript;
use std::path::Path;
use strictly_lasers::GameConfig;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Show => show(&config),
        Command::Replay { script, json } => run_replay(&config, &script, json),
    }
}

/// Loads the configuration file, or the defaults when none is given.
#[instrument]
fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    match path {
        Some(path) => Ok(GameConfig::from_file(path)?),
        None => {
            info!("Using default configuration");
            Ok(GameConfig::default())
        }
    }
}

/// Prints the starting board.
#[instrument(skip(config))]
fn show(config: &GameConfig) -> Result<()> {
    let board = config.board_setup().build()?;
    println!("{}", board.display());
    Ok(())
}

/// Plays a match script and prints each step.
#[instrument(skip(config))]
fn run_replay(config: &GameConfig, script: &Path, json: bool) -> Result<()> {
    let script = MatchScript::from_file(script)?;
    let session = script.play(config, |step, result, session| {
        println!("{} plays {}", step.player, step.action);
        match result {
            Ok(result) => {
                if let Some(trace) = result.trace() {
                    println!("  {} after {} cells", trace.outcome(), trace.path().len());
                }
                println!("  {}", result.phase());
            }
            Err(e) => println!("  rejected: {}", e),
        }
        if json {
            match session.current_state().to_json() {
                Ok(text) => println!("{}", text),
                Err(e) => println!("  snapshot unavailable: {}", e),
            }
        } else {
            println!("{}\n", session.game().board().display());
        }
    })?;

    let state = session.current_state();
    match state.winner() {
        Some(winner) => println!("Winner: {}", winner),
        None if *state.game_over() => println!("Draw"),
        None => println!("Game still in progress after {} moves", state.move_count()),
    }
    Ok(())
}
