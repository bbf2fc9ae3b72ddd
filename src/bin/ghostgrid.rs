//! ghostgrid CLI - Train and evaluate grid-world controllers
//!
//! This CLI provides a unified interface for:
//! - Training a Q-learning controller on a board under a time budget
//! - Evaluating controllers (or a random baseline) over rounds of games

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ghostgrid")]
#[command(version, about = "Q-learning controller for a grid world with adversaries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a controller and report what it learned
    Train(ghostgrid::cli::commands::train::TrainArgs),

    /// Train and score controllers over several rounds
    Evaluate(ghostgrid::cli::commands::evaluate::EvaluateArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => ghostgrid::cli::commands::train::execute(args),
        Commands::Evaluate(args) => ghostgrid::cli::commands::evaluate::execute(args),
    }
}
