//! Evaluate command - Score trained controllers with the game driver loop

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use super::{DEFAULT_LAYOUT, parse_board, sanitize_export_path, write_export};
use crate::{
    cli::output::{print_kv, print_section, print_subsection},
    controller::{ControllerConfig, DEFAULT_EPISODE_STEPS},
    pipeline::{EvaluationConfig, EvaluationRunner, PolicyKind, ProgressObserver, TrainingObserver},
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate controllers over several rounds", allow_negative_numbers = true)]
pub struct EvaluateArgs {
    /// Board in inline category codes (rows separated by '/', cells by ',')
    #[arg(long, short = 'l', default_value = DEFAULT_LAYOUT)]
    pub layout: String,

    /// Decisions per game and steps per training episode
    #[arg(long, short = 's', default_value_t = DEFAULT_EPISODE_STEPS)]
    pub steps: usize,

    /// Probability that the executed move is the chosen one
    #[arg(long, short = 'p', default_value_t = 0.7)]
    pub fidelity: f64,

    /// Games averaged per round
    #[arg(long, short = 'g', default_value_t = 30)]
    pub games: usize,

    /// Rounds, each with a freshly trained controller
    #[arg(long, short = 'r', default_value_t = 5)]
    pub rounds: usize,

    /// Random seed for reproducibility (round i uses seed + i)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Wall-clock training budget per round in milliseconds
    #[arg(long, default_value_t = 4950)]
    pub time_budget_ms: u64,

    /// Evaluate a baseline policy instead of a trained controller
    #[arg(long, value_enum)]
    pub baseline: Option<Baseline>,

    /// Export results to file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Hide the training progress bar
    #[arg(long, short = 'q', default_value_t = false)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Baseline {
    /// Uniformly random moves
    Random,
}

impl EvaluateArgs {
    fn evaluation_config(&self) -> EvaluationConfig {
        let mut config = EvaluationConfig::default()
            .with_rounds(self.rounds)
            .with_games(self.games)
            .with_steps(self.steps)
            .with_fidelity(self.fidelity);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }

    fn policy(&self) -> PolicyKind {
        match self.baseline {
            Some(Baseline::Random) => PolicyKind::Random,
            None => PolicyKind::QLearning,
        }
    }
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let board = parse_board(&args.layout)?;
    let export_path = args
        .export
        .as_deref()
        .map(|raw| sanitize_export_path(raw, "evaluation.json"));

    let runner = EvaluationRunner::new(board, args.evaluation_config())
        .with_controller_config(
            ControllerConfig::default().with_time_budget(Duration::from_millis(args.time_budget_ms)),
        )
        .with_policy(args.policy());

    print_section("Evaluating policy");
    print_kv("Policy", &format!("{:?}", args.policy()));
    print_kv("Rounds", &args.rounds.to_string());
    print_kv("Games per round", &args.games.to_string());
    print_kv("Steps per game", &args.steps.to_string());
    print_kv("Fidelity", &format!("{:.2}", args.fidelity));

    let mut progress = ProgressObserver::new();
    let report = {
        let mut observers: Vec<&mut dyn TrainingObserver> = Vec::new();
        if !args.quiet {
            observers.push(&mut progress);
        }
        runner.run(&mut observers).context("evaluation failed")?
    };

    print_subsection("Scores");
    for round in &report.rounds {
        let training = round
            .training
            .as_ref()
            .map(|summary| format!(" after {} training episodes", summary.episodes))
            .unwrap_or_default();
        println!(
            "  the score at round {}: {:.3}{training}",
            round.round, round.mean_score
        );
    }
    print_kv("Average score", &format!("{:.3}", report.mean_score));

    if let Some(path) = export_path {
        write_export(&path, &report)?;
        println!("\nResults written to {}", path.display());
    }

    Ok(())
}
