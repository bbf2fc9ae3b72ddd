//! Train command - Train a Q-learning controller on a board

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use super::{DEFAULT_LAYOUT, parse_board, sanitize_export_path, write_export};
use crate::{
    cli::output::{format_number, print_kv, print_section, print_subsection, render_greedy_policy},
    controller::{Controller, ControllerConfig, DEFAULT_EPISODE_STEPS, TrainingSummary},
    opponent_model::OpponentEntry,
    pipeline::{MetricsObserver, ProgressObserver, ReturnWindow, TrainingObserver},
};

#[derive(Debug, Serialize)]
struct TrainingExport {
    layout: String,
    episode_steps: usize,
    config: ControllerConfig,
    training: TrainingSummary,
    opponents: Vec<OpponentEntry>,
    learning_curve: Vec<ReturnWindow>,
    mean_return: f64,
    visited_entries: usize,
}

#[derive(Parser, Debug)]
#[command(about = "Train a controller", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// Board in inline category codes (rows separated by '/', cells by ',')
    #[arg(long, short = 'l', default_value = DEFAULT_LAYOUT)]
    pub layout: String,

    /// Steps per training episode
    #[arg(long, short = 's', default_value_t = DEFAULT_EPISODE_STEPS)]
    pub steps: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Wall-clock training budget in milliseconds
    #[arg(long, default_value_t = 4950)]
    pub time_budget_ms: u64,

    /// Per-episode epsilon decay (defaults to 0.9999)
    #[arg(long)]
    pub epsilon_decay: Option<f64>,

    /// Episodes per learning-curve window
    #[arg(long, default_value_t = 1000)]
    pub window: usize,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, short = 'q', default_value_t = false)]
    pub quiet: bool,
}

impl TrainArgs {
    fn controller_config(&self) -> ControllerConfig {
        let mut config = ControllerConfig::default()
            .with_time_budget(Duration::from_millis(self.time_budget_ms));
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(decay) = self.epsilon_decay {
            config = config.with_epsilon_decay(decay);
        }
        config
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let board = parse_board(&args.layout)?;
    let config = args.controller_config();
    let export_path = args
        .export
        .as_deref()
        .map(|raw| sanitize_export_path(raw, "training_summary.json"));

    print_section("Training Q-learning controller");
    print_kv("Board", &format!("{}x{}", board.rows(), board.cols()));
    print_kv("Episode steps", &args.steps.to_string());
    print_kv("Time budget", &format!("{} ms", args.time_budget_ms));
    if let Some(seed) = args.seed {
        print_kv("Seed", &seed.to_string());
    }

    let mut metrics = MetricsObserver::new(args.window);
    let mut progress = ProgressObserver::new();
    let controller = {
        let mut observers: Vec<&mut dyn TrainingObserver> = Vec::new();
        observers.push(&mut metrics);
        if !args.quiet {
            observers.push(&mut progress);
        }
        Controller::with_config(board.clone(), args.steps, config.clone(), &mut observers)
            .context("training failed")?
    };

    let summary = controller.training_summary();
    print_subsection("Training summary");
    print_kv("Episodes", &format_number(summary.episodes));
    print_kv("Total steps", &format_number(summary.total_steps));
    print_kv(
        "Cleared",
        &format!("{} ({:.1}%)", summary.cleared, summary.clear_rate() * 100.0),
    );
    print_kv("Caught", &summary.caught.to_string());
    print_kv("Out of steps", &summary.exhausted.to_string());
    print_kv("Mean return", &format!("{:.3}", metrics.mean_return()));
    print_kv("Final epsilon", &format!("{:.4}", summary.final_epsilon));
    print_kv("Elapsed", &format!("{:.2?}", summary.elapsed));
    print_kv("Stopped by", &format!("{:?}", summary.stop_reason));

    print_subsection("Opponent survival estimates");
    for entry in controller.opponent_model().snapshot() {
        print_kv(
            entry.adversary.name(),
            &format!("{:.3} over {} encounters", entry.survival, entry.encounters),
        );
    }

    print_subsection("Greedy policy");
    for line in render_greedy_policy(controller.board(), controller.q_table()) {
        println!("  {line}");
    }

    if let Some(path) = export_path {
        let export = TrainingExport {
            layout: board.to_layout_string(),
            episode_steps: args.steps,
            config,
            training: summary.clone(),
            opponents: controller.opponent_model().snapshot(),
            learning_curve: metrics.windows().to_vec(),
            mean_return: metrics.mean_return(),
            visited_entries: controller.q_table().visited(),
        };
        write_export(&path, &export)?;
        println!("\nSummary written to {}", path.display());
    }

    Ok(())
}
