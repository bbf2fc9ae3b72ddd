//! Evaluation pipeline and training observers
//!
//! This module provides:
//! - The game driver loop and score averaging
//! - A random baseline policy
//! - Observers recording training progress

pub mod baseline;
pub mod evaluation;
pub mod observers;

pub use baseline::RandomPolicy;
pub use evaluation::{
    EvaluationConfig, EvaluationReport, EvaluationRunner, GameResult, PolicyKind, RoundReport,
    evaluate_policy, play_game,
};
pub use observers::{MetricsObserver, ProgressObserver, ReturnWindow};

pub use crate::ports::{Policy, TrainingObserver};
