//! Builder pattern for Controller construction
//!
//! Provides a fluent API for configuring the training run before the
//! blocking construction call.

use std::time::Duration;

use super::{Controller, ControllerConfig};
use crate::{Result, grid::Board, ports::TrainingObserver};

/// Steps per training episode when none is given
pub const DEFAULT_EPISODE_STEPS: usize = 100;

/// Builder for constructing (and thereby training) a [`Controller`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use ghostgrid::{controller::ControllerBuilder, grid::Board};
///
/// let board: Board = "20,10,11/10,10,11/70,10,10".parse().unwrap();
/// let controller = ControllerBuilder::new(board)
///     .episode_steps(50)
///     .seed(7)
///     .epsilon_decay(0.95)
///     .time_budget(Duration::from_millis(200))
///     .build()
///     .unwrap();
/// assert!(controller.training_summary().episodes > 0);
/// ```
pub struct ControllerBuilder<'a> {
    board: Board,
    episode_steps: usize,
    config: ControllerConfig,
    observers: Vec<&'a mut dyn TrainingObserver>,
}

impl<'a> ControllerBuilder<'a> {
    /// Create a builder for `board` with the default configuration.
    pub fn new(board: Board) -> Self {
        Self {
            board,
            episode_steps: DEFAULT_EPISODE_STEPS,
            config: ControllerConfig::default(),
            observers: Vec::new(),
        }
    }

    /// Set the step budget of each training episode.
    pub fn episode_steps(mut self, steps: usize) -> Self {
        self.episode_steps = steps;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the wall-clock training budget.
    pub fn time_budget(mut self, budget: Duration) -> Self {
        self.config.time_budget = budget;
        self
    }

    /// Set the per-episode epsilon decay.
    pub fn epsilon_decay(mut self, decay: f64) -> Self {
        self.config.epsilon_decay = decay;
        self
    }

    /// Attach an observer to the training run.
    pub fn observer(mut self, observer: &'a mut dyn TrainingObserver) -> Self {
        self.observers.push(observer);
        self
    }

    /// Validate the configuration, train, and return the ready controller.
    pub fn build(mut self) -> Result<Controller> {
        Controller::with_config(
            self.board,
            self.episode_steps,
            self.config,
            &mut self.observers,
        )
    }
}
