//! Q-learning controller: trains against the simulator, then answers moves
//!
//! Construction is blocking. It runs the training loop until the
//! exploration rate reaches its floor or the wall-clock budget is spent,
//! and only then returns a controller that is ready for
//! [`Controller::choose_next_move`]. There is no way back to training.

pub mod builder;
pub mod config;
pub mod policy;
pub mod training;

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

pub use builder::{ControllerBuilder, DEFAULT_EPISODE_STEPS};
pub use config::ControllerConfig;
pub use policy::FidelityEstimate;
pub use training::{EpisodeSummary, StopReason, TrainingPlan, TrainingSummary};

use self::policy::PreviousMove;
use crate::{
    Result,
    grid::{Board, ItemSet, Locations},
    opponent_model::OpponentModel,
    ports::TrainingObserver,
    q_learning::QTable,
};

/// Lifecycle of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Training,
    Ready,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Tabular Q-learning agent for one board
#[derive(Debug, Clone)]
pub struct Controller {
    board: Board,
    episode_steps: usize,
    config: ControllerConfig,
    q_table: QTable,
    opponents: OpponentModel,
    epsilon: f64,
    fidelity: FidelityEstimate,
    previous: Option<PreviousMove>,
    rng: StdRng,
    phase: Phase,
    summary: TrainingSummary,
}

impl Controller {
    /// Train a controller with the default configuration.
    ///
    /// `rows` and `cols` give the board size; the initial placement and items
    /// must lie on it. Blocks for at most the default time budget (plus the
    /// episode in progress when it expires).
    pub fn new(
        rows: usize,
        cols: usize,
        initial_locations: Locations,
        initial_items: ItemSet,
        episode_steps: usize,
    ) -> Result<Self> {
        let board = Board::from_placement(rows, cols, &initial_locations, &initial_items)?;
        ControllerBuilder::new(board)
            .episode_steps(episode_steps)
            .build()
    }

    /// Train a controller for `board` with an explicit configuration,
    /// reporting episodes to `observers`.
    pub fn with_config(
        board: Board,
        episode_steps: usize,
        config: ControllerConfig,
        observers: &mut [&mut dyn TrainingObserver],
    ) -> Result<Self> {
        config.validate()?;
        let mut controller = Self::untrained(board, episode_steps, config);
        controller.train(observers)?;
        Ok(controller)
    }

    /// Start configuring a controller for `board`.
    pub fn builder<'a>(board: Board) -> ControllerBuilder<'a> {
        ControllerBuilder::new(board)
    }

    fn untrained(board: Board, episode_steps: usize, config: ControllerConfig) -> Self {
        Self {
            q_table: QTable::new(
                board.rows(),
                board.cols(),
                config.learning_rate,
                config.discount_factor,
            ),
            opponents: OpponentModel::new(),
            epsilon: config.initial_epsilon,
            fidelity: FidelityEstimate::new(config.initial_fidelity),
            previous: None,
            rng: build_rng(config.seed),
            phase: Phase::Training,
            summary: TrainingSummary::empty(config.initial_epsilon),
            board,
            episode_steps,
            config,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn opponent_model(&self) -> &OpponentModel {
        &self.opponents
    }

    /// Current exploration rate; fixed once training is over
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn fidelity(&self) -> &FidelityEstimate {
        &self.fidelity
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn training_summary(&self) -> &TrainingSummary {
        &self.summary
    }
}
