//! Deadline-bounded training loop

use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{Controller, Phase};
use crate::{
    Result,
    grid::{GridWorld, Termination},
    opponent_model::EncounterOutcome,
    ports::TrainingObserver,
};

/// What the loop is about to do, handed to observers up front
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingPlan {
    pub rows: usize,
    pub cols: usize,
    pub episode_steps: usize,
    pub time_budget: Duration,
    /// Episodes until the exploration floor, if the deadline does not
    /// stop the loop first
    pub exploration_episodes: Option<u64>,
}

/// One finished training episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Zero-based episode number
    pub episode: usize,
    pub steps: usize,
    /// Sum of raw rewards and terminal adjustments
    pub total_reward: f64,
    /// `None` when the step budget ran out first
    pub termination: Option<Termination>,
    /// Exploration rate the episode was played with
    pub epsilon: f64,
}

impl EpisodeSummary {
    pub fn cleared(&self) -> bool {
        matches!(self.termination, Some(Termination::Cleared))
    }

    pub fn caught(&self) -> bool {
        matches!(self.termination, Some(Termination::Caught { .. }))
    }
}

/// Why the training loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Epsilon decayed to its floor
    ExplorationFloor,
    /// The wall-clock budget ran out
    Deadline,
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub episodes: usize,
    pub total_steps: usize,
    /// Episodes ending with every item collected
    pub cleared: usize,
    /// Episodes ending in a fatal encounter
    pub caught: usize,
    /// Episodes that ran out of steps
    pub exhausted: usize,
    pub final_epsilon: f64,
    pub elapsed: Duration,
    pub stop_reason: StopReason,
}

impl TrainingSummary {
    pub(super) fn empty(initial_epsilon: f64) -> Self {
        Self {
            episodes: 0,
            total_steps: 0,
            cleared: 0,
            caught: 0,
            exhausted: 0,
            final_epsilon: initial_epsilon,
            elapsed: Duration::ZERO,
            stop_reason: StopReason::ExplorationFloor,
        }
    }

    fn record(&mut self, episode: &EpisodeSummary) {
        self.episodes += 1;
        self.total_steps += episode.steps;
        match episode.termination {
            Some(Termination::Cleared) => self.cleared += 1,
            Some(Termination::Caught { .. }) => self.caught += 1,
            None => self.exhausted += 1,
        }
    }

    /// Fraction of episodes that cleared the board
    pub fn clear_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.cleared as f64 / self.episodes as f64
        }
    }
}

impl Controller {
    /// Run episodes until the exploration floor or the deadline, whichever
    /// comes first. The deadline is only checked between episodes.
    pub(super) fn train(&mut self, observers: &mut [&mut dyn TrainingObserver]) -> Result<()> {
        let started = Instant::now();
        let mut world = GridWorld::new(self.board.clone());

        let plan = TrainingPlan {
            rows: self.board.rows(),
            cols: self.board.cols(),
            episode_steps: self.episode_steps,
            time_budget: self.config.time_budget,
            exploration_episodes: self.config.exploration_episodes(),
        };
        for observer in observers.iter_mut() {
            observer.on_training_start(&plan)?;
        }
        info!(
            rows = plan.rows,
            cols = plan.cols,
            episode_steps = plan.episode_steps,
            time_budget_ms = plan.time_budget.as_millis() as u64,
            "training started"
        );

        let mut summary = TrainingSummary::empty(self.epsilon);
        let stop_reason = loop {
            if self.epsilon <= self.config.min_epsilon {
                break StopReason::ExplorationFloor;
            }
            if started.elapsed() >= self.config.time_budget {
                break StopReason::Deadline;
            }

            let episode = self.run_episode(&mut world, summary.episodes);
            summary.record(&episode);
            self.epsilon *= self.config.epsilon_decay;

            for observer in observers.iter_mut() {
                observer.on_episode_end(&episode)?;
            }
        };

        summary.final_epsilon = self.epsilon;
        summary.elapsed = started.elapsed();
        summary.stop_reason = stop_reason;
        self.phase = Phase::Ready;

        info!(
            episodes = summary.episodes,
            steps = summary.total_steps,
            cleared = summary.cleared,
            caught = summary.caught,
            epsilon = summary.final_epsilon,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            stop_reason = ?summary.stop_reason,
            "training finished"
        );

        for observer in observers.iter_mut() {
            observer.on_training_end(&summary)?;
        }
        self.summary = summary;
        Ok(())
    }

    fn run_episode(&mut self, world: &mut GridWorld, episode: usize) -> EpisodeSummary {
        world.reset();

        let mut steps = 0;
        let mut total_reward = 0.0;
        let mut termination = None;

        for _ in 0..self.episode_steps {
            let position = world.locations().agent;

            let intended = if self.rng.random::<f64>() < self.epsilon {
                self.q_table.random_action(&mut self.rng)
            } else {
                self.q_table.best_action(position, &mut self.rng)
            };
            let executed = if self.rng.random::<f64>() < self.fidelity.value() {
                intended
            } else {
                self.q_table.random_other_action(intended, &mut self.rng)
            };

            // Attribute the encounter before the step can remove the adversary
            let encountered = world
                .board()
                .neighbor(position, executed)
                .and_then(|target| world.locations().adversary_at(target));

            let step = world.step(executed, &mut self.rng);
            let reward = step.total_reward();
            self.q_table
                .update(position, intended, world.locations().agent, reward);

            steps += 1;
            total_reward += reward;

            match step.termination {
                Some(Termination::Caught { .. }) => {
                    match encountered {
                        Some(adversary) => self
                            .opponents
                            .record_outcome(adversary, EncounterOutcome::Fatal),
                        None => warn!(episode, "fatal encounter without a detected adversary"),
                    }
                    termination = step.termination;
                    break;
                }
                Some(Termination::Cleared) => {
                    if let Some(adversary) = encountered {
                        self.opponents
                            .record_outcome(adversary, EncounterOutcome::Survived);
                    }
                    termination = step.termination;
                    break;
                }
                None => {
                    if let Some(adversary) = encountered {
                        self.opponents
                            .record_outcome(adversary, EncounterOutcome::Survived);
                    }
                }
            }
        }

        debug!(episode, steps, total_reward, epsilon = self.epsilon, "episode finished");

        EpisodeSummary {
            episode,
            steps,
            total_reward,
            termination,
            epsilon: self.epsilon,
        }
    }
}
