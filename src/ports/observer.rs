//! Observer port - abstraction for watching a training run
//!
//! Training runs inside controller construction, so observers are the only
//! way to see it progress. They receive episode-level events and never
//! influence learning.

use crate::{
    Result,
    controller::{EpisodeSummary, TrainingPlan, TrainingSummary},
};

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(plan)` - once, before the first episode
/// 2. `on_episode_end(summary)` - after every completed episode
/// 3. `on_training_end(summary)` - once, after the deadline or the
///    exploration floor stops the loop
///
/// # Examples
///
/// ```no_run
/// use ghostgrid::{controller::EpisodeSummary, ports::TrainingObserver};
///
/// struct ClearedCounter {
///     cleared: usize,
/// }
///
/// impl TrainingObserver for ClearedCounter {
///     fn on_episode_end(&mut self, episode: &EpisodeSummary) -> ghostgrid::Result<()> {
///         if episode.cleared() {
///             self.cleared += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait TrainingObserver {
    /// Called once before the first episode.
    fn on_training_start(&mut self, _plan: &TrainingPlan) -> Result<()> {
        Ok(())
    }

    /// Called after each episode, terminated or out of steps.
    fn on_episode_end(&mut self, _episode: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called once when the training loop stops.
    fn on_training_end(&mut self, _summary: &TrainingSummary) -> Result<()> {
        Ok(())
    }
}
