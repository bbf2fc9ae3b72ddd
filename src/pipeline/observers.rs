//! Observer implementations for training runs
//!
//! Observers allow composable data collection during training without
//! coupling the training loop to output formats.

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    controller::{EpisodeSummary, TrainingPlan, TrainingSummary},
    ports::TrainingObserver,
};

/// Progress bar observer - Shows training progress
///
/// The bar length is the number of episodes until the exploration floor;
/// when that is unbounded a spinner is shown instead.
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    cleared: usize,
    caught: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            cleared: 0,
            caught: 0,
        }
    }

    fn message(&self, epsilon: f64) -> String {
        format!("C:{} X:{} eps:{epsilon:.3}", self.cleared, self.caught)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingObserver for ProgressObserver {
    fn on_training_start(&mut self, plan: &TrainingPlan) -> Result<()> {
        let pb = match plan.exploration_episodes {
            Some(episodes) => {
                let pb = ProgressBar::new(episodes);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                        .map_err(|e| crate::Error::ProgressBarTemplate {
                            message: e.to_string(),
                        })?
                        .progress_chars("=>-"),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} {pos} episodes ({msg})")
                        .map_err(|e| crate::Error::ProgressBarTemplate {
                            message: e.to_string(),
                        })?,
                );
                pb
            }
        };
        self.progress_bar = Some(pb);
        self.cleared = 0;
        self.caught = 0;
        Ok(())
    }

    fn on_episode_end(&mut self, episode: &EpisodeSummary) -> Result<()> {
        if episode.cleared() {
            self.cleared += 1;
        } else if episode.caught() {
            self.caught += 1;
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(episode.episode as u64 + 1);
            pb.set_message(self.message(episode.epsilon));
        }
        Ok(())
    }

    fn on_training_end(&mut self, summary: &TrainingSummary) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(format!(
                "{} ({:?})",
                self.message(summary.final_epsilon),
                summary.stop_reason
            ));
        }
        Ok(())
    }
}

/// Returns averaged over a block of consecutive episodes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnWindow {
    pub first_episode: usize,
    pub episodes: usize,
    pub mean_return: f64,
    pub clear_rate: f64,
}

/// Metrics observer - Tracks the learning curve
///
/// Episode returns are grouped into fixed-size windows so the curve stays
/// small however many episodes fit in the time budget.
pub struct MetricsObserver {
    window_size: usize,
    windows: Vec<ReturnWindow>,
    current_sum: f64,
    current_cleared: usize,
    current_len: usize,
    total_return: f64,
    episodes: usize,
    cleared: usize,
    caught: usize,
    exhausted: usize,
}

impl MetricsObserver {
    /// Create a new metrics observer averaging over `window_size` episodes
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            windows: Vec::new(),
            current_sum: 0.0,
            current_cleared: 0,
            current_len: 0,
            total_return: 0.0,
            episodes: 0,
            cleared: 0,
            caught: 0,
            exhausted: 0,
        }
    }

    /// Completed windows, oldest first
    pub fn windows(&self) -> &[ReturnWindow] {
        &self.windows
    }

    pub fn episodes(&self) -> usize {
        self.episodes
    }

    pub fn cleared(&self) -> usize {
        self.cleared
    }

    pub fn caught(&self) -> usize {
        self.caught
    }

    /// Episodes that ran out of steps
    pub fn exhausted(&self) -> usize {
        self.exhausted
    }

    /// Mean return over every observed episode
    pub fn mean_return(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.total_return / self.episodes as f64
        }
    }

    fn close_window(&mut self) {
        if self.current_len == 0 {
            return;
        }
        let len = self.current_len as f64;
        self.windows.push(ReturnWindow {
            first_episode: self.episodes - self.current_len,
            episodes: self.current_len,
            mean_return: self.current_sum / len,
            clear_rate: self.current_cleared as f64 / len,
        });
        self.current_sum = 0.0;
        self.current_cleared = 0;
        self.current_len = 0;
    }
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl TrainingObserver for MetricsObserver {
    fn on_episode_end(&mut self, episode: &EpisodeSummary) -> Result<()> {
        self.episodes += 1;
        self.total_return += episode.total_reward;
        self.current_sum += episode.total_reward;
        self.current_len += 1;
        if episode.cleared() {
            self.cleared += 1;
            self.current_cleared += 1;
        } else if episode.caught() {
            self.caught += 1;
        } else {
            self.exhausted += 1;
        }
        if self.current_len == self.window_size {
            self.close_window();
        }
        Ok(())
    }

    fn on_training_end(&mut self, _summary: &TrainingSummary) -> Result<()> {
        self.close_window();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Termination;

    fn episode(index: usize, total_reward: f64, termination: Option<Termination>) -> EpisodeSummary {
        EpisodeSummary {
            episode: index,
            steps: 10,
            total_reward,
            termination,
            epsilon: 0.5,
        }
    }

    #[test]
    fn test_metrics_windows() {
        let mut metrics = MetricsObserver::new(2);
        metrics
            .on_episode_end(&episode(0, 12.0, Some(Termination::Cleared)))
            .unwrap();
        metrics
            .on_episode_end(&episode(1, -10.0, Some(Termination::Caught { by: None })))
            .unwrap();
        metrics.on_episode_end(&episode(2, 3.0, None)).unwrap();

        assert_eq!(metrics.windows().len(), 1);
        assert_eq!(metrics.windows()[0].mean_return, 1.0);
        assert_eq!(metrics.windows()[0].clear_rate, 0.5);

        let summary = crate::controller::TrainingSummary {
            episodes: 3,
            total_steps: 30,
            cleared: 1,
            caught: 1,
            exhausted: 1,
            final_epsilon: 0.5,
            elapsed: std::time::Duration::from_millis(1),
            stop_reason: crate::controller::StopReason::Deadline,
        };
        metrics.on_training_end(&summary).unwrap();

        assert_eq!(metrics.windows().len(), 2);
        assert_eq!(metrics.windows()[1].first_episode, 2);
        assert_eq!(metrics.windows()[1].episodes, 1);
        assert_eq!(metrics.episodes(), 3);
        assert_eq!(
            (metrics.cleared(), metrics.caught(), metrics.exhausted()),
            (1, 1, 1)
        );
        assert!((metrics.mean_return() - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = MetricsObserver::default();
        assert_eq!(metrics.mean_return(), 0.0);
        assert!(metrics.windows().is_empty());
    }
}
