//! Learning and scheduling parameters for the controller.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Configuration for training a [`Controller`](super::Controller).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use ghostgrid::controller::ControllerConfig;
///
/// let config = ControllerConfig::default()
///     .with_seed(42)
///     .with_time_budget(Duration::from_millis(500))
///     .with_epsilon_decay(0.99);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Learning rate α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount_factor: f64,
    /// Assumed probability that a requested move executes as intended,
    /// before any observation; also the value restored when the estimate
    /// collapses to zero
    pub initial_fidelity: f64,
    /// Exploration rate of the first episode
    pub initial_epsilon: f64,
    /// Multiplicative decay applied after each episode
    pub epsilon_decay: f64,
    /// Training stops once epsilon falls to this floor
    pub min_epsilon: f64,
    /// Wall-clock budget for the whole training loop
    pub time_budget: Duration,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            discount_factor: 0.9,
            initial_fidelity: 0.75,
            initial_epsilon: 1.0,
            epsilon_decay: 0.9999,
            min_epsilon: 0.05,
            time_budget: Duration::from_millis(4950),
            seed: None,
        }
    }
}

impl ControllerConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_initial_fidelity(mut self, fidelity: f64) -> Self {
        self.initial_fidelity = fidelity;
        self
    }

    pub fn with_initial_epsilon(mut self, epsilon: f64) -> Self {
        self.initial_epsilon = epsilon;
        self
    }

    pub fn with_epsilon_decay(mut self, decay: f64) -> Self {
        self.epsilon_decay = decay;
        self
    }

    pub fn with_min_epsilon(mut self, min_epsilon: f64) -> Self {
        self.min_epsilon = min_epsilon;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every parameter against its admissible range.
    pub fn validate(&self) -> Result<()> {
        check_range(
            "learning_rate",
            self.learning_rate,
            self.learning_rate > 0.0 && self.learning_rate <= 1.0,
            "(0, 1]",
        )?;
        check_range(
            "discount_factor",
            self.discount_factor,
            (0.0..1.0).contains(&self.discount_factor),
            "[0, 1)",
        )?;
        check_range(
            "initial_fidelity",
            self.initial_fidelity,
            self.initial_fidelity > 0.0 && self.initial_fidelity <= 1.0,
            "(0, 1]",
        )?;
        check_range(
            "initial_epsilon",
            self.initial_epsilon,
            (0.0..=1.0).contains(&self.initial_epsilon),
            "[0, 1]",
        )?;
        check_range(
            "epsilon_decay",
            self.epsilon_decay,
            self.epsilon_decay > 0.0 && self.epsilon_decay < 1.0,
            "(0, 1)",
        )?;
        check_range(
            "min_epsilon",
            self.min_epsilon,
            (0.0..1.0).contains(&self.min_epsilon),
            "[0, 1)",
        )?;
        if self.time_budget.is_zero() {
            return Err(Error::InvalidConfiguration {
                message: "time_budget must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Number of episodes until epsilon reaches its floor, ignoring the
    /// deadline. `None` when the floor is zero and never reached.
    pub fn exploration_episodes(&self) -> Option<u64> {
        if self.initial_epsilon <= self.min_epsilon {
            return Some(0);
        }
        if self.min_epsilon <= 0.0 {
            return None;
        }
        let episodes = (self.min_epsilon / self.initial_epsilon).ln() / self.epsilon_decay.ln();
        Some(episodes.ceil() as u64)
    }
}

fn check_range(name: &str, value: f64, ok: bool, range: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration {
            message: format!("{name} must be in {range}, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.learning_rate, 0.05);
        assert_eq!(config.discount_factor, 0.9);
        assert_eq!(config.initial_fidelity, 0.75);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let cases = [
            ControllerConfig::default().with_learning_rate(0.0),
            ControllerConfig::default().with_discount_factor(1.0),
            ControllerConfig::default().with_initial_fidelity(0.0),
            ControllerConfig::default().with_initial_epsilon(1.5),
            ControllerConfig::default().with_epsilon_decay(1.0),
            ControllerConfig::default().with_min_epsilon(-0.1),
            ControllerConfig::default().with_learning_rate(f64::NAN),
            ControllerConfig::default().with_time_budget(Duration::ZERO),
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(Error::InvalidConfiguration { .. })),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_exploration_episodes() {
        let config = ControllerConfig::default().with_epsilon_decay(0.5);
        // 1.0 -> 0.5 -> 0.25 -> 0.125 -> 0.0625 -> 0.03125
        assert_eq!(config.exploration_episodes(), Some(5));

        let config = ControllerConfig::default().with_min_epsilon(0.0);
        assert_eq!(config.exploration_episodes(), None);

        let config = ControllerConfig::default().with_initial_epsilon(0.01);
        assert_eq!(config.exploration_episodes(), Some(0));
    }
}
