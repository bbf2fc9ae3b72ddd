//! Common fixtures for the ghostgrid test suite.

#![allow(dead_code)]

use std::time::Duration;

use ghostgrid::{Board, ControllerConfig};

/// The 5x6 reference board used by the evaluation driver.
pub const REFERENCE_LAYOUT: &str =
    "20,10,10,10,10,11/10,10,10,10,41,11/10,11,10,10,11,11/10,11,10,10,10,10/70,10,10,10,11,10";

pub fn reference_board() -> Board {
    REFERENCE_LAYOUT.parse().unwrap()
}

/// Seeded configuration whose exploration floor is reached long before the
/// deadline, so training runs a fixed number of episodes.
pub fn floor_bound_config(seed: u64, epsilon_decay: f64) -> ControllerConfig {
    ControllerConfig::default()
        .with_seed(seed)
        .with_epsilon_decay(epsilon_decay)
        .with_time_budget(Duration::from_secs(30))
}
