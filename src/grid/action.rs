//! The four directional moves available to the agent

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Error;

/// A directional move on the grid
///
/// The declaration order is the canonical scan order used wherever actions
/// are enumerated (Q-table rows, tie-breaking, reward estimation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    /// All actions in canonical order
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Number of actions
    pub const COUNT: usize = Self::ALL.len();

    /// Position in the canonical order (0-3)
    pub fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Down => 1,
            Action::Left => 2,
            Action::Right => 3,
        }
    }

    /// Inverse of [`Action::index`]
    pub fn from_index(index: usize) -> Option<Action> {
        Self::ALL.get(index).copied()
    }

    /// Unit displacement as (row delta, column delta)
    pub fn delta(self) -> (isize, isize) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }

    /// Action whose delta equals the given displacement, if any
    pub fn from_delta(delta: (isize, isize)) -> Option<Action> {
        Self::ALL.into_iter().find(|action| action.delta() == delta)
    }

    /// Uniformly random action
    pub fn random<R: Rng>(rng: &mut R) -> Action {
        Self::ALL[rng.random_range(0..Self::COUNT)]
    }

    /// Uniformly random action other than `self`; models actuator noise
    pub fn random_other<R: Rng>(self, rng: &mut R) -> Action {
        let offset = rng.random_range(1..Self::COUNT);
        Self::ALL[(self.index() + offset) % Self::COUNT]
    }

    /// Single-letter symbol exchanged with game drivers
    pub fn symbol(self) -> char {
        match self {
            Action::Up => 'U',
            Action::Down => 'D',
            Action::Left => 'L',
            Action::Right => 'R',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Action {
    type Err = Error;

    /// Parse a driver symbol. Anything outside `U`, `D`, `L`, `R` is a
    /// driver bug and is reported rather than mapped to a default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "U" => Ok(Action::Up),
            "D" => Ok(Action::Down),
            "L" => Ok(Action::Left),
            "R" => Ok(Action::Right),
            other => Err(Error::InvalidAction {
                symbol: other.to_string(),
            }),
        }
    }
}
