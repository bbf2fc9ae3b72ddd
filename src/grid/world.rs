//! Episode simulator: transitions, raw rewards and encounter resolution

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    action::Action,
    board::{Adversary, Board, ItemSet, Locations},
};

/// Penalty added by the caller when the agent is caught
pub const CAUGHT_PENALTY: f64 = -10.0;

/// Bonus added by the caller when the last item is collected
pub const CLEARED_BONUS: f64 = 10.0;

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// An encounter was fatal
    Caught { by: Option<Adversary> },
    /// No items remain
    Cleared,
}

impl Termination {
    /// Adjustment the caller adds to the raw reward of the terminal step
    pub fn terminal_bonus(self) -> f64 {
        match self {
            Termination::Caught { .. } => CAUGHT_PENALTY,
            Termination::Cleared => CLEARED_BONUS,
        }
    }
}

/// Result of one [`GridWorld::step`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// 1 when an item was collected, 0 otherwise
    pub reward: f64,
    /// Set when this step ended the episode
    pub termination: Option<Termination>,
}

impl StepResult {
    /// Raw reward plus the terminal adjustment, if any
    pub fn total_reward(&self) -> f64 {
        self.reward + self.termination.map_or(0.0, Termination::terminal_bonus)
    }

    pub fn is_terminal(&self) -> bool {
        self.termination.is_some()
    }
}

/// Mutable state of the running episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeState {
    pub locations: Locations,
    pub items: ItemSet,
    pub terminated: bool,
    pub termination: Option<Termination>,
}

impl EpisodeState {
    fn initial(board: &Board) -> Self {
        Self {
            locations: *board.initial_locations(),
            items: board.initial_items().clone(),
            terminated: false,
            termination: None,
        }
    }
}

/// Stochastic grid world for one board
#[derive(Debug, Clone)]
pub struct GridWorld {
    board: Board,
    state: EpisodeState,
}

impl GridWorld {
    /// Create a simulator positioned at the board's initial configuration
    pub fn new(board: Board) -> Self {
        let state = EpisodeState::initial(&board);
        Self { board, state }
    }

    /// Restore the initial configuration
    pub fn reset(&mut self) {
        self.state = EpisodeState::initial(&self.board);
    }

    /// Apply one move and return the raw reward.
    ///
    /// Moving off the board leaves the agent in place. Entering a cell held
    /// by a present adversary is survived with probability
    /// [`Adversary::survival_probability`]; a survived encounter removes the
    /// adversary for the rest of the episode. Stepping a terminated episode
    /// changes nothing.
    pub fn step<R: Rng>(&mut self, action: Action, rng: &mut R) -> StepResult {
        if self.state.terminated {
            return StepResult {
                reward: 0.0,
                termination: None,
            };
        }

        let mut reward = 0.0;
        if let Some(next) = self.board.neighbor(self.state.locations.agent, action) {
            if let Some(adversary) = self.state.locations.adversary_at(next) {
                if rng.random::<f64>() < adversary.survival_probability() {
                    self.state.locations.remove_adversary(adversary);
                } else {
                    return self.terminate(
                        0.0,
                        Termination::Caught {
                            by: Some(adversary),
                        },
                    );
                }
            }

            self.state.locations.agent = next;
            if self.state.items.remove(&next) {
                reward = 1.0;
            }
        }

        if self.state.items.is_empty() {
            return self.terminate(reward, Termination::Cleared);
        }

        StepResult {
            reward,
            termination: None,
        }
    }

    fn terminate(&mut self, reward: f64, termination: Termination) -> StepResult {
        self.state.terminated = true;
        self.state.termination = Some(termination);
        StepResult {
            reward,
            termination: Some(termination),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> &EpisodeState {
        &self.state
    }

    pub fn locations(&self) -> &Locations {
        &self.state.locations
    }

    pub fn items(&self) -> &ItemSet {
        &self.state.items
    }

    pub fn is_terminated(&self) -> bool {
        self.state.terminated
    }

    pub fn termination(&self) -> Option<Termination> {
        self.state.termination
    }
}
