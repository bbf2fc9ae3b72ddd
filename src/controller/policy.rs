//! Decision-time policy: greedy move, local reward estimate, one more update

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Controller;
use crate::{
    Result,
    grid::{Action, CAUGHT_PENALTY, CLEARED_BONUS, Coord, ItemSet, Locations},
    ports::Policy,
};

/// Running estimate of how often a requested move executes as intended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FidelityEstimate {
    value: f64,
    observations: u64,
    fallback: f64,
}

impl FidelityEstimate {
    pub fn new(initial: f64) -> Self {
        Self {
            value: initial,
            observations: 0,
            fallback: initial,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn observations(&self) -> u64 {
        self.observations
    }

    /// Fold one observation into the running mean.
    ///
    /// An estimate of exactly zero could never recover, so it is replaced by
    /// the initial value.
    pub fn observe(&mut self, as_intended: bool) {
        self.observations += 1;
        let n = self.observations as f64;
        let outcome = if as_intended { 1.0 } else { 0.0 };
        self.value = (self.value * (n - 1.0) + outcome) / n;

        if self.value == 0.0 {
            warn!(
                observations = self.observations,
                fallback = self.fallback,
                "fidelity estimate collapsed to zero, restoring initial value"
            );
            self.value = self.fallback;
        }
    }
}

/// The move requested on the previous turn and where it was requested from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct PreviousMove {
    pub action: Action,
    pub from: Coord,
}

impl Controller {
    /// Choose the next move from externally supplied positions and items.
    ///
    /// Uses last turn's request and this turn's agent position to refine the
    /// fidelity estimate, picks the greedy action, estimates its reward
    /// locally and applies one Q update with it. The simulator is not
    /// consulted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`](crate::Error::OutOfBounds) if the agent
    /// is not on the board.
    pub fn choose_next_move(&mut self, locations: &Locations, items: &ItemSet) -> Result<Action> {
        debug_assert_eq!(self.phase, super::Phase::Ready);
        let position = locations.agent;
        self.board.check_bounds(position)?;

        if let Some(previous) = self.previous {
            let displacement = position.displacement_from(previous.from);
            if displacement == previous.action.delta() {
                self.fidelity.observe(true);
            } else if Action::from_delta(displacement).is_some() {
                self.fidelity.observe(false);
            }
        }

        let action = self.q_table.best_action(position, &mut self.rng);
        let reward = self.estimate_reward(locations, items, action);
        let next = self.board.neighbor(position, action).unwrap_or(position);
        self.q_table.update(position, action, next, reward);

        self.previous = Some(PreviousMove {
            action,
            from: position,
        });

        debug!(
            %position,
            %action,
            reward,
            fidelity = self.fidelity.value(),
            "chose move"
        );
        Ok(action)
    }

    /// Expected reward of requesting `chosen` from the agent's cell.
    ///
    /// Every direction contributes the estimated reward of its target cell,
    /// weighted by the fidelity estimate for `chosen` and by its complement
    /// for each of the other three.
    pub fn estimate_reward(&self, locations: &Locations, items: &ItemSet, chosen: Action) -> f64 {
        let fidelity = self.fidelity.value();
        Action::ALL
            .into_iter()
            .map(|candidate| {
                let weight = if candidate == chosen {
                    fidelity
                } else {
                    1.0 - fidelity
                };
                locations
                    .agent
                    .offset(candidate)
                    .map_or(0.0, |target| self.cell_reward(target, locations, items, weight))
            })
            .sum()
    }

    fn cell_reward(&self, target: Coord, locations: &Locations, items: &ItemSet, weight: f64) -> f64 {
        let survivals: Vec<f64> = locations
            .adversaries_at(target)
            .map(|adversary| self.opponents.survival_estimate(adversary))
            .collect();

        let payoff = if !items.contains(&target) {
            0.0
        } else if items.len() == 1 {
            1.0 + CLEARED_BONUS
        } else {
            1.0
        };

        if survivals.is_empty() {
            return weight * payoff;
        }
        survivals
            .into_iter()
            .map(|survival| weight * (payoff * survival + CAUGHT_PENALTY * (1.0 - survival)))
            .sum()
    }
}

impl Policy for Controller {
    fn choose_next_move(&mut self, locations: &Locations, items: &ItemSet) -> Result<Action> {
        Controller::choose_next_move(self, locations, items)
    }

    fn name(&self) -> &str {
        "Q-Learning"
    }
}
