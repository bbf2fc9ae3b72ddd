//! Q-table implementation for temporal difference learning

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::{Action, Coord};

/// Q-table mapping (cell, action) pairs to Q-values
///
/// Dense storage: one row of four values per board cell, all starting at
/// zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QTable {
    /// Q-values indexed by `row * cols + col`, then by action index
    q_values: Vec<[f64; Action::COUNT]>,
    rows: usize,
    cols: usize,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
}

impl QTable {
    /// Create a zeroed Q-table for a `rows x cols` board
    pub fn new(rows: usize, cols: usize, learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            q_values: vec![[0.0; Action::COUNT]; rows * cols],
            rows,
            cols,
            learning_rate,
            discount_factor,
        }
    }

    fn index(&self, state: Coord) -> Option<usize> {
        (state.row < self.rows && state.col < self.cols).then(|| state.row * self.cols + state.col)
    }

    /// Get Q-value for a state-action pair; off-board states read as zero
    pub fn get(&self, state: Coord, action: Action) -> f64 {
        self.index(state)
            .map_or(0.0, |index| self.q_values[index][action.index()])
    }

    /// All four Q-values at a state, in canonical action order
    pub fn values(&self, state: Coord) -> [f64; Action::COUNT] {
        self.index(state)
            .map_or([0.0; Action::COUNT], |index| self.q_values[index])
    }

    /// Maximum Q-value over all actions at a state
    pub fn max_value(&self, state: Coord) -> f64 {
        self.values(state)
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// This is the only way values change. Updates for an off-board `state`
    /// are dropped.
    pub fn update(&mut self, state: Coord, action: Action, next_state: Coord, reward: f64) {
        let Some(index) = self.index(state) else {
            debug!(%state, %action, "dropping Q update for off-board state");
            return;
        };

        let max_next_q = self.max_value(next_state);
        let current_q = self.q_values[index][action.index()];
        let td_target = reward + self.discount_factor * max_next_q;
        let td_error = td_target - current_q;
        self.q_values[index][action.index()] = current_q + self.learning_rate * td_error;
    }

    /// Greedy action at `state`.
    ///
    /// Actions are scanned in canonical order. A strictly larger value always
    /// takes over; an exactly equal value takes over with probability 1/2.
    pub fn best_action<R: Rng>(&self, state: Coord, rng: &mut R) -> Action {
        let values = self.values(state);
        let mut best = Action::ALL[0];
        let mut best_value = values[0];

        for action in Action::ALL.into_iter().skip(1) {
            let value = values[action.index()];
            if value > best_value || (value == best_value && rng.random::<f64>() > 0.5) {
                best = action;
                best_value = value;
            }
        }

        best
    }

    /// Uniformly random action, for exploration
    pub fn random_action<R: Rng>(&self, rng: &mut R) -> Action {
        Action::random(rng)
    }

    /// Uniformly random action other than `action`, for actuator noise
    pub fn random_other_action<R: Rng>(&self, action: Action, rng: &mut R) -> Action {
        action.random_other(rng)
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    /// Number of (state, action) entries with a non-zero value
    pub fn visited(&self) -> usize {
        self.q_values
            .iter()
            .flatten()
            .filter(|value| **value != 0.0)
            .count()
    }

    /// Total number of Q-values stored
    pub fn size(&self) -> usize {
        self.q_values.len() * Action::COUNT
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn table() -> QTable {
        QTable::new(3, 3, 0.05, 0.9)
    }

    #[test]
    fn test_qtable_initialization() {
        let qtable = table();
        assert_eq!(qtable.size(), 36);
        assert_eq!(qtable.visited(), 0);
        for action in Action::ALL {
            assert_eq!(qtable.get(Coord::new(1, 1), action), 0.0);
        }
    }

    #[test]
    fn test_q_learning_update() {
        let mut qtable = QTable::new(3, 3, 0.5, 0.99);
        let state = Coord::new(0, 0);
        let next_state = Coord::new(0, 1);

        // Give the next state a value of 2 on one action
        for _ in 0..60 {
            qtable.update(next_state, Action::Down, Coord::new(2, 2), 2.0);
        }
        let max_next = qtable.max_value(next_state);
        assert!((max_next - 2.0).abs() < 1e-6);

        qtable.update(state, Action::Right, next_state, 0.0);

        // Q(s,R) = 0.0 + 0.5 * (0.0 + 0.99 * 2.0 - 0.0) = 0.99
        let updated_q = qtable.get(state, Action::Right);
        assert!((updated_q - 0.99).abs() < 0.01);
    }

    #[test]
    fn test_repeated_updates_converge_monotonically() {
        let mut qtable = table();
        let state = Coord::new(1, 1);
        let reward = 1.0;
        let fixed_point = reward / (1.0 - 0.9);

        // Self-loop: the next-state max is the entry itself once it leads
        let mut previous = qtable.get(state, Action::Up);
        for _ in 0..2000 {
            qtable.update(state, Action::Up, state, reward);
            let current = qtable.get(state, Action::Up);
            assert!(current >= previous);
            assert!(current <= fixed_point + 1e-9);
            previous = current;
        }
        assert!((previous - fixed_point).abs() < 0.5);
    }

    #[test]
    fn test_negative_reward_converges_from_above() {
        let mut qtable = table();
        let state = Coord::new(0, 0);
        let terminal = Coord::new(2, 2);

        let mut previous = 0.0;
        for _ in 0..500 {
            qtable.update(state, Action::Left, terminal, -10.0);
            let current = qtable.get(state, Action::Left);
            assert!(current <= previous);
            assert!(current >= -10.0);
            previous = current;
        }
        assert!((previous + 10.0).abs() < 0.01);
    }

    #[test]
    fn test_off_board_update_is_dropped() {
        let mut qtable = table();
        qtable.update(Coord::new(5, 5), Action::Up, Coord::new(0, 0), 3.0);
        assert_eq!(qtable.visited(), 0);
        assert_eq!(qtable.get(Coord::new(5, 5), Action::Up), 0.0);
    }

    #[test]
    fn test_best_action_prefers_strict_maximum() {
        let mut qtable = table();
        let state = Coord::new(1, 1);
        qtable.update(state, Action::Left, state, 1.0);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            assert_eq!(qtable.best_action(state, &mut rng), Action::Left);
        }
    }

    #[test]
    fn test_best_action_breaks_ties_randomly() {
        let qtable = table();
        let mut rng = StdRng::seed_from_u64(9);
        let mut seen = [0usize; Action::COUNT];
        for _ in 0..2000 {
            seen[qtable.best_action(Coord::new(0, 0), &mut rng).index()] += 1;
        }
        // Every action can win a four-way tie; the last one scanned most often.
        assert!(seen.iter().all(|&count| count > 0));
        assert!(seen[3] > seen[0]);
    }

    #[test]
    fn test_random_action_covers_all() {
        let qtable = table();
        let mut rng = StdRng::seed_from_u64(12);
        let mut seen = [false; Action::COUNT];
        for _ in 0..200 {
            seen[qtable.random_action(&mut rng).index()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
