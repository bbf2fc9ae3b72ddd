//! Baseline policies for comparison

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    Result,
    grid::{Action, ItemSet, Locations},
    ports::Policy,
};

/// Random policy - picks uniformly among the four moves
pub struct RandomPolicy {
    name: String,
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl Policy for RandomPolicy {
    fn choose_next_move(&mut self, _locations: &Locations, _items: &ItemSet) -> Result<Action> {
        Ok(Action::random(&mut self.rng))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
