//! Policy port - what a game driver asks of an agent each turn

use crate::{
    Result,
    grid::{Action, ItemSet, Locations},
};

/// Decision-time interface consumed by game drivers
///
/// The driver owns the live board. Each turn it hands the policy a copy of
/// the current entity locations and remaining items and applies the
/// returned action itself, including any actuator noise.
///
/// # Errors
///
/// Implementations report inputs that break the driver contract (for
/// example an agent position outside the board) instead of guessing a move.
pub trait Policy: Send {
    /// Pick the next move for the current position.
    fn choose_next_move(&mut self, locations: &Locations, items: &ItemSet) -> Result<Action>;

    /// Name used in reports.
    fn name(&self) -> &str;
}
