//! Tabular Q-learning
//!
//! The table stores one expected-return estimate per (cell, action) pair and
//! is updated with the one-step off-policy rule
//!
//! ```text
//! Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
//! ```
//!
//! ## Usage Example
//!
//! ```
//! use ghostgrid::{
//!     grid::{Action, Coord},
//!     q_learning::QTable,
//! };
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let mut table = QTable::new(5, 6, 0.05, 0.9);
//! let start = Coord::new(4, 0);
//! table.update(start, Action::Up, Coord::new(3, 0), 1.0);
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! assert_eq!(table.best_action(start, &mut rng), Action::Up);
//! ```

pub mod q_table;

pub use q_table::QTable;
