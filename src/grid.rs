//! Grid world: board layout, action set and episode simulator

pub mod action;
pub mod board;
pub mod world;

pub use action::Action;
pub use board::{Adversary, Board, Cell, Coord, Entity, ItemSet, Locations};
pub use world::{CAUGHT_PENALTY, CLEARED_BONUS, EpisodeState, GridWorld, StepResult, Termination};
