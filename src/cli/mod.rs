//! CLI infrastructure for the grid-world controller
//!
//! This module provides the command-line interface for training a
//! controller on a board and evaluating it with the game driver loop.

pub mod commands;
pub mod output;
