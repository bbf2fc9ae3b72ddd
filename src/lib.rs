//! Grid-world simulator and time-bounded Q-learning controller
//!
//! This crate provides:
//! - A grid world with collectible items and probabilistically lethal adversaries
//! - A tabular Q-learning controller trained against the simulator under a
//!   wall-clock deadline, then queried move by move
//! - Running survival estimates per adversary and an actuator-fidelity estimate
//! - An evaluation pipeline replaying the noisy game driver loop
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use ghostgrid::{Board, Controller, GridWorld};
//!
//! let board: Board = "70,10,11/10,20,10".parse().unwrap();
//! let mut controller = Controller::builder(board.clone())
//!     .episode_steps(20)
//!     .seed(3)
//!     .time_budget(Duration::from_millis(100))
//!     .build()
//!     .unwrap();
//!
//! let world = GridWorld::new(board);
//! let action = controller
//!     .choose_next_move(world.locations(), world.items())
//!     .unwrap();
//! println!("first move: {action}");
//! ```

pub mod cli;
pub mod controller;
pub mod error;
pub mod grid;
pub mod opponent_model;
pub mod pipeline;
pub mod ports;
pub mod q_learning;

pub use controller::{Controller, ControllerConfig};
pub use error::{Error, Result};
pub use grid::{Action, Adversary, Board, Coord, GridWorld, ItemSet, Locations};
pub use opponent_model::OpponentModel;
pub use q_learning::QTable;
