//! Ports (trait boundaries) between the learning core and its drivers.
//!
//! The controller implements [`Policy`] for game drivers and reports its
//! training run to any number of [`TrainingObserver`]s.

pub mod observer;
pub mod policy;

pub use observer::TrainingObserver;
pub use policy::Policy;
