//! Round controller for BREACH.
//!
//! Owns the hecs ECS world, runs the per-tick systems at a fixed tick
//! rate, sequences round phases and the objective state machine, and
//! produces `MatchSnapshot`s. Completely headless, enabling
//! deterministic testing.

pub use breach_core as core;

pub mod comms;
pub mod engine;
pub mod providers;
pub mod round;
pub mod systems;
pub mod world_setup;

pub use engine::{MatchEngine, SimConfig};

#[cfg(test)]
mod tests;
