//! Combat resolution for BREACH.
//!
//! Resolves one engagement between two agents as a time-stepped
//! stochastic exchange. Pure functions over plain data — no ECS or
//! navigation dependency, so duels are trivially testable in isolation.

pub use breach_core as core;

pub mod duel;
pub mod model;

pub use duel::{resolve, DuelOutcome, DuelRole, EngagementContext, Fighter, SideContext};
