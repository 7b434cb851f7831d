//! Per-tick systems over the simulation world.
//!
//! Systems are free functions that take `&mut World` (or `&World` for
//! read-only work). They do not own state — persistent state lives on
//! the engine, round-scoped state on components.

pub mod combat;
pub mod movement;
pub mod noise;
pub mod objective;
pub mod snapshot;
pub mod spotting;
pub mod win;
