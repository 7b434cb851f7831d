//! Headless runner for BREACH.
//!
//! Drives the match engine on its own thread at the fixed tick rate
//! with a real-time speed multiplier, and shares the latest snapshot
//! for synchronous polling.

pub mod game_loop;
pub mod state;

pub use game_loop::spawn_match_loop;
pub use state::LoopCommand;
