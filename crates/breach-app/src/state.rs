//! Commands accepted by the match-loop thread.

use breach_core::commands::MatchCommand;

/// Control messages for the loop thread. Match commands are forwarded
/// to the engine at the next tick boundary; Shutdown stops the loop
/// cooperatively between ticks.
#[derive(Debug, Clone)]
pub enum LoopCommand {
    Match(MatchCommand),
    Shutdown,
}
