//! Control commands sent to the match engine.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::components::Loadout;
use crate::enums::TeamId;
use crate::types::{AgentId, Position};

/// One team's inputs for the upcoming round: where each agent should go
/// and optionally what each agent carries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamStrategy {
    pub team: TeamId,
    /// Desired destination per agent. Missing agents keep their last goal.
    pub goals: Vec<(AgentId, Position)>,
    /// Loadout overrides applied at the next freeze time.
    pub loadouts: Vec<(AgentId, Loadout)>,
}

/// All control-surface actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MatchCommand {
    /// Leave warmup and start the first round.
    StartMatch,
    /// Freeze the simulation clock.
    Pause,
    /// Resume from pause.
    Resume,
    /// Set the real-time speed multiplier (tick interval = base / multiplier).
    SetTimeScale { scale: f64 },
    /// Skip the RoundEnd pause. Ignored in any other phase.
    ForceNextRound,
    /// Full reinitialization: scores, economy, history, round number.
    ResetMatch,
    /// Atomically set both teams' tactic/buy inputs and release the
    /// pre-round tactics pause.
    ApplyStrategies {
        strategies: [TeamStrategy; 2],
    },
}
