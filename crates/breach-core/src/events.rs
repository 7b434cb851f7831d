//! Events appended to the match log and surfaced in snapshots.

use serde::{Deserialize, Serialize};

use crate::enums::{MatchPhase, Side, TeamId, WeaponKind, WinReason};
use crate::types::{AgentId, Position, ZoneId};

/// One entry in the append-only match event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MatchEvent {
    PhaseChanged {
        phase: MatchPhase,
    },
    RoundStarted {
        round: u8,
    },
    Kill {
        killer: AgentId,
        victim: AgentId,
        weapon: WeaponKind,
        headshot: bool,
    },
    WeaponDropped {
        agent: AgentId,
        weapon: WeaponKind,
        position: Position,
    },
    BombDropped {
        position: Position,
    },
    BombPickedUp {
        agent: AgentId,
    },
    PlantStarted {
        agent: AgentId,
        site: ZoneId,
    },
    PlantAborted {
        agent: AgentId,
    },
    BombPlanted {
        site: ZoneId,
    },
    DefuseStarted {
        agent: AgentId,
    },
    DefuseAborted {
        agent: AgentId,
    },
    BombDefused {
        agent: AgentId,
    },
    BombDetonated {
        site: ZoneId,
    },
    RoundEnded {
        winner: TeamId,
        side: Side,
        reason: WinReason,
        end_tick: u64,
    },
    SidesSwapped,
    OvertimeStarted {
        win_threshold: u8,
    },
    MatchEnded {
        winner: TeamId,
    },
}
