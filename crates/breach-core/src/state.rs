//! Match state snapshot — the complete visible state emitted each tick.

use serde::{Deserialize, Serialize};

use crate::enums::{BombState, MatchPhase, Side, TeamId, WeaponKind, WinReason};
use crate::events::MatchEvent;
use crate::types::{AgentId, Position, SimTime, ZoneId};

/// Complete match state broadcast to collaborators after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub time: SimTime,
    pub phase: MatchPhase,
    /// Seconds left on the current phase clock.
    pub phase_remaining_secs: f64,
    /// 1-based round number.
    pub round: u8,
    pub win_threshold: u8,
    pub bomb: Option<BombState>,
    pub teams: Vec<TeamView>,
    pub agents: Vec<AgentView>,
    pub zone_noise: Vec<ZoneNoiseView>,
    /// Events emitted during this tick, in order.
    pub events: Vec<MatchEvent>,
    /// Completed rounds, oldest first.
    pub history: Vec<RoundRecord>,
}

/// One team's score and economy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamView {
    pub team: TeamId,
    pub side: Side,
    pub score: u8,
    pub money: u32,
    pub loss_bonus_level: u8,
}

/// One agent's visible state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentView {
    pub id: AgentId,
    pub team: TeamId,
    pub side: Side,
    pub position: Position,
    pub speed: f64,
    pub hp: i32,
    pub alive: bool,
    pub weapon: Option<WeaponKind>,
    pub flash_fraction: f64,
    pub has_bomb: bool,
}

/// Ambient noise level for one zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneNoiseView {
    pub zone: ZoneId,
    pub noise: f64,
}

/// One completed round in the match history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u8,
    pub winner: TeamId,
    pub winning_side: Side,
    pub reason: WinReason,
    pub end_tick: u64,
}

/// Round-end economy outcome for the buy-logic collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoundResult {
    pub record: RoundRecord,
    /// Money granted to each team this round end (winner, loser order
    /// follows `record.winner`).
    pub winner_delta: u32,
    pub loser_delta: u32,
}
