//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods beyond small
//! accessors. Game logic lives in systems, not components.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::enums::{Side, TeamId, WeaponKind};
use crate::types::{AgentId, Position};

/// Agent identity: stable id plus team membership.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub team: TeamId,
}

/// Which side the agent's team plays this half. Refreshed every round.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SideTag(pub Side);

/// Hit points and armor. Dead agents keep their entity with `alive` false.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub hp: i32,
    pub alive: bool,
    /// Vest protects chest and stomach.
    pub vest: bool,
    /// Helmet protects the head.
    pub helmet: bool,
}

impl Health {
    pub fn full(vest: bool, helmet: bool) -> Self {
        Self {
            hp: crate::constants::FULL_HEALTH,
            alive: true,
            vest,
            helmet,
        }
    }
}

/// Numeric skill attributes, each normalized to 0..1.
/// Supplied by the roster collaborator; read-only inside the core.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SkillProfile {
    pub reaction: f64,
    pub crosshair: f64,
    pub first_bullet: f64,
    pub composure: f64,
    pub positioning: f64,
    pub aggression: f64,
}

impl SkillProfile {
    /// Uniform profile, useful for tests and default rosters.
    pub fn uniform(level: f64) -> Self {
        let v = level.clamp(0.0, 1.0);
        Self {
            reaction: v,
            crosshair: v,
            first_bullet: v,
            composure: v,
            positioning: v,
            aggression: v,
        }
    }
}

/// Equipment for the current round. Supplied by the buy collaborator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Loadout {
    pub weapon: Option<WeaponKind>,
    pub vest: bool,
    pub helmet: bool,
    pub defuse_kit: bool,
}

/// Current navigation goal and the remaining path toward it.
/// Waypoints are consumed front-to-back as the agent travels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Movement {
    pub goal: Option<Position>,
    pub waypoints: VecDeque<Position>,
    /// Whether the agent covered ground this tick (set by the movement system).
    pub moved_this_tick: bool,
}

/// Transient combat state: timers are absolute tick deadlines.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CombatState {
    /// Flash blindness wears off at this tick.
    pub flashed_until: u64,
    /// No new duels for this agent until this tick.
    pub cooldown_until: u64,
    /// Suppressed (recently shot at) until this tick.
    pub suppressed_until: u64,
}

impl CombatState {
    /// Remaining flash blindness as a 0..1 fraction of the full effect.
    pub fn flash_fraction(&self, tick: u64, full_duration_ticks: u64) -> f64 {
        if full_duration_ticks == 0 || tick >= self.flashed_until {
            return 0.0;
        }
        let remaining = (self.flashed_until - tick) as f64;
        (remaining / full_duration_ticks as f64).clamp(0.0, 1.0)
    }
}

/// A spotted-enemy report delivered to this agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpottedReport {
    pub enemy: AgentId,
    pub position: Position,
    /// Tick the sighting happened (not the delivery tick).
    pub spotted_tick: u64,
}

/// Reports delivered to this agent, newest last. Read by the tactics
/// collaborator; pruned at round start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnownContacts {
    pub reports: Vec<SpottedReport>,
}

/// Marks the agent currently carrying the bomb.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BombCarrier;
