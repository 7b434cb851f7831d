//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

use crate::types::{AgentId, Position, ZoneId};

/// Which objective role a team currently plays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Carries the bomb and attacks the sites.
    #[default]
    Attack,
    /// Holds the sites and defuses.
    Defense,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Attack => Side::Defense,
            Side::Defense => Side::Attack,
        }
    }
}

/// Persistent team identity. Sides swap at halftime; team identity does not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamId {
    #[default]
    Alpha,
    Bravo,
}

impl TeamId {
    pub fn opponent(self) -> TeamId {
        match self {
            TeamId::Alpha => TeamId::Bravo,
            TeamId::Bravo => TeamId::Alpha,
        }
    }
}

/// Match phase (top-level state machine).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Idle until a StartMatch command arrives.
    #[default]
    Warmup,
    /// Pre-round countdown; agents are frozen in spawn.
    FreezeTime,
    /// Waiting for both teams' strategies before going live.
    TacticsPause,
    /// Round in progress.
    Live,
    /// Round decided; post-round pause before the next freeze time.
    RoundEnd,
    /// Match decided.
    MatchEnd,
}

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinReason {
    /// The bomb detonated.
    Detonation,
    /// The bomb was defused.
    Defusal,
    /// Every defender was eliminated before a plant.
    DefendersEliminated,
    /// Every attacker was eliminated.
    AttackersEliminated,
    /// The round clock expired without a plant.
    TimeExpired,
}

/// Bomb lifecycle. Tagged states carry the data that is only meaningful
/// in that state; transitions are handled by the objective system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BombState {
    /// Held by an attacker.
    Carried { carrier: AgentId },
    /// On the ground, pickup-eligible for any attacker in radius.
    Dropped { position: Position },
    /// Plant in progress; aborts back to Carried.
    Planting {
        planter: AgentId,
        site: ZoneId,
        progress_ticks: u32,
    },
    /// Armed at a site, counting down.
    Planted {
        site: ZoneId,
        position: Position,
        ticks_remaining: u32,
        /// Ticks since the plant completed, for the detonation safety ceiling.
        ticks_since_plant: u64,
    },
    /// Defuse in progress; aborts back to Planted.
    Defusing {
        defuser: AgentId,
        site: ZoneId,
        position: Position,
        progress_ticks: u32,
        ticks_remaining: u32,
        ticks_since_plant: u64,
    },
    Defused,
    Detonated,
}

impl BombState {
    /// The bomb counts as planted in Planted and Defusing states.
    pub fn is_planted(&self) -> bool {
        matches!(self, BombState::Planted { .. } | BombState::Defusing { .. })
    }

    /// Terminal bomb states.
    pub fn is_resolved(&self) -> bool {
        matches!(self, BombState::Defused | BombState::Detonated)
    }
}

/// How an attacker enters an engagement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeekStyle {
    /// Holding an angle, not moving.
    #[default]
    Hold,
    /// Quick partial exposure.
    Jiggle,
    /// Slow wide angle take.
    Wide,
    /// Committed fast entry.
    Swing,
}

/// Body location struck by a bullet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitLocation {
    Head,
    Chest,
    Stomach,
    Legs,
}

/// Weapon catalogue. Stats live in `weapons::weapon_stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Pistol,
    HeavyPistol,
    Smg,
    Shotgun,
    Rifle,
    BurstRifle,
    Lmg,
    Sniper,
}
