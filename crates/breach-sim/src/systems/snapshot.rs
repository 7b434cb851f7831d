//! Snapshot system: queries the ECS world and builds a complete
//! MatchSnapshot. Read-only — it never modifies the world.

use hecs::World;

use breach_core::components::*;
use breach_core::constants::{DT, FLASH_DURATION_TICKS};
use breach_core::enums::{BombState, MatchPhase};
use breach_core::events::MatchEvent;
use breach_core::map::MapDef;
use breach_core::state::*;
use breach_core::types::{Position, SimTime, Velocity, ZoneId};

use crate::round::{RoundState, TeamState};
use crate::systems::noise::NoiseField;

/// Build a complete snapshot of the current match state.
#[allow(clippy::too_many_arguments)]
pub fn build_snapshot(
    world: &World,
    map: &MapDef,
    time: &SimTime,
    phase: MatchPhase,
    phase_ticks_remaining: u64,
    round: &RoundState,
    teams: &[TeamState; 2],
    noise: &NoiseField,
    events: Vec<MatchEvent>,
) -> MatchSnapshot {
    MatchSnapshot {
        time: *time,
        phase,
        phase_remaining_secs: phase_ticks_remaining as f64 * DT,
        round: round.number,
        win_threshold: round.win_threshold,
        bomb: (phase != MatchPhase::Warmup).then_some(round.bomb),
        teams: teams
            .iter()
            .map(|t| TeamView {
                team: t.team,
                side: t.side,
                score: t.score,
                money: t.money,
                loss_bonus_level: t.loss_bonus,
            })
            .collect(),
        agents: build_agents(world, &round.bomb, time.tick),
        zone_noise: build_noise(map, noise),
        events,
        history: round.history.clone(),
    }
}

fn build_agents(world: &World, bomb: &BombState, tick: u64) -> Vec<AgentView> {
    let carrier = match bomb {
        BombState::Carried { carrier } => Some(*carrier),
        BombState::Planting { planter, .. } => Some(*planter),
        _ => None,
    };

    let mut agents: Vec<AgentView> = world
        .query::<(
            &Agent,
            &SideTag,
            &Health,
            &Position,
            &Velocity,
            &Loadout,
            &CombatState,
        )>()
        .iter()
        .map(
            |(_, (agent, tag, health, position, velocity, loadout, combat))| AgentView {
                id: agent.id,
                team: agent.team,
                side: tag.0,
                position: *position,
                speed: velocity.speed(),
                hp: health.hp,
                alive: health.alive,
                weapon: loadout.weapon,
                flash_fraction: combat.flash_fraction(tick, FLASH_DURATION_TICKS),
                has_bomb: carrier == Some(agent.id),
            },
        )
        .collect();

    agents.sort_by_key(|a| a.id);
    agents
}

fn build_noise(map: &MapDef, noise: &NoiseField) -> Vec<ZoneNoiseView> {
    map.zones
        .iter()
        .enumerate()
        .map(|(i, _)| ZoneNoiseView {
            zone: i as ZoneId,
            noise: noise.level(i as ZoneId),
        })
        .collect()
}
