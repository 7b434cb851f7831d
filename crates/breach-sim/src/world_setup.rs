//! Agent spawn factories: build the round's entity population from the
//! roster, the current side assignment, and the buy collaborator.

use std::collections::HashMap;

use hecs::World;

use breach_core::components::*;
use breach_core::enums::Side;
use breach_core::map::MapDef;
use breach_core::types::{AgentId, Position, Velocity};

use crate::providers::{AgentSpec, LoadoutProvider};
use crate::round::TeamState;

/// Despawn every agent entity and respawn the full roster at their
/// side's spawn points with fresh round state.
pub fn respawn_agents(
    world: &mut World,
    map: &MapDef,
    rosters: &[AgentSpec],
    teams: &[TeamState; 2],
    loadouts: &mut dyn LoadoutProvider,
    overrides: &HashMap<AgentId, Loadout>,
    round: u8,
) {
    let stale: Vec<hecs::Entity> = world.iter().map(|e| e.entity()).collect();
    for entity in stale {
        let _ = world.despawn(entity);
    }

    let mut spawn_cursor: HashMap<Side, usize> = HashMap::new();
    for spec in rosters {
        let team = &teams[spec.team as usize];
        let side = team.side;

        let spawns = map.spawns(side);
        let cursor = spawn_cursor.entry(side).or_insert(0);
        let position = spawns[*cursor % spawns.len()];
        *cursor += 1;

        let loadout = overrides
            .get(&spec.id)
            .copied()
            .unwrap_or_else(|| loadouts.loadout_for(spec, team.money, round));

        world.spawn((
            Agent {
                id: spec.id,
                team: spec.team,
            },
            SideTag(side),
            position,
            Velocity::zero(),
            Health::full(loadout.vest, loadout.helmet),
            spec.skills,
            loadout,
            Movement::default(),
            CombatState::default(),
            KnownContacts::default(),
        ));
    }
}

/// Entity handle for an agent id.
pub fn agent_entity(world: &World, id: AgentId) -> Option<hecs::Entity> {
    world
        .query::<&Agent>()
        .iter()
        .find(|(_, a)| a.id == id)
        .map(|(e, _)| e)
}

/// Ids of all living agents on a side, ascending.
pub fn alive_on_side(world: &World, side: Side) -> Vec<AgentId> {
    let mut ids: Vec<AgentId> = world
        .query::<(&Agent, &SideTag, &Health)>()
        .iter()
        .filter(|(_, (_, tag, health))| tag.0 == side && health.alive)
        .map(|(_, (agent, _, _))| agent.id)
        .collect();
    ids.sort();
    ids
}

/// Position of an agent, if it exists.
pub fn agent_position(world: &World, id: AgentId) -> Option<Position> {
    let entity = agent_entity(world, id)?;
    world.get::<&Position>(entity).ok().map(|p| *p)
}
