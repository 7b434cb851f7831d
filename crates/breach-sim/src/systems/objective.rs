//! The bomb objective state machine, advanced once per live tick.
//!
//! Plant and defuse progress accrue while the acting agent stands at the
//! device; the acting agent is held in place by the movement system and
//! aborts are driven by death processing in the combat system. A safety
//! ceiling forces detonation if the plant clock ever drifts past the
//! nominal blow time.

use hecs::World;

use breach_core::components::{Agent, Health, Loadout, SideTag};
use breach_core::constants::*;
use breach_core::enums::{BombState, Side};
use breach_core::events::MatchEvent;
use breach_core::map::MapDef;
use breach_core::types::{AgentId, Position, ZoneId};

/// Ticks to plant, to detonation, and to defuse (with and without kit).
pub const PLANT_TICKS: u32 = (PLANT_TIME_SECS * TICK_RATE as f64) as u32;
pub const BOMB_TICKS: u32 = (BOMB_TIMER_SECS * TICK_RATE as f64) as u32;
pub const DEFUSE_TICKS: u32 = (DEFUSE_TIME_SECS * TICK_RATE as f64) as u32;
pub const KIT_DEFUSE_TICKS: u32 = (KIT_DEFUSE_TIME_SECS * TICK_RATE as f64) as u32;

/// The agent currently locked into a plant or defuse animation.
pub fn acting_agent(bomb: &BombState) -> Option<AgentId> {
    match bomb {
        BombState::Planting { planter, .. } => Some(*planter),
        BombState::Defusing { defuser, .. } => Some(*defuser),
        _ => None,
    }
}

/// Advance the objective by one tick.
pub fn run(
    world: &World,
    map: &MapDef,
    bomb: &mut BombState,
    planted_this_round: &mut bool,
    events: &mut Vec<MatchEvent>,
) {
    match *bomb {
        BombState::Carried { carrier } => {
            match alive_position(world, carrier) {
                Some(position) => {
                    if let Some(site) = site_at(map, &position) {
                        *bomb = BombState::Planting {
                            planter: carrier,
                            site,
                            progress_ticks: 0,
                        };
                        events.push(MatchEvent::PlantStarted {
                            agent: carrier,
                            site,
                        });
                    }
                }
                None => {
                    // Carrier died outside the duel path; the bomb lands
                    // at the body.
                    if let Some(position) = position_of(world, carrier) {
                        *bomb = BombState::Dropped { position };
                        events.push(MatchEvent::BombDropped { position });
                    }
                }
            }
        }

        BombState::Dropped { position } => {
            if let Some(agent) = nearest_eligible(world, &position, Side::Attack) {
                *bomb = BombState::Carried { carrier: agent };
                events.push(MatchEvent::BombPickedUp { agent });
            }
        }

        BombState::Planting {
            planter,
            site,
            progress_ticks,
        } => {
            // Combat normally drops the bomb when the planter dies; this
            // guard catches deaths from outside the duel path.
            if alive_position(world, planter).is_none() {
                let position = position_of(world, planter).unwrap_or_else(|| site_center(map, site));
                events.push(MatchEvent::PlantAborted { agent: planter });
                *bomb = BombState::Dropped { position };
                events.push(MatchEvent::BombDropped { position });
                return;
            }
            let progress = progress_ticks + 1;
            if progress >= PLANT_TICKS {
                let position = alive_position(world, planter)
                    .unwrap_or_else(|| site_center(map, site));
                *bomb = BombState::Planted {
                    site,
                    position,
                    ticks_remaining: BOMB_TICKS,
                    ticks_since_plant: 0,
                };
                *planted_this_round = true;
                events.push(MatchEvent::BombPlanted { site });
            } else {
                *bomb = BombState::Planting {
                    planter,
                    site,
                    progress_ticks: progress,
                };
            }
        }

        BombState::Planted {
            site,
            position,
            ticks_remaining,
            ticks_since_plant,
        } => {
            let remaining = ticks_remaining.saturating_sub(1);
            let since = ticks_since_plant + 1;
            if detonation_due(remaining, since) {
                *bomb = BombState::Detonated;
                events.push(MatchEvent::BombDetonated { site });
                return;
            }

            if let Some(defuser) = nearest_eligible(world, &position, Side::Defense) {
                *bomb = BombState::Defusing {
                    defuser,
                    site,
                    position,
                    progress_ticks: 0,
                    ticks_remaining: remaining,
                    ticks_since_plant: since,
                };
                events.push(MatchEvent::DefuseStarted { agent: defuser });
            } else {
                *bomb = BombState::Planted {
                    site,
                    position,
                    ticks_remaining: remaining,
                    ticks_since_plant: since,
                };
            }
        }

        BombState::Defusing {
            defuser,
            site,
            position,
            progress_ticks,
            ticks_remaining,
            ticks_since_plant,
        } => {
            // The device keeps counting down under the defuser's hands.
            let remaining = ticks_remaining.saturating_sub(1);
            let since = ticks_since_plant + 1;
            if alive_position(world, defuser).is_none() {
                events.push(MatchEvent::DefuseAborted { agent: defuser });
                *bomb = BombState::Planted {
                    site,
                    position,
                    ticks_remaining: remaining,
                    ticks_since_plant: since,
                };
                return;
            }
            if detonation_due(remaining, since) {
                *bomb = BombState::Detonated;
                events.push(MatchEvent::BombDetonated { site });
                return;
            }

            let target = if has_kit(world, defuser) {
                KIT_DEFUSE_TICKS
            } else {
                DEFUSE_TICKS
            };
            let progress = progress_ticks + 1;
            if progress >= target {
                *bomb = BombState::Defused;
                events.push(MatchEvent::BombDefused { agent: defuser });
            } else {
                *bomb = BombState::Defusing {
                    defuser,
                    site,
                    position,
                    progress_ticks: progress,
                    ticks_remaining: remaining,
                    ticks_since_plant: since,
                };
            }
        }

        BombState::Defused | BombState::Detonated => {}
    }
}

/// Nominal expiry, or the safety ceiling when plant bookkeeping drifted.
fn detonation_due(ticks_remaining: u32, ticks_since_plant: u64) -> bool {
    ticks_remaining == 0 || ticks_since_plant > BOMB_TICKS as u64 + DETONATION_SAFETY_TICKS
}

fn alive_position(world: &World, id: AgentId) -> Option<Position> {
    world
        .query::<(&Agent, &Health, &Position)>()
        .iter()
        .find(|(_, (agent, health, _))| agent.id == id && health.alive)
        .map(|(_, (_, _, position))| *position)
}

fn position_of(world: &World, id: AgentId) -> Option<Position> {
    world
        .query::<(&Agent, &Position)>()
        .iter()
        .find(|(_, (agent, _))| agent.id == id)
        .map(|(_, (_, position))| *position)
}

/// The bomb site zone covering a point, if any.
fn site_at(map: &MapDef, position: &Position) -> Option<ZoneId> {
    map.zone_at(position)
        .filter(|&z| map.zones[z as usize].bomb_site)
}

fn site_center(map: &MapDef, site: ZoneId) -> Position {
    map.zones[site as usize].center
}

/// Lowest-id living agent of `side` within pickup/defuse radius.
fn nearest_eligible(world: &World, position: &Position, side: Side) -> Option<AgentId> {
    let mut candidates: Vec<AgentId> = world
        .query::<(&Agent, &SideTag, &Health, &Position)>()
        .iter()
        .filter(|(_, (_, tag, health, pos))| {
            tag.0 == side && health.alive && pos.distance_to(position) <= BOMB_PICKUP_RADIUS
        })
        .map(|(_, (agent, ..))| agent.id)
        .collect();
    candidates.sort();
    candidates.first().copied()
}

fn has_kit(world: &World, id: AgentId) -> bool {
    world
        .query::<(&Agent, &Loadout)>()
        .iter()
        .find(|(_, (agent, _))| agent.id == id)
        .map(|(_, (_, loadout))| loadout.defuse_kit)
        .unwrap_or(false)
}
