//! Mutual visibility detection between live cross-team pairs, plus
//! spotted-report propagation to teammates over the comms bus.

use std::collections::HashSet;

use hecs::{Entity, World};

use breach_core::components::*;
use breach_core::constants::MAX_VISION_DISTANCE;
use breach_core::enums::Side;
use breach_core::types::{AgentId, Position};

use breach_nav::{NavigationGraph, VisibilityIndex};

use crate::comms::SpottedBus;

/// One mutually visible attacker/defender pair this tick.
#[derive(Debug, Clone, Copy)]
pub struct VisiblePair {
    pub attacker: Entity,
    pub defender: Entity,
    /// The pair had no line of sight on the previous tick.
    pub new_this_tick: bool,
}

/// Detect every mutually visible cross-team pair using the positions as
/// they stand after movement. New sightings publish spotted reports for
/// both sides; due reports are delivered into `KnownContacts`.
pub fn run(
    world: &mut World,
    graph: &NavigationGraph,
    index: &VisibilityIndex,
    prev_visible: &mut HashSet<(Entity, Entity)>,
    bus: &mut SpottedBus,
    tick: u64,
) -> Vec<VisiblePair> {
    struct Seen {
        entity: Entity,
        id: AgentId,
        position: Position,
    }

    let mut attackers = Vec::new();
    let mut defenders = Vec::new();
    for (entity, (agent, tag, health, position)) in world
        .query::<(&Agent, &SideTag, &Health, &Position)>()
        .iter()
    {
        if !health.alive {
            continue;
        }
        let seen = Seen {
            entity,
            id: agent.id,
            position: *position,
        };
        match tag.0 {
            Side::Attack => attackers.push(seen),
            Side::Defense => defenders.push(seen),
        }
    }
    attackers.sort_by_key(|s| s.id);
    defenders.sort_by_key(|s| s.id);

    let mut pairs = Vec::new();
    let mut current: HashSet<(Entity, Entity)> = HashSet::new();
    let mut reports: Vec<(SpottedReport, Vec<AgentId>)> = Vec::new();

    for a in &attackers {
        for d in &defenders {
            if a.position.distance_to(&d.position) > MAX_VISION_DISTANCE {
                continue;
            }
            if !index.check(graph, &a.position, &d.position) {
                continue;
            }

            let key = (a.entity, d.entity);
            let new_this_tick = !prev_visible.contains(&key);
            current.insert(key);
            pairs.push(VisiblePair {
                attacker: a.entity,
                defender: d.entity,
                new_this_tick,
            });

            if new_this_tick {
                // Both sides spot each other; teammates hear about it
                // after their personal comms delay.
                let att_mates: Vec<AgentId> = attackers
                    .iter()
                    .map(|s| s.id)
                    .filter(|&id| id != a.id)
                    .collect();
                let def_mates: Vec<AgentId> = defenders
                    .iter()
                    .map(|s| s.id)
                    .filter(|&id| id != d.id)
                    .collect();
                reports.push((
                    SpottedReport {
                        enemy: d.id,
                        position: d.position,
                        spotted_tick: tick,
                    },
                    att_mates,
                ));
                reports.push((
                    SpottedReport {
                        enemy: a.id,
                        position: a.position,
                        spotted_tick: tick,
                    },
                    def_mates,
                ));
            }
        }
    }

    for (report, listeners) in reports {
        bus.publish(report, &listeners, tick);
    }

    for (recipient, report) in bus.deliver(tick) {
        for (_entity, (agent, health, contacts)) in
            world.query_mut::<(&Agent, &Health, &mut KnownContacts)>()
        {
            if agent.id == recipient && health.alive {
                contacts.reports.push(report);
            }
        }
    }

    *prev_visible = current;
    pairs
}
