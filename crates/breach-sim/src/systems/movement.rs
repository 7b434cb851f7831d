//! Goal refresh and waypoint-following movement.
//!
//! Goals come from applied strategies or the tactics collaborator; the
//! path toward a goal is recomputed only when the goal actually moves.
//! An agent with no waypoints and no new goal stays put with zero
//! velocity.

use std::collections::HashMap;

use glam::DVec2;
use hecs::World;

use breach_core::components::*;
use breach_core::constants::{DT, MOVE_SPEED, WAYPOINT_REACH_RADIUS};
use breach_core::enums::BombState;
use breach_core::map::MapDef;
use breach_core::types::{AgentId, Position, Velocity};

use breach_nav::{find_path, NavigationGraph, VisibilityIndex};

use crate::providers::{GoalQuery, TacticsProvider};

/// Goal movement below this distance does not trigger a repath.
const GOAL_EPSILON: f64 = 10.0;

/// Ask the tactics layer where each living agent wants to be, and
/// repath when the answer changed. Applied strategy goals win over the
/// provider; a provider returning `None` keeps the last goal.
#[allow(clippy::too_many_arguments)]
pub fn refresh_goals(
    world: &mut World,
    map: &MapDef,
    graph: &NavigationGraph,
    index: &VisibilityIndex,
    tactics: &mut dyn TacticsProvider,
    strategy_goals: &HashMap<AgentId, Position>,
    bomb: &BombState,
    acting: Option<AgentId>,
) {
    struct Pending {
        entity: hecs::Entity,
        position: Position,
        goal: Position,
    }

    let mut pending = Vec::new();
    for (entity, (agent, tag, health, position, movement, contacts)) in world
        .query::<(
            &Agent,
            &SideTag,
            &Health,
            &Position,
            &Movement,
            &KnownContacts,
        )>()
        .iter()
    {
        if !health.alive || acting == Some(agent.id) {
            continue;
        }

        let has_bomb = matches!(bomb, BombState::Carried { carrier } if *carrier == agent.id);
        let desired = strategy_goals.get(&agent.id).copied().or_else(|| {
            tactics.desired_goal(&GoalQuery {
                id: agent.id,
                side: tag.0,
                position: *position,
                has_bomb,
                map,
                bomb,
                contacts,
                graph,
                vis: index,
            })
        });

        // No answer: the agent keeps its last goal and path.
        let Some(goal) = desired else { continue };
        let unchanged = movement
            .goal
            .map(|g| g.distance_to(&goal) < GOAL_EPSILON)
            .unwrap_or(false);
        if unchanged {
            continue;
        }

        pending.push(Pending {
            entity,
            position: *position,
            goal,
        });
    }

    for p in pending {
        let path = find_path(graph, Some(index), p.position, p.goal);
        if let Ok(mut movement) = world.get::<&mut Movement>(p.entity) {
            if path.is_empty() {
                // Movement blocked: drop the stale plan, keep the agent idle.
                movement.goal = None;
                movement.waypoints.clear();
            } else {
                movement.goal = Some(p.goal);
                // The first waypoint is the agent's own position.
                movement.waypoints = path.into_iter().skip(1).collect();
            }
        }
    }
}

/// Advance every living agent along its waypoint queue at the fixed
/// movement speed. The acting planter/defuser holds still.
pub fn run(world: &mut World, acting: Option<AgentId>) {
    for (_entity, (agent, health, position, velocity, movement)) in world
        .query_mut::<(&Agent, &Health, &mut Position, &mut Velocity, &mut Movement)>()
    {
        movement.moved_this_tick = false;

        if !health.alive || acting == Some(agent.id) {
            *velocity = Velocity::zero();
            continue;
        }

        let mut budget = MOVE_SPEED * DT;
        let start = *position;

        while budget > 0.0 {
            let Some(&target) = movement.waypoints.front() else {
                break;
            };
            let to_target = DVec2::new(target.x - position.x, target.y - position.y);
            let dist = to_target.length();

            if dist <= budget {
                // Waypoint consumed; spend the leftover on the next one.
                *position = target;
                movement.waypoints.pop_front();
                budget -= dist;
            } else {
                let step = to_target / dist * budget;
                position.x += step.x;
                position.y += step.y;
                budget = 0.0;
            }
        }

        let moved = start.distance_to(position);
        if moved > f64::EPSILON {
            movement.moved_this_tick = true;
            let dir = DVec2::new(position.x - start.x, position.y - start.y) / moved;
            *velocity = Velocity::new(dir.x * MOVE_SPEED, dir.y * MOVE_SPEED);
        } else {
            *velocity = Velocity::zero();
        }

        if movement.waypoints.is_empty() && movement.goal.is_some() {
            // Arrived.
            if movement
                .goal
                .map(|g| g.distance_to(position) <= WAYPOINT_REACH_RADIUS)
                .unwrap_or(false)
            {
                movement.goal = None;
            }
        }
    }
}
