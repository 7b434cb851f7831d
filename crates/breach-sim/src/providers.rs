//! Collaborator interfaces: tactics (where to go) and buy logic (what to
//! carry). The core paths toward a point and equips what it is told; the
//! reasoning behind either lives outside.

use breach_core::components::{KnownContacts, Loadout, SkillProfile};
use breach_core::enums::{BombState, Side, TeamId, WeaponKind};
use breach_core::map::MapDef;
use breach_core::types::{AgentId, Position};

use breach_nav::{path_distance, NavigationGraph, VisibilityIndex};

/// Static per-agent profile supplied by the roster collaborator.
#[derive(Debug, Clone)]
pub struct AgentSpec {
    pub id: AgentId,
    pub team: TeamId,
    pub skills: SkillProfile,
}

/// Everything a tactics provider may look at when choosing a goal.
pub struct GoalQuery<'a> {
    pub id: AgentId,
    pub side: Side,
    pub position: Position,
    pub has_bomb: bool,
    pub map: &'a MapDef,
    pub bomb: &'a BombState,
    pub contacts: &'a KnownContacts,
    pub graph: &'a NavigationGraph,
    pub vis: &'a VisibilityIndex,
}

/// Supplies each agent's desired destination, once per tick.
///
/// A provider that cannot decide returns `None` and the agent keeps its
/// last goal; a failing provider must never take the round loop down.
pub trait TacticsProvider: Send {
    fn desired_goal(&mut self, query: &GoalQuery<'_>) -> Option<Position>;
}

/// Supplies each agent's equipment at round start (post buy phase).
pub trait LoadoutProvider: Send {
    fn loadout_for(&mut self, agent: &AgentSpec, team_money: u32, round: u8) -> Loadout;
}

/// Built-in tactics: attackers converge on a site (the carrier plants,
/// stragglers recover a dropped bomb), defenders split across sites and
/// collapse onto a planted bomb.
#[derive(Debug, Default)]
pub struct DefaultTactics;

impl TacticsProvider for DefaultTactics {
    fn desired_goal(&mut self, q: &GoalQuery<'_>) -> Option<Position> {
        let sites: Vec<Position> = q.map.bomb_sites().map(|(_, z)| z.center).collect();
        if sites.is_empty() {
            return None;
        }
        // Stable site split by agent id.
        let assigned = sites[q.id.0 as usize % sites.len()];

        match q.side {
            Side::Attack => match q.bomb {
                BombState::Dropped { position } if !q.has_bomb => Some(*position),
                BombState::Planted { position, .. } | BombState::Defusing { position, .. } => {
                    Some(*position)
                }
                _ if q.has_bomb => {
                    // Carrier heads for the closest site by walking
                    // distance (the site distance fields are precomputed).
                    let walk = |site: &Position| {
                        path_distance(q.graph, Some(q.vis), q.position, *site)
                            .unwrap_or(f64::INFINITY)
                    };
                    sites
                        .iter()
                        .copied()
                        .min_by(|a, b| walk(a).total_cmp(&walk(b)))
                }
                _ => Some(assigned),
            },
            Side::Defense => match q.bomb {
                BombState::Planted { position, .. } | BombState::Defusing { position, .. } => {
                    Some(*position)
                }
                _ => Some(assigned),
            },
        }
    }
}

/// Built-in buy logic: pistols on the opening round, rifles and armor
/// afterwards. Defenders carry defuse kits. Spending is not modeled —
/// the real buy collaborator owns the ledger.
#[derive(Debug, Default)]
pub struct DefaultLoadouts;

impl LoadoutProvider for DefaultLoadouts {
    fn loadout_for(&mut self, agent: &AgentSpec, _team_money: u32, round: u8) -> Loadout {
        let pistol_round = round == 1;
        let weapon = if pistol_round {
            WeaponKind::Pistol
        } else if agent.id.0 % 4 == 3 {
            WeaponKind::Sniper
        } else {
            WeaponKind::Rifle
        };
        Loadout {
            weapon: Some(weapon),
            vest: !pistol_round,
            helmet: !pistol_round,
            defuse_kit: true,
        }
    }
}

/// Build a default 5v5 roster with mid-level, slightly varied skills.
pub fn default_rosters() -> Vec<AgentSpec> {
    let mut specs = Vec::with_capacity(10);
    for i in 0..10u8 {
        let team = if i < 5 { TeamId::Alpha } else { TeamId::Bravo };
        let mut skills = SkillProfile::uniform(0.5 + 0.05 * (i % 5) as f64);
        skills.aggression = 0.3 + 0.15 * (i % 5) as f64;
        specs.push(AgentSpec {
            id: AgentId(i),
            team,
            skills,
        });
    }
    specs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nav() -> (MapDef, NavigationGraph, VisibilityIndex) {
        let map = MapDef::training_arena();
        let graph = NavigationGraph::build(&map).unwrap();
        let vis = VisibilityIndex::new(&graph);
        (map, graph, vis)
    }

    #[test]
    fn default_tactics_sends_carrier_to_a_site() {
        let (map, graph, vis) = nav();
        let mut tactics = DefaultTactics;
        let bomb = BombState::Carried {
            carrier: AgentId(0),
        };
        let contacts = KnownContacts::default();
        let goal = tactics
            .desired_goal(&GoalQuery {
                id: AgentId(0),
                side: Side::Attack,
                position: Position::new(500.0, 50.0),
                has_bomb: true,
                map: &map,
                bomb: &bomb,
                contacts: &contacts,
                graph: &graph,
                vis: &vis,
            })
            .unwrap();
        let is_site = map
            .bomb_sites()
            .any(|(_, z)| z.center.distance_to(&goal) < 1.0);
        assert!(is_site);
    }

    #[test]
    fn defenders_collapse_on_a_planted_bomb() {
        let (map, graph, vis) = nav();
        let mut tactics = DefaultTactics;
        let plant_pos = Position::new(150.0, 850.0);
        let bomb = BombState::Planted {
            site: 0,
            position: plant_pos,
            ticks_remaining: 300,
            ticks_since_plant: 100,
        };
        let contacts = KnownContacts::default();
        let goal = tactics
            .desired_goal(&GoalQuery {
                id: AgentId(7),
                side: Side::Defense,
                position: Position::new(850.0, 850.0),
                has_bomb: false,
                map: &map,
                bomb: &bomb,
                contacts: &contacts,
                graph: &graph,
                vis: &vis,
            })
            .unwrap();
        assert_eq!(goal, plant_pos);
    }

    #[test]
    fn default_rosters_are_balanced() {
        let specs = default_rosters();
        assert_eq!(specs.len(), 10);
        assert_eq!(specs.iter().filter(|s| s.team == TeamId::Alpha).count(), 5);
    }
}
