//! Map definition: navigation nodes, zones, sites, and spawn points.
//!
//! Maps are plain data loaded from JSON. Structural validation happens
//! here; graph-level validation (dangling adjacency) happens when the
//! navigation graph is built from this definition.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::Side;
use crate::types::{NodeId, Position, ZoneId};

/// One walkable node: position plus adjacency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDef {
    pub position: Position,
    pub neighbors: Vec<NodeId>,
}

/// A named region of the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneDef {
    pub name: String,
    pub center: Position,
    pub radius: f64,
    /// Whether the bomb can be planted here.
    pub bomb_site: bool,
}

/// Complete map definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDef {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<NodeDef>,
    pub zones: Vec<ZoneDef>,
    pub attack_spawns: Vec<Position>,
    pub defense_spawns: Vec<Position>,
}

/// Map loading / validation failures. Fatal before any tick runs.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("map has no nodes")]
    NoNodes,
    #[error("map has no bomb sites")]
    NoBombSites,
    #[error("map has no spawn points for {0:?}")]
    NoSpawns(Side),
    #[error("node {node} references missing neighbor {neighbor}")]
    DanglingNeighbor { node: NodeId, neighbor: NodeId },
    #[error("spawn point ({x:.0}, {y:.0}) is not walkable")]
    SpawnOffMesh { x: f64, y: f64 },
}

impl MapDef {
    /// Parse and structurally validate a map from JSON.
    pub fn from_json(json: &str) -> Result<Self, MapError> {
        let map: MapDef = serde_json::from_str(json)?;
        map.validate()?;
        Ok(map)
    }

    /// Structural validation: nonempty mesh, sites, and spawns.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.nodes.is_empty() {
            return Err(MapError::NoNodes);
        }
        if !self.zones.iter().any(|z| z.bomb_site) {
            return Err(MapError::NoBombSites);
        }
        if self.attack_spawns.is_empty() {
            return Err(MapError::NoSpawns(Side::Attack));
        }
        if self.defense_spawns.is_empty() {
            return Err(MapError::NoSpawns(Side::Defense));
        }
        Ok(())
    }

    /// Spawn points for a side.
    pub fn spawns(&self, side: Side) -> &[Position] {
        match side {
            Side::Attack => &self.attack_spawns,
            Side::Defense => &self.defense_spawns,
        }
    }

    /// Bomb site zones, with their ids.
    pub fn bomb_sites(&self) -> impl Iterator<Item = (ZoneId, &ZoneDef)> {
        self.zones
            .iter()
            .enumerate()
            .filter(|(_, z)| z.bomb_site)
            .map(|(i, z)| (i as ZoneId, z))
    }

    /// The zone containing a point: the nearest center whose radius covers it.
    pub fn zone_at(&self, pos: &Position) -> Option<ZoneId> {
        self.zones
            .iter()
            .enumerate()
            .filter(|(_, z)| z.center.distance_to(pos) <= z.radius)
            .min_by(|(_, a), (_, b)| {
                a.center
                    .distance_to(pos)
                    .total_cmp(&b.center.distance_to(pos))
            })
            .map(|(i, _)| i as ZoneId)
    }

    /// The nearest zone center, ignoring radii. Used for noise attribution.
    pub fn nearest_zone(&self, pos: &Position) -> Option<ZoneId> {
        self.zones
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.center
                    .distance_to(pos)
                    .total_cmp(&b.center.distance_to(pos))
            })
            .map(|(i, _)| i as ZoneId)
    }

    /// A built-in two-site arena on a 1000x1000 play space, used by the
    /// headless runner and tests. Nodes sit on a 50-unit lattice with two
    /// wall bands forming three lanes.
    pub fn training_arena() -> MapDef {
        const SIZE: f64 = 1_000.0;
        const SPACING: f64 = 50.0;

        // Blocked rectangles: (x0, y0, x1, y1).
        let walls: [(f64, f64, f64, f64); 4] = [
            (0.0, 380.0, 420.0, 440.0),
            (580.0, 380.0, 1_000.0, 440.0),
            (240.0, 580.0, 760.0, 640.0),
            (460.0, 700.0, 540.0, 1_000.0),
        ];
        let blocked = |x: f64, y: f64| {
            walls
                .iter()
                .any(|&(x0, y0, x1, y1)| x >= x0 && x <= x1 && y >= y0 && y <= y1)
        };

        // Lattice nodes on open ground.
        let per_row = (SIZE / SPACING) as i64 + 1;
        let mut grid_to_id = std::collections::HashMap::new();
        let mut nodes = Vec::new();
        for gy in 0..per_row {
            for gx in 0..per_row {
                let x = gx as f64 * SPACING;
                let y = gy as f64 * SPACING;
                if blocked(x, y) {
                    continue;
                }
                grid_to_id.insert((gx, gy), nodes.len() as NodeId);
                nodes.push(NodeDef {
                    position: Position::new(x, y),
                    neighbors: Vec::new(),
                });
            }
        }

        // 8-neighborhood adjacency between surviving lattice nodes.
        for gy in 0..per_row {
            for gx in 0..per_row {
                let Some(&id) = grid_to_id.get(&(gx, gy)) else {
                    continue;
                };
                for dy in -1..=1i64 {
                    for dx in -1..=1i64 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        if let Some(&other) = grid_to_id.get(&(gx + dx, gy + dy)) {
                            nodes[id as usize].neighbors.push(other);
                        }
                    }
                }
            }
        }

        MapDef {
            name: "training_arena".into(),
            width: SIZE,
            height: SIZE,
            nodes,
            zones: vec![
                ZoneDef {
                    name: "A Site".into(),
                    center: Position::new(150.0, 850.0),
                    radius: 120.0,
                    bomb_site: true,
                },
                ZoneDef {
                    name: "B Site".into(),
                    center: Position::new(850.0, 850.0),
                    radius: 120.0,
                    bomb_site: true,
                },
                ZoneDef {
                    name: "Mid".into(),
                    center: Position::new(500.0, 500.0),
                    radius: 160.0,
                    bomb_site: false,
                },
                ZoneDef {
                    name: "Attack Spawn".into(),
                    center: Position::new(500.0, 100.0),
                    radius: 180.0,
                    bomb_site: false,
                },
                ZoneDef {
                    name: "Defense Spawn".into(),
                    center: Position::new(500.0, 950.0),
                    radius: 180.0,
                    bomb_site: false,
                },
            ],
            attack_spawns: vec![
                Position::new(300.0, 50.0),
                Position::new(400.0, 50.0),
                Position::new(500.0, 50.0),
                Position::new(600.0, 50.0),
                Position::new(700.0, 50.0),
            ],
            defense_spawns: vec![
                Position::new(200.0, 950.0),
                Position::new(300.0, 950.0),
                Position::new(600.0, 950.0),
                Position::new(700.0, 950.0),
                Position::new(800.0, 950.0),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_arena_is_valid() {
        let map = MapDef::training_arena();
        map.validate().unwrap();
        assert_eq!(map.bomb_sites().count(), 2);
        assert_eq!(map.attack_spawns.len(), 5);
        assert_eq!(map.defense_spawns.len(), 5);
    }

    #[test]
    fn zone_lookup_respects_radius() {
        let map = MapDef::training_arena();
        let a_site = map.zone_at(&Position::new(150.0, 850.0)).unwrap();
        assert!(map.zones[a_site as usize].bomb_site);
        assert_eq!(map.zone_at(&Position::new(150.0, 400.0)), None);
    }

    #[test]
    fn json_round_trip_and_validation() {
        let map = MapDef::training_arena();
        let json = serde_json::to_string(&map).unwrap();
        let parsed = MapDef::from_json(&json).unwrap();
        assert_eq!(parsed.nodes.len(), map.nodes.len());

        let empty = r#"{"name":"x","width":10.0,"height":10.0,"nodes":[],
            "zones":[],"attack_spawns":[],"defense_spawns":[]}"#;
        assert!(matches!(MapDef::from_json(empty), Err(MapError::NoNodes)));
    }
}
