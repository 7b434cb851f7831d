//! NavigationGraph: the walkable node graph with spatial bucketing.
//!
//! Built once per map and read-only afterwards. Adjacency is made
//! symmetric at construction; dangling neighbor references are a
//! construction error, not a warning.

use std::collections::HashMap;

use breach_core::constants::{NAV_CELL_SIZE, SNAP_THRESHOLD};
use breach_core::map::{MapDef, MapError};
use breach_core::types::{NodeId, Position};

/// One walkable node.
#[derive(Debug, Clone)]
pub struct NavNode {
    pub id: NodeId,
    pub position: Position,
    pub neighbors: Vec<NodeId>,
}

/// The static walkable graph plus a uniform spatial grid for
/// sub-linear nearest-node queries.
#[derive(Debug, Clone)]
pub struct NavigationGraph {
    nodes: Vec<NavNode>,
    buckets: HashMap<(i64, i64), Vec<NodeId>>,
}

impl NavigationGraph {
    /// Build the graph from a map definition.
    ///
    /// Rejects dangling neighbor ids and unreachable spawn points before
    /// completing: pathfinding and visibility correctness depend on a
    /// consistent graph, so nothing is silently dropped.
    pub fn build(map: &MapDef) -> Result<Self, MapError> {
        map.validate()?;

        let count = map.nodes.len();
        let mut nodes: Vec<NavNode> = map
            .nodes
            .iter()
            .enumerate()
            .map(|(i, def)| NavNode {
                id: i as NodeId,
                position: def.position,
                neighbors: Vec::with_capacity(def.neighbors.len()),
            })
            .collect();

        // Validate adjacency, then symmetrize it.
        for (i, def) in map.nodes.iter().enumerate() {
            for &n in &def.neighbors {
                if n as usize >= count {
                    return Err(MapError::DanglingNeighbor {
                        node: i as NodeId,
                        neighbor: n,
                    });
                }
            }
        }
        for (i, def) in map.nodes.iter().enumerate() {
            let id = i as NodeId;
            for &n in &def.neighbors {
                if n == id {
                    continue;
                }
                if !nodes[i].neighbors.contains(&n) {
                    nodes[i].neighbors.push(n);
                }
                if !nodes[n as usize].neighbors.contains(&id) {
                    nodes[n as usize].neighbors.push(id);
                }
            }
        }
        for node in &mut nodes {
            node.neighbors.sort_unstable();
        }

        let mut buckets: HashMap<(i64, i64), Vec<NodeId>> = HashMap::new();
        for node in &nodes {
            buckets
                .entry(Self::cell_of(&node.position))
                .or_default()
                .push(node.id);
        }

        let graph = Self { nodes, buckets };

        for spawn in map
            .attack_spawns
            .iter()
            .chain(map.defense_spawns.iter())
        {
            if !graph.is_walkable(spawn) {
                return Err(MapError::SpawnOffMesh {
                    x: spawn.x,
                    y: spawn.y,
                });
            }
        }

        log::info!(
            "navigation graph built: {} nodes, {} grid cells",
            graph.nodes.len(),
            graph.buckets.len()
        );
        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &NavNode {
        &self.nodes[id as usize]
    }

    pub fn nodes(&self) -> &[NavNode] {
        &self.nodes
    }

    fn cell_of(pos: &Position) -> (i64, i64) {
        (
            (pos.x / NAV_CELL_SIZE).floor() as i64,
            (pos.y / NAV_CELL_SIZE).floor() as i64,
        )
    }

    /// Nearest node to a point: the point's grid cell and its 8 neighbors,
    /// with an exhaustive fallback when that neighborhood is empty
    /// (edge-of-map case).
    pub fn nearest_node(&self, pos: &Position) -> Option<NodeId> {
        let (cx, cy) = Self::cell_of(pos);
        let mut best: Option<(NodeId, f64)> = None;

        for dy in -1..=1 {
            for dx in -1..=1 {
                if let Some(ids) = self.buckets.get(&(cx + dx, cy + dy)) {
                    for &id in ids {
                        let d = self.nodes[id as usize].position.distance_sq_to(pos);
                        if best.map_or(true, |(_, bd)| d < bd) {
                            best = Some((id, d));
                        }
                    }
                }
            }
        }

        if best.is_none() {
            for node in &self.nodes {
                let d = node.position.distance_sq_to(pos);
                if best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((node.id, d));
                }
            }
        }

        best.map(|(id, _)| id)
    }

    /// A point is walkable if its nearest node lies within the snap
    /// threshold. Used to validate spawns and to sample raycasts.
    pub fn is_walkable(&self, pos: &Position) -> bool {
        self.nearest_node(pos)
            .map(|id| self.nodes[id as usize].position.distance_to(pos) <= SNAP_THRESHOLD)
            .unwrap_or(false)
    }
}
