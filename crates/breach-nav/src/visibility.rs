//! Precomputed visibility, cover, and distance-field index.
//!
//! The all-pairs visibility relation is O(N²) sampled raycasts, so it is
//! built incrementally: `step` processes a bounded batch of node pairs
//! and the simulation keeps ticking against a partially built index.
//! Queries fall back to an on-demand raycast for pairs not yet covered;
//! on-demand results are not written back, so the build cursor stays the
//! single writer.

use std::collections::{HashMap, HashSet};

use breach_core::constants::{CHOKEPOINT_DEGREE_RATIO, MAX_VISION_DISTANCE};
use breach_core::types::{NodeId, Position};

use crate::astar;
use crate::graph::NavigationGraph;
use crate::los::line_of_sight;

/// Cover score reported for a node before the index is complete.
const NEUTRAL_COVER: f64 = 0.5;

/// Symmetric visibility sets, cover/chokepoint scores, and cached
/// Dijkstra distance fields for hot targets.
#[derive(Debug, Clone)]
pub struct VisibilityIndex {
    node_count: usize,
    visible: Vec<HashSet<NodeId>>,
    /// Build cursor: next unordered pair (row < col) to process.
    row: usize,
    col: usize,
    complete: bool,
    cover: Vec<f64>,
    chokepoints: Vec<bool>,
    distance_fields: HashMap<NodeId, Vec<f64>>,
}

impl VisibilityIndex {
    pub fn new(graph: &NavigationGraph) -> Self {
        let n = graph.len();
        let mut index = Self {
            node_count: n,
            visible: vec![HashSet::new(); n],
            row: 0,
            col: 1,
            complete: n < 2,
            cover: vec![NEUTRAL_COVER; n],
            chokepoints: vec![false; n],
            distance_fields: HashMap::new(),
        };
        if index.complete {
            index.finalize(graph);
        }
        index
    }

    /// Whether the full pairwise relation has been computed.
    pub fn ready(&self) -> bool {
        self.complete
    }

    /// Process up to `pair_budget` node pairs. Returns true once the
    /// index is complete. Never blocks for longer than the batch.
    pub fn step(&mut self, graph: &NavigationGraph, pair_budget: usize) -> bool {
        if self.complete {
            return true;
        }

        let mut remaining = pair_budget;
        while remaining > 0 && self.row + 1 < self.node_count {
            let (a, b) = (self.row as NodeId, self.col as NodeId);
            let pa = graph.node(a).position;
            let pb = graph.node(b).position;

            if pa.distance_to(&pb) <= MAX_VISION_DISTANCE && line_of_sight(graph, &pa, &pb) {
                // Populate both sides so the relation stays symmetric.
                self.visible[a as usize].insert(b);
                self.visible[b as usize].insert(a);
            }

            remaining -= 1;
            self.col += 1;
            if self.col >= self.node_count {
                self.row += 1;
                self.col = self.row + 1;
            }
        }

        if self.row + 1 >= self.node_count {
            self.complete = true;
            self.finalize(graph);
        }
        self.complete
    }

    /// Whether the pair (a, b) has already been processed by the build.
    fn pair_cached(&self, a: NodeId, b: NodeId) -> bool {
        if self.complete {
            return true;
        }
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (lo, hi) = (lo as usize, hi as usize);
        lo < self.row || (lo == self.row && hi < self.col)
    }

    /// Cached node-to-node visibility. `None` when the pair has not been
    /// processed yet.
    pub fn nodes_see(&self, a: NodeId, b: NodeId) -> Option<bool> {
        if a == b {
            return Some(true);
        }
        self.pair_cached(a, b)
            .then(|| self.visible[a as usize].contains(&b))
    }

    /// Visible-node set for one node (authoritative once `ready`).
    pub fn visible_set(&self, id: NodeId) -> &HashSet<NodeId> {
        &self.visible[id as usize]
    }

    /// Point-to-point visibility: cache fast path when both endpoints'
    /// nearest nodes are covered, on-demand raycast otherwise. On-demand
    /// results are non-authoritative and never cached.
    pub fn check(&self, graph: &NavigationGraph, from: &Position, to: &Position) -> bool {
        if from.distance_to(to) > MAX_VISION_DISTANCE {
            return line_of_sight(graph, from, to);
        }
        if let (Some(a), Some(b)) = (graph.nearest_node(from), graph.nearest_node(to)) {
            if let Some(seen) = self.nodes_see(a, b) {
                return seen;
            }
        }
        line_of_sight(graph, from, to)
    }

    /// Cover score: how rarely a node is visible from elsewhere.
    /// Neutral until the index is complete.
    pub fn cover_score(&self, id: NodeId) -> f64 {
        if self.complete {
            self.cover[id as usize]
        } else {
            NEUTRAL_COVER
        }
    }

    /// Whether a node is a local connectivity bottleneck.
    pub fn is_chokepoint(&self, id: NodeId) -> bool {
        self.chokepoints[id as usize]
    }

    /// Compute and cache the Dijkstra distance field for a hot target
    /// (objective site). Idempotent per target.
    pub fn ensure_distance_field(&mut self, graph: &NavigationGraph, target: NodeId) {
        self.distance_fields
            .entry(target)
            .or_insert_with(|| astar::distance_field(graph, target));
    }

    /// Cached distance field for a target, if one was precomputed.
    pub fn distance_field(&self, target: NodeId) -> Option<&[f64]> {
        self.distance_fields.get(&target).map(Vec::as_slice)
    }

    /// Derive cover scores and chokepoint flags once the visibility
    /// relation is final.
    fn finalize(&mut self, graph: &NavigationGraph) {
        let total = self.node_count.max(1) as f64;
        for (i, seen) in self.visible.iter().enumerate() {
            self.cover[i] = 1.0 - seen.len() as f64 / total;
        }

        for node in graph.nodes() {
            let degree = node.neighbors.len() as f64;
            if node.neighbors.is_empty() {
                continue;
            }
            let neighbor_mean = node
                .neighbors
                .iter()
                .map(|&n| graph.node(n).neighbors.len() as f64)
                .sum::<f64>()
                / node.neighbors.len() as f64;
            self.chokepoints[node.id as usize] =
                degree < neighbor_mean * CHOKEPOINT_DEGREE_RATIO;
        }

        log::info!(
            "visibility index complete: {} nodes, {} chokepoints",
            self.node_count,
            self.chokepoints.iter().filter(|&&c| c).count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breach_core::map::{MapDef, NodeDef, ZoneDef};

    fn build_full(graph: &NavigationGraph) -> VisibilityIndex {
        let mut index = VisibilityIndex::new(graph);
        while !index.step(graph, 4_096) {}
        index
    }

    fn small_map(nodes: Vec<NodeDef>) -> MapDef {
        let spawn = nodes[0].position;
        MapDef {
            name: "test".into(),
            width: 4_000.0,
            height: 4_000.0,
            nodes,
            zones: vec![ZoneDef {
                name: "site".into(),
                center: spawn,
                radius: 100.0,
                bomb_site: true,
            }],
            attack_spawns: vec![spawn],
            defense_spawns: vec![spawn],
        }
    }

    #[test]
    fn visibility_is_symmetric() {
        let graph = NavigationGraph::build(&MapDef::training_arena()).unwrap();
        let index = build_full(&graph);

        for a in 0..graph.len() as NodeId {
            for &b in index.visible_set(a) {
                assert!(
                    index.visible_set(b).contains(&a),
                    "asymmetric visibility between {a} and {b}"
                );
            }
        }
    }

    #[test]
    fn partial_index_falls_back_to_raycast() {
        let graph = NavigationGraph::build(&MapDef::training_arena()).unwrap();
        let mut index = VisibilityIndex::new(&graph);
        assert!(!index.ready());
        index.step(&graph, 8);

        // Regardless of build progress, check() must agree with the
        // direct raycast for point queries.
        let pairs = [
            (Position::new(0.0, 0.0), Position::new(500.0, 0.0)),
            (Position::new(150.0, 300.0), Position::new(150.0, 500.0)),
            (Position::new(500.0, 50.0), Position::new(500.0, 300.0)),
        ];
        for (a, b) in pairs {
            assert_eq!(
                index.check(&graph, &a, &b),
                line_of_sight(&graph, &a, &b),
                "{a:?} -> {b:?}"
            );
        }
    }

    #[test]
    fn build_completes_and_reports_ready() {
        let graph = NavigationGraph::build(&MapDef::training_arena()).unwrap();
        let mut index = VisibilityIndex::new(&graph);
        let n = graph.len();
        let total_pairs = n * (n - 1) / 2;
        let mut steps = 0;
        while !index.step(&graph, 1_024) {
            steps += 1;
            assert!(
                steps <= total_pairs,
                "incremental build failed to terminate"
            );
        }
        assert!(index.ready());
    }

    #[test]
    fn isolated_node_has_full_cover() {
        // Three mutually visible nodes plus a distant island far beyond
        // the vision range.
        let nodes = vec![
            NodeDef {
                position: Position::new(0.0, 0.0),
                neighbors: vec![1],
            },
            NodeDef {
                position: Position::new(50.0, 0.0),
                neighbors: vec![2],
            },
            NodeDef {
                position: Position::new(100.0, 0.0),
                neighbors: vec![],
            },
            NodeDef {
                position: Position::new(3_900.0, 3_900.0),
                neighbors: vec![],
            },
        ];
        let graph = NavigationGraph::build(&small_map(nodes)).unwrap();
        let index = build_full(&graph);

        assert_eq!(index.cover_score(3), 1.0);
        assert!(index.cover_score(0) < index.cover_score(3));
    }

    #[test]
    fn neck_between_two_blobs_is_a_chokepoint() {
        // Two fully-connected 5-node blobs joined through one neck node.
        let mut nodes = Vec::new();
        for blob in 0..2 {
            let base = blob * 5;
            let x0 = blob as f64 * 400.0;
            for i in 0..5 {
                let neighbors = (0..5)
                    .filter(|&j| j != i)
                    .map(|j| (base + j) as NodeId)
                    .collect();
                nodes.push(NodeDef {
                    position: Position::new(x0 + (i % 3) as f64 * 40.0, (i / 3) as f64 * 40.0),
                    neighbors,
                });
            }
        }
        // Neck node 10 links node 0 (blob A) and node 5 (blob B).
        nodes.push(NodeDef {
            position: Position::new(200.0, 0.0),
            neighbors: vec![0, 5],
        });
        let graph = NavigationGraph::build(&small_map(nodes)).unwrap();
        let index = build_full(&graph);

        assert!(index.is_chokepoint(10), "neck node should be a chokepoint");
        assert!(
            !index.is_chokepoint(1),
            "blob interior should not be a chokepoint"
        );
    }

    #[test]
    fn distance_fields_are_cached_per_target() {
        let graph = NavigationGraph::build(&MapDef::training_arena()).unwrap();
        let mut index = VisibilityIndex::new(&graph);

        let site = graph.nearest_node(&Position::new(150.0, 850.0)).unwrap();
        assert!(index.distance_field(site).is_none());
        index.ensure_distance_field(&graph, site);
        let field = index.distance_field(site).unwrap();
        assert_eq!(field.len(), graph.len());
        assert_eq!(field[site as usize], 0.0);
    }
}
