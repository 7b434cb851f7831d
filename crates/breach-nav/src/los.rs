//! Line-of-sight: stepped sampling along a segment.
//!
//! A segment is clear when every sample point at a fixed spacing is
//! walkable. Spacing is fixed, not sample count, so long sightlines are
//! checked at the same resolution as short ones.

use breach_core::constants::LOS_SAMPLE_SPACING;
use breach_core::types::Position;

use crate::graph::NavigationGraph;

/// Check line-of-sight between two points on the walkable mesh.
pub fn line_of_sight(graph: &NavigationGraph, from: &Position, to: &Position) -> bool {
    let dist = from.distance_to(to);
    if dist < LOS_SAMPLE_SPACING {
        return true; // Too close for anything to occlude
    }

    let samples = (dist / LOS_SAMPLE_SPACING).ceil() as usize;
    for i in 1..samples {
        let t = i as f64 / samples as f64;
        if !graph.is_walkable(&from.lerp(to, t)) {
            return false;
        }
    }
    true
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use breach_core::map::{MapDef, NodeDef, ZoneDef};
    use breach_core::types::NodeId;

    /// A straight east-west corridor of nodes, 50 units apart.
    pub(crate) fn corridor_map(length: f64) -> MapDef {
        let count = (length / 50.0) as usize + 1;
        let nodes = (0..count)
            .map(|i| NodeDef {
                position: Position::new(i as f64 * 50.0, 0.0),
                neighbors: if i + 1 < count {
                    vec![(i + 1) as NodeId]
                } else {
                    vec![]
                },
            })
            .collect();
        MapDef {
            name: "corridor".into(),
            width: length,
            height: 100.0,
            nodes,
            zones: vec![ZoneDef {
                name: "site".into(),
                center: Position::new(0.0, 0.0),
                radius: 100.0,
                bomb_site: true,
            }],
            attack_spawns: vec![Position::new(0.0, 0.0)],
            defense_spawns: vec![Position::new(length, 0.0)],
        }
    }

    #[test]
    fn clear_corridor_at_two_thousand_units() {
        let graph = NavigationGraph::build(&corridor_map(2_000.0)).unwrap();
        let a = Position::new(0.0, 0.0);
        let b = Position::new(2_000.0, 0.0);
        assert!(
            line_of_sight(&graph, &a, &b),
            "unobstructed 2000-unit sightline should be clear"
        );
    }

    #[test]
    fn blocked_by_gap_in_mesh() {
        // Two corridor stubs with a 200-unit unwalkable gap between them.
        let mut map = corridor_map(100.0);
        let base = map.nodes.len() as NodeId;
        for i in 0..3 {
            map.nodes.push(NodeDef {
                position: Position::new(300.0 + i as f64 * 50.0, 0.0),
                neighbors: if i < 2 { vec![base + i + 1] } else { vec![] },
            });
        }
        let graph = NavigationGraph::build(&map).unwrap();

        let a = Position::new(0.0, 0.0);
        let b = Position::new(400.0, 0.0);
        assert!(!line_of_sight(&graph, &a, &b));
    }

    #[test]
    fn adjacent_points_always_clear() {
        let graph = NavigationGraph::build(&corridor_map(100.0)).unwrap();
        let a = Position::new(10.0, 0.0);
        let b = Position::new(12.0, 0.0);
        assert!(line_of_sight(&graph, &a, &b));
    }
}
