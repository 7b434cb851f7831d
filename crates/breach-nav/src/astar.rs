//! Path and distance queries: A* with smoothing, Dijkstra distance fields.
//!
//! All queries are stateless per call and degrade to empty/`None`
//! results instead of erroring: callers treat an empty path as
//! "movement blocked this tick".

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use breach_core::types::{NodeId, Position};

use crate::graph::NavigationGraph;
use crate::los::line_of_sight;
use crate::visibility::VisibilityIndex;

/// Node in the A* / Dijkstra open set.
///
/// Ordering is reversed for a min-heap, with the node id as the final
/// tie-break so expansion order is deterministic for a fixed graph.
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    cost: f64,
    node: NodeId,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a smoothed path between two points.
///
/// Returns an empty sequence when either endpoint has no nearest node or
/// no path exists. On success the first and last waypoints are the true
/// requested start and end, and consecutive waypoints are mutually
/// visible after smoothing.
pub fn find_path(
    graph: &NavigationGraph,
    index: Option<&VisibilityIndex>,
    start: Position,
    goal: Position,
) -> Vec<Position> {
    let (Some(start_node), Some(goal_node)) =
        (graph.nearest_node(&start), graph.nearest_node(&goal))
    else {
        return Vec::new();
    };

    let Some(node_path) = search(graph, start_node, goal_node) else {
        return Vec::new();
    };

    // True endpoints, not just nearest nodes.
    let mut raw = Vec::with_capacity(node_path.len() + 2);
    raw.push(start);
    raw.extend(node_path.iter().map(|&id| graph.node(id).position));
    raw.push(goal);

    smooth(graph, index, &raw)
}

/// A* over the graph with a Euclidean heuristic. Edge costs are the
/// Euclidean edge lengths, so the heuristic is admissible and the result
/// optimal. Returns the node sequence from start to goal inclusive.
fn search(graph: &NavigationGraph, start: NodeId, goal: NodeId) -> Option<Vec<NodeId>> {
    if start == goal {
        return Some(vec![start]);
    }

    let goal_pos = graph.node(goal).position;
    let n = graph.len();
    let mut g_scores = vec![f64::INFINITY; n];
    let mut parents: Vec<Option<NodeId>> = vec![None; n];
    let mut open = BinaryHeap::new();

    g_scores[start as usize] = 0.0;
    open.push(OpenNode {
        cost: graph.node(start).position.distance_to(&goal_pos),
        node: start,
    });

    while let Some(current) = open.pop() {
        if current.node == goal {
            return Some(reconstruct(&parents, goal));
        }

        let current_g = g_scores[current.node as usize];
        let current_pos = graph.node(current.node).position;

        for &neighbor in &graph.node(current.node).neighbors {
            let neighbor_pos = graph.node(neighbor).position;
            let tentative = current_g + current_pos.distance_to(&neighbor_pos);
            if tentative < g_scores[neighbor as usize] {
                g_scores[neighbor as usize] = tentative;
                parents[neighbor as usize] = Some(current.node);
                open.push(OpenNode {
                    cost: tentative + neighbor_pos.distance_to(&goal_pos),
                    node: neighbor,
                });
            }
        }
    }

    None
}

/// Reconstruct the node path from parent pointers.
fn reconstruct(parents: &[Option<NodeId>], goal: NodeId) -> Vec<NodeId> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(prev) = parents[current as usize] {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Greedy line-of-sight smoothing: from each anchor, skip to the farthest
/// waypoint still directly visible, until the goal is reached.
fn smooth(
    graph: &NavigationGraph,
    index: Option<&VisibilityIndex>,
    raw: &[Position],
) -> Vec<Position> {
    let clear = |a: &Position, b: &Position| match index {
        Some(idx) => idx.check(graph, a, b),
        None => line_of_sight(graph, a, b),
    };

    let mut smoothed = vec![raw[0]];
    let mut anchor = 0;
    while anchor + 1 < raw.len() {
        let mut next = anchor + 1;
        for j in (anchor + 1..raw.len()).rev() {
            if clear(&raw[anchor], &raw[j]) {
                next = j;
                break;
            }
        }
        smoothed.push(raw[next]);
        anchor = next;
    }
    smoothed
}

/// Total length of a waypoint sequence.
pub fn path_length(path: &[Position]) -> f64 {
    path.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Single-source shortest path distances to every node (Dijkstra).
/// Unreachable nodes stay at infinity.
pub fn distance_field(graph: &NavigationGraph, source: NodeId) -> Vec<f64> {
    let n = graph.len();
    let mut dist = vec![f64::INFINITY; n];
    let mut open = BinaryHeap::new();

    dist[source as usize] = 0.0;
    open.push(OpenNode {
        cost: 0.0,
        node: source,
    });

    while let Some(current) = open.pop() {
        if current.cost > dist[current.node as usize] {
            continue; // Stale entry
        }
        let current_pos = graph.node(current.node).position;
        for &neighbor in &graph.node(current.node).neighbors {
            let next = current.cost + current_pos.distance_to(&graph.node(neighbor).position);
            if next < dist[neighbor as usize] {
                dist[neighbor as usize] = next;
                open.push(OpenNode {
                    cost: next,
                    node: neighbor,
                });
            }
        }
    }

    dist
}

/// Walking distance between two points.
///
/// Checks the index's precomputed distance fields (hot targets) before
/// falling back to A* plus path-length summation. `None` means
/// unreachable.
pub fn path_distance(
    graph: &NavigationGraph,
    index: Option<&VisibilityIndex>,
    start: Position,
    goal: Position,
) -> Option<f64> {
    let (Some(start_node), Some(goal_node)) =
        (graph.nearest_node(&start), graph.nearest_node(&goal))
    else {
        return None;
    };

    if let Some(field) = index.and_then(|idx| idx.distance_field(goal_node)) {
        let through = field[start_node as usize];
        if through.is_infinite() {
            return None;
        }
        let snap_in = start.distance_to(&graph.node(start_node).position);
        let snap_out = goal.distance_to(&graph.node(goal_node).position);
        return Some(through + snap_in + snap_out);
    }

    let path = find_path(graph, index, start, goal);
    if path.is_empty() {
        return None;
    }
    Some(path_length(&path))
}
