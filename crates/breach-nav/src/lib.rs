//! Navigation and visibility engine for BREACH.
//!
//! Walkable graph construction, nearest-node and walkability queries,
//! A* pathfinding with line-of-sight smoothing, sampled raycasts, and
//! the incrementally precomputed visibility/cover index.

pub use breach_core as core;

pub mod astar;
pub mod graph;
pub mod los;
pub mod visibility;

pub use astar::{find_path, path_distance, path_length};
pub use graph::{NavNode, NavigationGraph};
pub use los::line_of_sight;
pub use visibility::VisibilityIndex;
