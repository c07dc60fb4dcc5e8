//! World-model domain logic: graph construction over a scan's image
//! sequence, least-difficulty path search, and node-link persistence.
//!
//! All logic in this module is pure (no DB access), so it can be tested
//! in isolation.

pub mod builder;
pub mod graph;
pub mod path;

pub use builder::{
    build_world_model, difficulty_for_severity, edge_difficulty, node_id_for, WorldModelImage,
};
pub use graph::{
    Difficulty, DistanceEstimate, EdgeAttrs, NodeAttrs, NodeId, WorldGraph, WorldModelError,
};
pub use path::{edge_weight, find_recommended_path};
