//! World-model construction: ordered images plus per-image annotations in,
//! path-shaped traversal graph out.
//!
//! A fresh graph is built on every call; there is no incremental update.

use crate::annotation::ImageAnnotation;
use crate::barrier::{max_severity, BarrierSeverity, BarrierSummary};
use crate::types::DbId;
use crate::world_model::graph::{
    Difficulty, DistanceEstimate, EdgeAttrs, NodeAttrs, NodeId, WorldGraph, WorldModelError,
};

// ---------------------------------------------------------------------------
// Builder input
// ---------------------------------------------------------------------------

/// Per-image input to [`build_world_model`].
///
/// `barriers` are the persisted barrier rows for the image (they carry ids);
/// the annotation's own raw detections are not read here.
#[derive(Debug, Clone)]
pub struct WorldModelImage {
    pub image_id: DbId,
    pub sequence_order: i32,
    pub barriers: Vec<BarrierSummary>,
    pub annotation: ImageAnnotation,
}

/// Node id for an image at the given sequence position.
pub fn node_id_for(sequence_order: i32) -> NodeId {
    format!("node_{sequence_order}")
}

// ---------------------------------------------------------------------------
// Difficulty derivation
// ---------------------------------------------------------------------------

/// Map a barrier severity to the traversal difficulty it imposes.
pub fn difficulty_for_severity(severity: BarrierSeverity) -> Difficulty {
    match severity {
        BarrierSeverity::Low => Difficulty::Easy,
        BarrierSeverity::Medium => Difficulty::Moderate,
        BarrierSeverity::High => Difficulty::Difficult,
        BarrierSeverity::Critical => Difficulty::Impassable,
    }
}

/// Difficulty of the edge between two adjacent images: the mapping of the
/// highest severity across both barrier sets, easy when both are empty.
pub fn edge_difficulty(source: &[BarrierSummary], target: &[BarrierSummary]) -> Difficulty {
    let worst = [max_severity(source), max_severity(target)]
        .into_iter()
        .flatten()
        .max();
    match worst {
        Some(severity) => difficulty_for_severity(severity),
        None => Difficulty::Easy,
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the world-model graph over a scan's images.
///
/// Images are sorted by `sequence_order` (stable) before building, so
/// callers may pass them in any order; sequence orders must be unique, and a
/// duplicate surfaces as [`WorldModelError::DuplicateNode`]. Gaps in the
/// sequence are fine, nodes are keyed by the raw order value.
///
/// One node per image; for each consecutive pair, two directed edges with
/// identical payload (forward inserted first). An image whose annotation is
/// failed still gets a node, carrying its degraded score and no analyzer
/// data.
pub fn build_world_model(
    mut images: Vec<WorldModelImage>,
) -> Result<WorldGraph, WorldModelError> {
    images.sort_by_key(|image| image.sequence_order);

    let mut graph = WorldGraph::new();
    for image in &images {
        let attrs = NodeAttrs {
            image_id: image.image_id,
            label: format!("Location {}", image.sequence_order + 1),
            space_type: image.annotation.space_type,
            features: image.annotation.features.clone(),
            barriers: image.barriers.clone(),
            accessibility_score: image.annotation.accessibility_score,
        };
        graph.add_node(node_id_for(image.sequence_order), attrs)?;
    }

    for pair in images.windows(2) {
        let (source, target) = (&pair[0], &pair[1]);
        let difficulty = edge_difficulty(&source.barriers, &target.barriers);
        let barrier_ids: Vec<DbId> = source
            .barriers
            .iter()
            .chain(&target.barriers)
            .map(|barrier| barrier.id)
            .collect();
        let attrs = EdgeAttrs {
            traversable: difficulty != Difficulty::Impassable,
            difficulty,
            barriers_in_path: barrier_ids,
            distance_estimate: DistanceEstimate::Short,
            notes: None,
        };

        let forward = node_id_for(source.sequence_order);
        let backward = node_id_for(target.sequence_order);
        graph.add_edge(forward.clone(), backward.clone(), attrs.clone())?;
        graph.add_edge(backward, forward, attrs)?;
    }

    Ok(graph)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
