//! Least-difficulty path search over the world-model graph.
//!
//! Hand-written Dijkstra over the graph's adjacency tables; integer edge
//! weights keep the heap ordering total, and impassable edges are excluded
//! from relaxation outright instead of carrying an infinite weight. When no
//! finite path exists (or a requested endpoint is missing) the search
//! degrades to the full node list in insertion order, which for these
//! path-shaped graphs is the best-effort sequential route.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::HashMap;

use crate::world_model::graph::{Difficulty, EdgeAttrs, NodeId, WorldGraph};

// ---------------------------------------------------------------------------
// Edge weights
// ---------------------------------------------------------------------------

/// Finite traversal cost of an edge, or `None` when it cannot be crossed.
///
/// Non-traversable and impassable edges never yield a finite weight.
pub fn edge_weight(attrs: &EdgeAttrs) -> Option<u64> {
    if !attrs.traversable {
        return None;
    }
    match attrs.difficulty {
        Difficulty::Easy => Some(1),
        Difficulty::Moderate => Some(2),
        Difficulty::Difficult => Some(4),
        Difficulty::Impassable => None,
    }
}

// ---------------------------------------------------------------------------
// Path search
// ---------------------------------------------------------------------------

/// Recommended path from `start` to `end` (defaults: first and last node in
/// insertion order).
///
/// Returns `None` only for an empty graph. A missing endpoint or an
/// unreachable `end` falls back to the full node list in insertion order.
/// Deterministic: ties are broken by node insertion order, so repeated
/// calls on the same graph return the same path.
pub fn find_recommended_path(
    graph: &WorldGraph,
    start: Option<&str>,
    end: Option<&str>,
) -> Option<Vec<NodeId>> {
    if graph.is_empty() {
        return None;
    }

    // Unwraps are guarded by the emptiness check above.
    let first = graph.first_node().cloned()?;
    let last = graph.last_node().cloned()?;
    let start = start.unwrap_or(&first);
    let end = end.unwrap_or(&last);

    if !graph.contains_node(start) || !graph.contains_node(end) {
        return Some(sequential_fallback(graph));
    }

    match dijkstra(graph, start, end) {
        Some(path) => Some(path),
        None => Some(sequential_fallback(graph)),
    }
}

/// All nodes in insertion order; the degraded sequential route.
fn sequential_fallback(graph: &WorldGraph) -> Vec<NodeId> {
    graph.node_ids().cloned().collect()
}

/// Shortest finite-weight path, or `None` when `end` is unreachable.
fn dijkstra(graph: &WorldGraph, start: &str, end: &str) -> Option<Vec<NodeId>> {
    let order: Vec<&NodeId> = graph.node_ids().collect();
    let index_of: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    let start_idx = *index_of.get(start)?;
    let end_idx = *index_of.get(end)?;

    let mut dist: Vec<Option<u64>> = vec![None; order.len()];
    let mut prev: Vec<Option<usize>> = vec![None; order.len()];
    // (cost, insertion index): equal costs pop in insertion order.
    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = BinaryHeap::new();

    dist[start_idx] = Some(0);
    heap.push(Reverse((0, start_idx)));

    while let Some(Reverse((cost, idx))) = heap.pop() {
        if dist[idx] != Some(cost) {
            continue; // stale queue entry
        }
        if idx == end_idx {
            break;
        }

        for (neighbor, attrs) in graph.neighbors(order[idx]) {
            let Some(weight) = edge_weight(attrs) else {
                continue;
            };
            let Some(&neighbor_idx) = index_of.get(neighbor.as_str()) else {
                continue;
            };
            let next = cost + weight;
            let improved = match dist[neighbor_idx] {
                Some(existing) => next < existing,
                None => true,
            };
            if improved {
                dist[neighbor_idx] = Some(next);
                prev[neighbor_idx] = Some(idx);
                heap.push(Reverse((next, neighbor_idx)));
            }
        }
    }

    dist[end_idx]?;

    let mut path = vec![end_idx];
    let mut current = end_idx;
    while current != start_idx {
        current = prev[current]?;
        path.push(current);
    }
    path.reverse();
    Some(path.into_iter().map(|i| order[i].clone()).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
