//! The world-model graph: a directed graph over a scan's images with typed
//! node/edge attributes and a portable node-link JSON form.
//!
//! Nodes and edges live in insertion-ordered maps (`IndexMap`); insertion
//! order is load-bearing, because the path recommender's defaults and its
//! sequential fallback are defined in terms of it. The node-link form
//! (`directed`/`multigraph`/`graph`/`nodes`/`links`) matches the format
//! already persisted by earlier deployments, so stored graphs stay readable.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::annotation::{SpaceFeatures, SpaceType};
use crate::barrier::BarrierSummary;
use crate::types::DbId;

/// Node identifiers are `node_<sequence_order>` strings.
pub type NodeId = String;

// ---------------------------------------------------------------------------
// Edge vocabulary
// ---------------------------------------------------------------------------

/// Traversal difficulty of an edge between adjacent locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Moderate,
    Difficult,
    Impassable,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Moderate => "moderate",
            Self::Difficult => "difficult",
            Self::Impassable => "impassable",
        }
    }
}

/// Coarse distance estimate between adjacent locations.
///
/// No distance inference exists yet; every built edge currently carries
/// [`DistanceEstimate::Short`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceEstimate {
    Short,
    Medium,
    Long,
}

impl DistanceEstimate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// Attributes carried by one node (one image / location).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAttrs {
    pub image_id: DbId,
    pub label: String,
    pub space_type: SpaceType,
    #[serde(default)]
    pub features: SpaceFeatures,
    #[serde(default)]
    pub barriers: Vec<BarrierSummary>,
    pub accessibility_score: f64,
}

/// Attributes carried by one directed edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeAttrs {
    pub traversable: bool,
    pub difficulty: Difficulty,
    /// Union of barrier ids from both endpoint nodes.
    #[serde(default)]
    pub barriers_in_path: Vec<DbId>,
    pub distance_estimate: DistanceEstimate,
    #[serde(default)]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure while building or decoding a world-model graph.
#[derive(Debug, thiserror::Error)]
pub enum WorldModelError {
    #[error("invalid world model JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate node '{0}'")]
    DuplicateNode(NodeId),

    #[error("edge ({source} -> {target}) references an unknown node")]
    UnknownNode { r#source: NodeId, target: NodeId },

    #[error("duplicate edge ({source} -> {target})")]
    DuplicateEdge { r#source: NodeId, target: NodeId },
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// Directed graph with insertion-ordered node and edge tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldGraph {
    nodes: IndexMap<NodeId, NodeAttrs>,
    edges: IndexMap<(NodeId, NodeId), EdgeAttrs>,
}

impl WorldGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get_node(&self, id: &str) -> Option<&NodeAttrs> {
        self.nodes.get(id)
    }

    pub fn get_edge(&self, source: &str, target: &str) -> Option<&EdgeAttrs> {
        self.edges.get(&(source.to_string(), target.to_string()))
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// First node in insertion order.
    pub fn first_node(&self) -> Option<&NodeId> {
        self.nodes.keys().next()
    }

    /// Last node in insertion order.
    pub fn last_node(&self) -> Option<&NodeId> {
        self.nodes.keys().last()
    }

    /// Nodes with attributes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &NodeAttrs)> {
        self.nodes.iter()
    }

    /// Directed edges with attributes, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId, &EdgeAttrs)> {
        self.edges.iter().map(|((s, t), attrs)| (s, t, attrs))
    }

    /// Outgoing neighbors of `node` with the connecting edge attributes.
    pub fn neighbors<'a>(
        &'a self,
        node: &'a str,
    ) -> impl Iterator<Item = (&'a NodeId, &'a EdgeAttrs)> {
        self.edges
            .iter()
            .filter(move |((s, _), _)| s == node)
            .map(|((_, t), attrs)| (t, attrs))
    }

    /// Insert a node. Rejects duplicate ids.
    pub fn add_node(&mut self, id: NodeId, attrs: NodeAttrs) -> Result<(), WorldModelError> {
        if self.nodes.contains_key(&id) {
            return Err(WorldModelError::DuplicateNode(id));
        }
        self.nodes.insert(id, attrs);
        Ok(())
    }

    /// Insert a directed edge. Both endpoints must already exist.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        attrs: EdgeAttrs,
    ) -> Result<(), WorldModelError> {
        if !self.nodes.contains_key(&source) || !self.nodes.contains_key(&target) {
            return Err(WorldModelError::UnknownNode { source, target });
        }
        let key = (source, target);
        if self.edges.contains_key(&key) {
            return Err(WorldModelError::DuplicateEdge {
                source: key.0,
                target: key.1,
            });
        }
        self.edges.insert(key, attrs);
        Ok(())
    }

    // -- node-link serialization -------------------------------------------

    fn to_document(&self) -> NodeLinkDocument {
        NodeLinkDocument {
            directed: true,
            multigraph: false,
            graph: serde_json::Map::new(),
            nodes: self
                .nodes
                .iter()
                .map(|(id, attrs)| NodeLinkNode {
                    id: id.clone(),
                    attrs: attrs.clone(),
                })
                .collect(),
            links: self
                .edges
                .iter()
                .map(|((source, target), attrs)| NodeLinkLink {
                    source: source.clone(),
                    target: target.clone(),
                    attrs: attrs.clone(),
                })
                .collect(),
        }
    }

    fn from_document(doc: NodeLinkDocument) -> Result<Self, WorldModelError> {
        let mut graph = WorldGraph::new();
        for node in doc.nodes {
            graph.add_node(node.id, node.attrs)?;
        }
        for link in doc.links {
            graph.add_edge(link.source, link.target, link.attrs)?;
        }
        Ok(graph)
    }

    /// Serialize to node-link JSON text, the form stored on the analysis row.
    pub fn to_json(&self) -> Result<String, WorldModelError> {
        Ok(serde_json::to_string(&self.to_document())?)
    }

    /// Rebuild a graph from node-link JSON text.
    ///
    /// Strict about references: duplicate nodes, duplicate edges, and edges
    /// naming unknown nodes are decode errors, never silently repaired.
    pub fn from_json(text: &str) -> Result<Self, WorldModelError> {
        Self::from_document(serde_json::from_str(text)?)
    }
}

// ---------------------------------------------------------------------------
// Node-link document
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct NodeLinkDocument {
    #[serde(default = "default_directed")]
    directed: bool,
    #[serde(default)]
    multigraph: bool,
    /// Graph-level attribute bag; unused, kept for format compatibility.
    #[serde(default)]
    graph: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    nodes: Vec<NodeLinkNode>,
    #[serde(default)]
    links: Vec<NodeLinkLink>,
}

fn default_directed() -> bool {
    true
}

#[derive(Serialize, Deserialize)]
struct NodeLinkNode {
    id: NodeId,
    #[serde(flatten)]
    attrs: NodeAttrs,
}

#[derive(Serialize, Deserialize)]
struct NodeLinkLink {
    source: NodeId,
    target: NodeId,
    #[serde(flatten)]
    attrs: EdgeAttrs,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
