//! Graph representation and algorithms module

pub mod analytics;
pub mod collector;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Opaque participant identifier (a hex-encoded public key).
pub type Identity = String;

/// Lowest importance a node can carry; assigned on creation.
pub const MIN_IMPORTANCE: u32 = 1;

/// Importance saturates here, both during collection and analytics.
pub const MAX_IMPORTANCE: u32 = 20;

/// One graph participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identity key
    pub id: Identity,

    /// Visual weight, bumped each time the node is referenced as a target
    pub importance: u32,

    /// Count of directed edges into this node
    pub in_degree: u32,

    /// Count of directed edges out of this node
    pub out_degree: u32,

    /// Derived from degrees during analytics, never authoritative
    pub is_hub: bool,

    /// Community label assigned by the clustering pass
    pub cluster: Option<u32>,

    /// Undirected hop count from the reference identity, absent if unreachable
    pub distance_from_reference: Option<u32>,

    /// Display name from profile metadata, absent when enrichment is skipped
    pub label: Option<String>,
}

impl Node {
    fn new(id: Identity) -> Self {
        Self {
            id,
            importance: MIN_IMPORTANCE,
            in_degree: 0,
            out_degree: 0,
            is_hub: false,
            cluster: None,
            distance_from_reference: None,
            label: None,
        }
    }

    /// Total connectivity of the node within the collected graph
    pub fn total_degree(&self) -> u32 {
        self.in_degree + self.out_degree
    }
}

/// Directed follow relation: source follows target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub source: Identity,
    pub target: Identity,

    /// True iff the reverse edge also exists in the collected set
    pub is_bidirectional: bool,
}

/// Aggregate counts computed at the end of one analytics pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_links: usize,
    pub hub_count: usize,

    /// Counted per edge record: a mutual pair contributes 2
    pub bidirectional_links: usize,

    pub cluster_count: usize,
}

/// Immutable result of one collection + analytics run.
///
/// Never mutated after being handed out; a new traversal produces a wholly
/// new snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub stats: GraphStats,
}

/// Mutable node/edge accumulator owned by a single traversal run.
///
/// Nodes live in insertion order with an identity-keyed index for O(1)
/// lookup; directed edges are deduplicated by their ordered index pair.
#[derive(Debug, Default)]
pub struct FollowGraph {
    id_to_index: HashMap<Identity, u32>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    edge_pairs: HashSet<(u32, u32)>,
}

impl FollowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_to_index.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<u32> {
        self.id_to_index.get(id).copied()
    }

    pub fn node(&self, index: u32) -> &Node {
        &self.nodes[index as usize]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Get the index for an identity, inserting a fresh minimum-importance
    /// node if none exists yet.
    pub fn get_or_insert_node(&mut self, id: &str) -> u32 {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }
        let idx = self.nodes.len() as u32;
        self.id_to_index.insert(id.to_string(), idx);
        self.nodes.push(Node::new(id.to_string()));
        idx
    }

    /// Increment a node's importance, saturating at the cap.
    pub fn bump_importance(&mut self, index: u32) {
        let node = &mut self.nodes[index as usize];
        node.importance = (node.importance + 1).min(MAX_IMPORTANCE);
    }

    /// Raise a node's importance to `value` if higher, clamped to the cap.
    /// Never lowers a prior value.
    pub fn raise_importance(&mut self, index: u32, value: u32) {
        let node = &mut self.nodes[index as usize];
        node.importance = node.importance.max(value).min(MAX_IMPORTANCE);
    }

    pub fn set_label(&mut self, index: u32, label: String) {
        self.nodes[index as usize].label = Some(label);
    }

    /// Insert the directed edge between two existing nodes, collapsing
    /// duplicates. Returns true if the edge was newly added.
    pub fn insert_edge(&mut self, source: u32, target: u32) -> bool {
        if !self.edge_pairs.insert((source, target)) {
            return false;
        }
        self.edges.push(Edge {
            source: self.nodes[source as usize].id.clone(),
            target: self.nodes[target as usize].id.clone(),
            is_bidirectional: false,
        });
        true
    }

    pub fn has_edge(&self, source: u32, target: u32) -> bool {
        self.edge_pairs.contains(&(source, target))
    }

    pub(crate) fn node_mut(&mut self, index: u32) -> &mut Node {
        &mut self.nodes[index as usize]
    }

    pub(crate) fn mark_bidirectional(&mut self, edge_index: usize) {
        self.edges[edge_index].is_bidirectional = true;
    }

    /// Freeze the accumulator into an immutable snapshot.
    pub fn into_snapshot(self, stats: GraphStats) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes,
            edges: self.edges,
            stats,
        }
    }
}
