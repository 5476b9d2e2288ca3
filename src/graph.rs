//! DagGraph — directed graph store with stable identifiers and logical deletion.
//!
//! Wraps a petgraph DiGraph. Vertices are never physically removed, so a
//! `NodeIndex` handed out once stays valid for the lifetime of the graph;
//! removal strips the incident edges and clears the `active` flag.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::config::{MAX_FAN_OUT, MAX_NAME};

/// Vertex payload stored in the petgraph DiGraph.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Printable name; clipped to `MAX_NAME` characters on entry.
    pub name: String,
    /// Layer index assigned during layout; 0 until then.
    pub layer: usize,
    /// True for vertices synthesised while splitting long edges.
    pub is_dummy: bool,
    /// Logical tombstone; a removed vertex keeps its identifier.
    pub active: bool,
}

/// Directed graph addressed by stable `NodeIndex` identifiers.
#[derive(Debug, Clone, Default)]
pub struct DagGraph {
    pub digraph: DiGraph<NodeData, ()>,
}

impl DagGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look a vertex up by name: linear scan over active vertices.
    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.digraph.node_indices().find(|&id| {
            let node = &self.digraph[id];
            node.active && node.name == name
        })
    }

    /// Append a new active vertex. The name is clipped to `MAX_NAME` characters.
    pub fn add(&mut self, name: &str) -> NodeIndex {
        self.digraph.add_node(NodeData {
            name: clip_name(name),
            layer: 0,
            is_dummy: false,
            active: true,
        })
    }

    pub fn find_or_add(&mut self, name: &str) -> NodeIndex {
        match self.find(name) {
            Some(id) => id,
            None => self.add(name),
        }
    }

    /// Append a dummy vertex pre-assigned to `layer`.
    pub fn add_dummy(&mut self, name: &str, layer: usize) -> NodeIndex {
        self.digraph.add_node(NodeData {
            name: clip_name(name),
            layer,
            is_dummy: true,
            active: true,
        })
    }

    pub fn node(&self, id: NodeIndex) -> &NodeData {
        &self.digraph[id]
    }

    pub fn node_mut(&mut self, id: NodeIndex) -> &mut NodeData {
        &mut self.digraph[id]
    }

    /// Total vertex slots, tombstones included.
    pub fn node_count(&self) -> usize {
        self.digraph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.digraph.edge_count()
    }

    pub fn active_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.digraph
            .node_indices()
            .filter(|&id| self.digraph[id].active)
    }

    pub fn in_degree(&self, id: NodeIndex) -> usize {
        self.digraph.edges_directed(id, Direction::Incoming).count()
    }

    pub fn out_degree(&self, id: NodeIndex) -> usize {
        self.digraph.edges_directed(id, Direction::Outgoing).count()
    }

    pub fn out_neighbors(&self, id: NodeIndex) -> Vec<NodeIndex> {
        self.digraph
            .neighbors_directed(id, Direction::Outgoing)
            .collect()
    }

    pub fn in_neighbors(&self, id: NodeIndex) -> Vec<NodeIndex> {
        self.digraph
            .neighbors_directed(id, Direction::Incoming)
            .collect()
    }

    pub fn has_edge(&self, src: NodeIndex, dst: NodeIndex) -> bool {
        self.digraph.find_edge(src, dst).is_some()
    }

    /// Insert an edge unless it already exists or either endpoint is at its
    /// fan-out bound. Insertion is all-or-nothing, so the incoming and
    /// outgoing views never disagree.
    pub fn add_edge(&mut self, src: NodeIndex, dst: NodeIndex) {
        if self.has_edge(src, dst) {
            return;
        }
        if self.out_degree(src) >= MAX_FAN_OUT || self.in_degree(dst) >= MAX_FAN_OUT {
            return;
        }
        self.digraph.add_edge(src, dst, ());
    }

    /// Remove an edge by endpoints; no-op when absent.
    pub fn remove_edge(&mut self, src: NodeIndex, dst: NodeIndex) {
        if let Some(edge) = self.digraph.find_edge(src, dst) {
            self.digraph.remove_edge(edge);
        }
    }

    /// Logically remove a vertex: strip every incident edge, then deactivate.
    /// The identifier remains valid (and unfindable).
    pub fn remove_node(&mut self, id: NodeIndex) {
        if !self.digraph[id].active {
            return;
        }
        while let Some(edge) = self.digraph.first_edge(id, Direction::Outgoing) {
            self.digraph.remove_edge(edge);
        }
        while let Some(edge) = self.digraph.first_edge(id, Direction::Incoming) {
            self.digraph.remove_edge(edge);
        }
        self.digraph[id].active = false;
    }

    /// Reverse a batch of edges atomically: all removals first, then all
    /// reversed insertions, so a pair of opposite edges in one batch cancels
    /// cleanly instead of deleting each other.
    pub fn twist(&mut self, edges: &[(NodeIndex, NodeIndex)]) {
        for &(src, dst) in edges {
            self.remove_edge(src, dst);
        }
        for &(src, dst) in edges {
            self.add_edge(dst, src);
        }
    }

    /// True when the graph has no directed cycle.
    pub fn is_dag(&self) -> bool {
        !is_cyclic_directed(&self.digraph)
    }
}

fn clip_name(name: &str) -> String {
    name.chars().take(MAX_NAME).collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
