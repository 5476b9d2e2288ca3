//! Edge-list input: line parser, built-in demo graph, graph construction.
//!
//! The input format is one `<src> <dst>` pair per line, whitespace separated.
//! Blank lines and lines starting with `#` are skipped; tokens after the
//! second are ignored.

use std::io;

use thiserror::Error;

use crate::config::MAX_NAME;
use crate::graph::DagGraph;

/// Input-stage errors; the binary maps both to exit code 1.
#[derive(Debug, Error)]
pub enum DagError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("no edges in input")]
    EmptyEdgeList,
}

/// One `<src> <dst>` pair as read from input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEdge {
    pub src: String,
    pub dst: String,
}

impl RawEdge {
    pub fn new(src: &str, dst: &str) -> Self {
        Self {
            src: clip(src),
            dst: clip(dst),
        }
    }
}

fn clip(name: &str) -> String {
    name.chars().take(MAX_NAME).collect()
}

/// Parse edge pairs out of line-oriented text. Lines that do not carry two
/// tokens are skipped, never an error.
pub fn parse_edges(text: &str) -> Vec<RawEdge> {
    let mut edges = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut tokens = trimmed.split_whitespace();
        if let (Some(src), Some(dst)) = (tokens.next(), tokens.next()) {
            edges.push(RawEdge::new(src, dst));
        }
    }
    edges
}

/// The graph rendered when no input file is given: a small build pipeline.
pub fn default_edges() -> Vec<RawEdge> {
    const PAIRS: [(&str, &str); 17] = [
        ("init", "parse"),
        ("init", "config"),
        ("fetch", "transform"),
        ("parse", "fetch"),
        ("parse", "validate"),
        ("parse", "build"),
        ("config", "lint"),
        ("config", "transform"),
        ("config", "build"),
        ("config", "deploy"),
        ("transform", "bundle"),
        ("validate", "bundle"),
        ("validate", "test"),
        ("build", "validate"),
        ("deploy", "test"),
        ("bundle", "publish"),
        ("test", "publish"),
    ];
    PAIRS
        .iter()
        .map(|&(src, dst)| RawEdge::new(src, dst))
        .collect()
}

/// Build the graph from raw pairs. Identifier order is first-sight order;
/// duplicate pairs collapse inside `add_edge`. Self-edges are dropped: they
/// cannot be layered.
pub fn build_graph(edges: &[RawEdge]) -> DagGraph {
    let mut graph = DagGraph::new();
    for edge in edges {
        let src = graph.find_or_add(&edge.src);
        let dst = graph.find_or_add(&edge.dst);
        if src != dst {
            graph.add_edge(src, dst);
        }
    }
    graph
}

// ─── Tests ───────────────────────────────────────────────────────────────────
