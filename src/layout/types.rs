//! Layout output types.

use petgraph::graph::NodeIndex;

use crate::graph::DagGraph;

/// A laid-out graph: the graph to render (long edges split through dummies,
/// user-facing edge directions intact) plus the ordered layers.
#[derive(Debug, Clone)]
pub struct Layout {
    pub graph: DagGraph,
    /// Layer 0 is the top of the drawing; order within a layer is the
    /// horizontal order chosen by crossing minimisation.
    pub layers: Vec<Vec<NodeIndex>>,
}

impl Layout {
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Width of the widest layer, never less than 1.
    pub fn widest_layer(&self) -> usize {
        self.layers.iter().map(Vec::len).max().unwrap_or(0).max(1)
    }

    /// `(layer, position)` of a vertex, scanning the layer lists.
    pub fn position(&self, id: NodeIndex) -> Option<(usize, usize)> {
        for (layer, nodes) in self.layers.iter().enumerate() {
            if let Some(pos) = nodes.iter().position(|&n| n == id) {
                return Some((layer, pos));
            }
        }
        None
    }
}
