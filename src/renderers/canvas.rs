//! Canvas — glyph grid rasterised from a laid-out graph.
//!
//! Every edge is traced as three segments (vertical, horizontal, vertical).
//! Tracing only ORs direction bits into per-cell masks and records the cells
//! it visits; glyphs are resolved afterwards in a single pass over the mask
//! grid, then vertex labels are stamped on top.

use std::collections::HashMap;
use std::fmt;

use petgraph::graph::NodeIndex;

use super::connector::{CONNECTOR, DIR_E, DIR_N, DIR_S, DIR_W};
use crate::config::{CANVAS_MARGIN, EDGE_V_OFFSET, MIN_COLS_NODE, VERT_SPACING};
use crate::layout::Layout;

/// Where a vertex label landed, for hit-testing and highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelBox {
    pub row: usize,
    /// May lie left of column 0 when a label is wider than its slot.
    pub x_start: i64,
    pub x_end: i64,
}

/// Canvas width for a layout: the widest layer at
/// `max(MIN_COLS_NODE, longest_label + 2)` columns per node, plus the margin.
pub fn recommended_width(layout: &Layout) -> usize {
    let mut longest = 1;
    for id in layout.graph.active_nodes() {
        let node = layout.graph.node(id);
        if !node.is_dummy {
            longest = longest.max(node.name.chars().count());
        }
    }
    let cols_per_node = (longest + 2).max(MIN_COLS_NODE);
    cols_per_node * layout.widest_layer() + CANVAS_MARGIN
}

pub struct Canvas {
    pub width: usize,
    pub height: usize,
    cells: Vec<char>,
    dirs: Vec<u8>,
    /// `(row, col)` centre per vertex slot.
    positions: Vec<(usize, usize)>,
    labels: Vec<Option<LabelBox>>,
    /// Flat pool of every cell visited while tracing, in visit order.
    path: Vec<(usize, usize)>,
    /// Per-edge `(offset, len)` span into the pool.
    spans: HashMap<(NodeIndex, NodeIndex), (usize, usize)>,
}

impl Canvas {
    /// Rasterise a layout onto a `width`-column grid.
    pub fn build(layout: &Layout, width: usize) -> Self {
        let height = VERT_SPACING * layout.layer_count() + CANVAS_MARGIN;
        let node_slots = layout.graph.node_count();
        let mut cv = Self {
            width,
            height,
            cells: vec![' '; width * height],
            dirs: vec![0; width * height],
            positions: vec![(0, 0); node_slots],
            labels: vec![None; node_slots],
            path: Vec::with_capacity(8192),
            spans: HashMap::new(),
        };

        // vertex centres
        for (level, layer) in layout.layers.iter().enumerate() {
            let slots = layer.len().max(1);
            for (i, &id) in layer.iter().enumerate() {
                let col = ((i as f64 + 0.5) / slots as f64 * (width as f64 - 1.0)).round() as usize;
                cv.positions[id.index()] = (VERT_SPACING * level, col);
            }
        }

        // edge paths
        let graph = &layout.graph;
        for src in graph.active_nodes() {
            let (src_row, src_col) = cv.positions[src.index()];
            let edge_row = src_row + EDGE_V_OFFSET;
            for dst in graph.out_neighbors(src) {
                let (dst_row, dst_col) = cv.positions[dst.index()];
                let offset = cv.path.len();
                cv.trace_vline(src_col, src_row, edge_row);
                cv.trace_hline(edge_row, src_col, dst_col);
                cv.trace_vline(dst_col, edge_row, dst_row);
                cv.spans.insert((src, dst), (offset, cv.path.len() - offset));
            }
        }

        // masks → glyphs, one lookup per cell
        for (cell, &mask) in cv.cells.iter_mut().zip(cv.dirs.iter()) {
            *cell = CONNECTOR[mask as usize];
        }

        // labels over glyphs; dummies stay invisible
        for id in graph.active_nodes() {
            let node = graph.node(id);
            if node.is_dummy {
                continue;
            }
            let (row, col) = cv.positions[id.index()];
            let len = node.name.chars().count();
            let start = col as i64 - (len / 2) as i64;
            for (i, ch) in node.name.chars().enumerate() {
                let x = start + i as i64;
                if x >= 0 && (x as usize) < cv.width {
                    cv.cells[row * cv.width + x as usize] = ch;
                }
            }
            cv.labels[id.index()] = Some(LabelBox {
                row,
                x_start: start,
                x_end: start + len as i64 - 1,
            });
        }

        log::debug!(
            "canvas {}x{}, {} edge spans, {} path cells",
            cv.width,
            cv.height,
            cv.spans.len(),
            cv.path.len()
        );
        cv
    }

    fn add_dir(&mut self, x: i64, y: i64, dir: u8) {
        if x >= 0 && (x as usize) < self.width && y >= 0 && (y as usize) < self.height {
            self.dirs[y as usize * self.width + x as usize] |= dir;
        }
    }

    /// Walk a vertical segment, marking the leaving direction on each cell and
    /// the arriving direction on the next, so shared corners become junctions.
    /// A zero-length segment records the endpoint without touching any mask.
    fn trace_vline(&mut self, x: usize, y0: usize, y1: usize) {
        let step: i64 = if y1 > y0 { 1 } else { -1 };
        let (leave, arrive) = if step > 0 { (DIR_S, DIR_N) } else { (DIR_N, DIR_S) };
        let mut y = y0 as i64;
        while y != y1 as i64 {
            self.add_dir(x as i64, y, leave);
            self.path.push((y as usize, x));
            y += step;
            self.add_dir(x as i64, y, arrive);
        }
        self.path.push((y1, x));
    }

    fn trace_hline(&mut self, y: usize, x0: usize, x1: usize) {
        let step: i64 = if x1 > x0 { 1 } else { -1 };
        let (leave, arrive) = if step > 0 { (DIR_E, DIR_W) } else { (DIR_W, DIR_E) };
        let mut x = x0 as i64;
        while x != x1 as i64 {
            self.add_dir(x, y as i64, leave);
            self.path.push((y, x as usize));
            x += step;
            self.add_dir(x, y as i64, arrive);
        }
        self.path.push((y, x1));
    }

    /// Glyph at a cell; space outside the canvas.
    pub fn glyph(&self, col: usize, row: usize) -> char {
        if col < self.width && row < self.height {
            self.cells[row * self.width + col]
        } else {
            ' '
        }
    }

    /// Raw direction mask at a cell; zero outside the canvas.
    pub fn dir_mask(&self, col: usize, row: usize) -> u8 {
        if col < self.width && row < self.height {
            self.dirs[row * self.width + col]
        } else {
            0
        }
    }

    /// `(row, col)` centre of a vertex.
    pub fn node_position(&self, id: NodeIndex) -> (usize, usize) {
        self.positions[id.index()]
    }

    pub fn label_box(&self, id: NodeIndex) -> Option<LabelBox> {
        self.labels.get(id.index()).copied().flatten()
    }

    /// The cells a rendered edge occupies, in trace order.
    pub fn path_span(&self, src: NodeIndex, dst: NodeIndex) -> Option<&[(usize, usize)]> {
        self.spans
            .get(&(src, dst))
            .map(|&(offset, len)| &self.path[offset..offset + len])
    }

    /// The vertex whose label box contains the canvas coordinate, if any.
    pub fn hit_test(&self, x: i64, y: i64) -> Option<NodeIndex> {
        for (slot, label) in self.labels.iter().enumerate() {
            if let Some(b) = label {
                if y == b.row as i64 && x >= b.x_start && x <= b.x_end {
                    return Some(NodeIndex::new(slot));
                }
            }
        }
        None
    }

    /// One line per row, trailing spaces stripped, nothing after the final row.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.height);
        for row in 0..self.height {
            let line: String = self.cells[row * self.width..(row + 1) * self.width]
                .iter()
                .collect();
            lines.push(line.trim_end().to_string());
        }
        lines.join("\n")
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
