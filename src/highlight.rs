//! Selection highlighting: emphasise every edge stroke and terminal label
//! connected to the selected vertex.
//!
//! Both traversals run through dummy vertices and stop at the first real
//! endpoint, so a long edge lights up along its whole dummy chain while the
//! walk never continues past another labelled vertex.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;

use crate::graph::DagGraph;
use crate::renderers::Canvas;

/// Per-cell highlight bitmap over the canvas for `selected`.
///
/// The selected vertex itself is left unmarked; the shell renders it in
/// reverse video instead.
pub fn compute(canvas: &Canvas, graph: &DagGraph, selected: Option<NodeIndex>) -> Vec<bool> {
    let mut marks = vec![false; canvas.width * canvas.height];
    let Some(start) = selected else {
        return marks;
    };

    let mut connected: HashSet<NodeIndex> = HashSet::new();

    // descendants
    let mut visited = HashSet::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        for next in graph.out_neighbors(id) {
            mark_span(&mut marks, canvas, id, next);
            if graph.node(next).is_dummy {
                stack.push(next);
            } else {
                connected.insert(next);
            }
        }
    }

    // ancestors
    let mut visited = HashSet::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        for prev in graph.in_neighbors(id) {
            mark_span(&mut marks, canvas, prev, id);
            if graph.node(prev).is_dummy {
                stack.push(prev);
            } else {
                connected.insert(prev);
            }
        }
    }

    for id in connected {
        if let Some(b) = canvas.label_box(id) {
            for x in b.x_start..=b.x_end {
                if x >= 0 && (x as usize) < canvas.width {
                    marks[b.row * canvas.width + x as usize] = true;
                }
            }
        }
    }
    marks
}

fn mark_span(marks: &mut [bool], canvas: &Canvas, src: NodeIndex, dst: NodeIndex) {
    if let Some(cells) = canvas.path_span(src, dst) {
        for &(row, col) in cells {
            marks[row * canvas.width + col] = true;
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{sugiyama, Layout};
    use crate::parse::{build_graph, parse_edges};
    use crate::renderers::recommended_width;

    fn setup(text: &str) -> (Layout, Canvas) {
        let layout = sugiyama(&build_graph(&parse_edges(text)));
        let width = recommended_width(&layout);
        let canvas = Canvas::build(&layout, width);
        (layout, canvas)
    }

    fn label_marked(marks: &[bool], canvas: &Canvas, id: NodeIndex) -> bool {
        let b = canvas.label_box(id).unwrap();
        (b.x_start..=b.x_end)
            .filter(|&x| x >= 0 && (x as usize) < canvas.width)
            .all(|x| marks[b.row * canvas.width + x as usize])
    }

    #[test]
    fn test_no_selection_is_blank() {
        let (layout, canvas) = setup("a b\n");
        let marks = compute(&canvas, &layout.graph, None);
        assert!(marks.iter().all(|&m| !m));
    }

    #[test]
    fn test_chain_marks_edge_and_terminal() {
        let (layout, canvas) = setup("alpha beta\n");
        let a = layout.graph.find("alpha").unwrap();
        let b = layout.graph.find("beta").unwrap();
        let marks = compute(&canvas, &layout.graph, Some(a));
        for &(row, col) in canvas.path_span(a, b).unwrap() {
            assert!(marks[row * canvas.width + col]);
        }
        assert!(label_marked(&marks, &canvas, b));
        // the selected vertex is not a connected terminal: only the cell where
        // its edge leaves is lit, never the whole label
        assert!(!label_marked(&marks, &canvas, a));
    }

    #[test]
    fn test_diamond_marks_direct_neighbors() {
        let (layout, canvas) = setup("a b\na c\nb d\nc d\n");
        let a = layout.graph.find("a").unwrap();
        let b = layout.graph.find("b").unwrap();
        let c = layout.graph.find("c").unwrap();
        let d = layout.graph.find("d").unwrap();
        let marks = compute(&canvas, &layout.graph, Some(b));
        // one hop each way from b
        assert!(label_marked(&marks, &canvas, a));
        assert!(label_marked(&marks, &canvas, d));
        // c is two original edges away and stays dark
        assert!(!label_marked(&marks, &canvas, c));
    }

    #[test]
    fn test_traversal_continues_through_dummies() {
        let (layout, canvas) = setup("a b\nb c\na c\n");
        let a = layout.graph.find("a").unwrap();
        let c = layout.graph.find("c").unwrap();
        let d = layout.graph.find("_d0").unwrap();
        let marks = compute(&canvas, &layout.graph, Some(a));
        assert!(label_marked(&marks, &canvas, c));
        for &(row, col) in canvas.path_span(a, d).unwrap() {
            assert!(marks[row * canvas.width + col]);
        }
        for &(row, col) in canvas.path_span(d, c).unwrap() {
            assert!(marks[row * canvas.width + col]);
        }
    }

    #[test]
    fn test_backward_traversal_through_dummies() {
        let (layout, canvas) = setup("a b\nb c\na c\n");
        let a = layout.graph.find("a").unwrap();
        let c = layout.graph.find("c").unwrap();
        let marks = compute(&canvas, &layout.graph, Some(c));
        assert!(label_marked(&marks, &canvas, a));
    }

    #[test]
    fn test_cycle_does_not_loop_forever() {
        let (layout, canvas) = setup("a b\nb a\n");
        let a = layout.graph.find("a").unwrap();
        let b = layout.graph.find("b").unwrap();
        let marks = compute(&canvas, &layout.graph, Some(a));
        assert!(label_marked(&marks, &canvas, b));
    }
}
