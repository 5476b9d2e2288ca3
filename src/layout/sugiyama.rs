//! Sugiyama layered layout: cycle ordering, back-edge reversal, layer
//! assignment, long-edge decomposition, crossing minimisation.
//!
//! Back-edges are reversed only on a working clone; the graph handed to the
//! rasterizer keeps every edge in its user-facing direction and meets the
//! layering through shared layer indices.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use super::types::Layout;
use crate::graph::DagGraph;

/// Run the full layout pipeline.
pub fn sugiyama(orig: &DagGraph) -> Layout {
    let order = cycle_order(orig);
    let acyclic = invert_back_edges(orig, &order);
    debug_assert!(acyclic.is_dag());
    let mut layers = assign_layers(&acyclic);
    let graph = split_long_edges(orig, &mut layers);
    let layers = minimise_crossings(&graph, layers);
    log::debug!(
        "layout: {} layers, {} vertices ({} dummies)",
        layers.len(),
        graph.active_nodes().count(),
        graph.active_nodes().filter(|&n| graph.node(n).is_dummy).count(),
    );
    Layout { graph, layers }
}

// ─── Phase 1: cycle ordering ─────────────────────────────────────────────────

/// Greedy total order for cycle breaking: peel source batches to the left,
/// sink batches to the right, and when neither exists take the vertex with
/// the largest out-degree minus in-degree (ties to the lowest identifier).
/// Every step removes at least one vertex, so this terminates.
fn cycle_order(g: &DagGraph) -> Vec<NodeIndex> {
    let mut tmp = g.clone();
    let mut left = Vec::new();
    let mut right = Vec::new();

    loop {
        let active: Vec<NodeIndex> = tmp.active_nodes().collect();
        if active.is_empty() {
            break;
        }

        let sources: Vec<NodeIndex> = active
            .iter()
            .copied()
            .filter(|&id| tmp.in_degree(id) == 0)
            .collect();
        if !sources.is_empty() {
            for &id in &sources {
                tmp.remove_node(id);
            }
            left.extend(sources);
            continue;
        }

        let sinks: Vec<NodeIndex> = active
            .iter()
            .copied()
            .filter(|&id| tmp.out_degree(id) == 0)
            .collect();
        if !sinks.is_empty() {
            for &id in &sinks {
                tmp.remove_node(id);
            }
            right.extend(sinks);
            continue;
        }

        let mut best = active[0];
        let mut best_rank = i64::MIN;
        for &id in &active {
            let rank = tmp.out_degree(id) as i64 - tmp.in_degree(id) as i64;
            if rank > best_rank {
                best_rank = rank;
                best = id;
            }
        }
        left.push(best);
        tmp.remove_node(best);
    }

    left.extend(right);
    left
}

// ─── Phase 1b: back-edge reversal ────────────────────────────────────────────

/// Reverse every edge whose destination precedes its source in `order`.
/// Returns an acyclic clone; the input graph is untouched.
fn invert_back_edges(orig: &DagGraph, order: &[NodeIndex]) -> DagGraph {
    let mut g = orig.clone();
    let mut position = vec![usize::MAX; g.node_count()];
    for (i, &id) in order.iter().enumerate() {
        position[id.index()] = i;
    }

    let mut back_edges = Vec::new();
    for &id in order {
        for child in g.out_neighbors(id) {
            if position[child.index()] < position[id.index()] {
                back_edges.push((id, child));
            }
        }
    }
    log::debug!("reversing {} back-edges", back_edges.len());
    g.twist(&back_edges);
    g
}

// ─── Phase 2: layer assignment ───────────────────────────────────────────────

/// Peel sink batches bottom-up, then reverse so layer 0 is the top of the
/// drawing and true sources land there.
fn assign_layers(acyclic: &DagGraph) -> Vec<Vec<NodeIndex>> {
    let mut tmp = acyclic.clone();
    let mut layers = Vec::new();

    loop {
        let sinks: Vec<NodeIndex> = tmp
            .active_nodes()
            .filter(|&id| tmp.out_degree(id) == 0)
            .collect();
        if sinks.is_empty() {
            break;
        }
        for &id in &sinks {
            tmp.remove_node(id);
        }
        layers.push(sinks);
    }

    layers.reverse();
    layers
}

// ─── Phase 2b: long-edge decomposition ───────────────────────────────────────

/// On a fresh clone of the original graph, stamp layer indices and replace
/// every edge spanning more than one layer with a chain of dummy vertices,
/// one per intermediate layer, appended at the end of each layer's order.
/// The chain runs in the edge's own direction, so an upward edge stays an
/// upward chain.
fn split_long_edges(orig: &DagGraph, layers: &mut [Vec<NodeIndex>]) -> DagGraph {
    let mut g = orig.clone();
    for (index, layer) in layers.iter().enumerate() {
        for &id in layer {
            g.node_mut(id).layer = index;
        }
    }

    let mut long_edges = Vec::new();
    for layer in layers.iter() {
        for &id in layer {
            for child in g.out_neighbors(id) {
                if g.node(id).layer.abs_diff(g.node(child).layer) > 1 {
                    long_edges.push((id, child));
                }
            }
        }
    }

    let mut dummy_id = 0;
    for (src, dst) in long_edges {
        let from = g.node(src).layer as i64;
        let to = g.node(dst).layer as i64;
        let step = if to > from { 1 } else { -1 };
        g.remove_edge(src, dst);

        let mut prev = src;
        let mut level = from + step;
        while level != to {
            let dummy = g.add_dummy(&format!("_d{dummy_id}"), level as usize);
            dummy_id += 1;
            g.add_edge(prev, dummy);
            layers[level as usize].push(dummy);
            prev = dummy;
            level += step;
        }
        g.add_edge(prev, dst);
    }
    if dummy_id > 0 {
        log::debug!("split long edges through {dummy_id} dummies");
    }
    g
}

// ─── Phase 3: crossing minimisation ──────────────────────────────────────────

/// Reorder layers bottom-up against the already-fixed layer below. The
/// bottommost layer is taken as-is.
fn minimise_crossings(g: &DagGraph, layers: Vec<Vec<NodeIndex>>) -> Vec<Vec<NodeIndex>> {
    if layers.len() < 2 {
        return layers;
    }

    let mut result = Vec::with_capacity(layers.len());
    result.push(layers[layers.len() - 1].clone());
    for i in (0..layers.len() - 1).rev() {
        let upper = &layers[i];
        let matrix = crossing_costs(g, upper, result.last().unwrap());
        let positions: Vec<usize> = (0..upper.len()).collect();
        let order = merge_by_cost(&positions, &matrix);
        result.push(order.iter().map(|&p| upper[p]).collect());
    }
    result.reverse();
    result
}

/// `matrix[u][v]` counts the crossings incurred by placing `u` left of `v`
/// (positions within `upper`). Edges in both directions into `lower` count.
fn crossing_costs(g: &DagGraph, upper: &[NodeIndex], lower: &[NodeIndex]) -> Vec<Vec<u32>> {
    let lower_pos: HashMap<NodeIndex, usize> =
        lower.iter().enumerate().map(|(i, &id)| (id, i)).collect();
    let slots: Vec<Vec<usize>> = upper
        .iter()
        .map(|&id| neighbor_slots(g, id, &lower_pos))
        .collect();

    let n = upper.len();
    let mut matrix = vec![vec![0u32; n]; n];
    for u in 0..n {
        for v in u + 1..n {
            for &a in &slots[u] {
                for &b in &slots[v] {
                    if a > b {
                        matrix[u][v] += 1;
                    }
                    if a < b {
                        matrix[v][u] += 1;
                    }
                }
            }
        }
    }
    matrix
}

/// Positions in the fixed lower layer of every neighbour (either direction)
/// of `id` that lives there.
fn neighbor_slots(
    g: &DagGraph,
    id: NodeIndex,
    lower_pos: &HashMap<NodeIndex, usize>,
) -> Vec<usize> {
    let mut slots = Vec::new();
    for neighbor in g.out_neighbors(id) {
        if let Some(&p) = lower_pos.get(&neighbor) {
            slots.push(p);
        }
    }
    for neighbor in g.in_neighbors(id) {
        if let Some(&p) = lower_pos.get(&neighbor) {
            slots.push(p);
        }
    }
    slots
}

/// Stable merge sort over layer positions whose comparator consults the
/// crossing-cost matrix; the left candidate wins ties.
fn merge_by_cost(positions: &[usize], matrix: &[Vec<u32>]) -> Vec<usize> {
    if positions.len() < 2 {
        return positions.to_vec();
    }
    let pivot = positions.len() / 2;
    let left = merge_by_cost(&positions[..pivot], matrix);
    let right = merge_by_cost(&positions[pivot..], matrix);

    let mut merged = Vec::with_capacity(positions.len());
    let (mut li, mut ri) = (0, 0);
    while li < left.len() && ri < right.len() {
        if matrix[left[li]][right[ri]] <= matrix[right[ri]][left[li]] {
            merged.push(left[li]);
            li += 1;
        } else {
            merged.push(right[ri]);
            ri += 1;
        }
    }
    merged.extend_from_slice(&left[li..]);
    merged.extend_from_slice(&right[ri..]);
    merged
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{build_graph, default_edges, parse_edges};
    use std::collections::HashSet;

    fn graph_of(text: &str) -> DagGraph {
        build_graph(&parse_edges(text))
    }

    fn id_of(layout: &Layout, name: &str) -> NodeIndex {
        layout.graph.find(name).unwrap()
    }

    fn layer_names(layout: &Layout, layer: usize) -> Vec<String> {
        layout.layers[layer]
            .iter()
            .map(|&id| layout.graph.node(id).name.clone())
            .collect()
    }

    /// Every active vertex appears in exactly one layer.
    fn assert_layering_total(layout: &Layout) {
        let mut seen = HashSet::new();
        for layer in &layout.layers {
            for &id in layer {
                assert!(seen.insert(id), "vertex listed twice in layers");
            }
        }
        let active: HashSet<NodeIndex> = layout.graph.active_nodes().collect();
        assert_eq!(seen, active);
    }

    /// Every post-layout edge connects adjacent layers.
    fn assert_adjacent_layers_only(layout: &Layout) {
        for src in layout.graph.active_nodes() {
            for dst in layout.graph.out_neighbors(src) {
                let diff = layout
                    .graph
                    .node(src)
                    .layer
                    .abs_diff(layout.graph.node(dst).layer);
                assert_eq!(diff, 1, "edge spans {diff} layers after decomposition");
            }
        }
    }

    // ── Scenario graphs ───────────────────────────────────────────────────────

    #[test]
    fn test_two_node_chain() {
        let layout = sugiyama(&graph_of("a b\n"));
        assert_eq!(layout.layer_count(), 2);
        assert_eq!(layer_names(&layout, 0), vec!["a"]);
        assert_eq!(layer_names(&layout, 1), vec!["b"]);
        assert_layering_total(&layout);
        assert_adjacent_layers_only(&layout);
    }

    #[test]
    fn test_diamond() {
        let layout = sugiyama(&graph_of("a b\na c\nb d\nc d\n"));
        assert_eq!(layout.layer_count(), 3);
        assert_eq!(layer_names(&layout, 0), vec!["a"]);
        assert_eq!(layer_names(&layout, 2), vec!["d"]);
        let mut middle = layer_names(&layout, 1);
        middle.sort();
        assert_eq!(middle, vec!["b", "c"]);
        assert_layering_total(&layout);
        assert_adjacent_layers_only(&layout);
    }

    #[test]
    fn test_simple_cycle() {
        let layout = sugiyama(&graph_of("a b\nb a\n"));
        assert_eq!(layout.layer_count(), 2);
        assert_eq!(layout.layers[0].len(), 1);
        assert_eq!(layout.layers[1].len(), 1);
        // rendered graph keeps both user edges
        let a = id_of(&layout, "a");
        let b = id_of(&layout, "b");
        assert!(layout.graph.has_edge(a, b));
        assert!(layout.graph.has_edge(b, a));
        assert_adjacent_layers_only(&layout);
    }

    #[test]
    fn test_triangle_with_back_edge() {
        let layout = sugiyama(&graph_of("a b\nb c\nc a\n"));
        assert_eq!(layout.layer_count(), 3);
        for layer in 0..3 {
            let real: Vec<String> = layer_names(&layout, layer)
                .into_iter()
                .filter(|n| !n.starts_with("_d"))
                .collect();
            assert_eq!(real.len(), 1);
        }
        assert_layering_total(&layout);
        assert_adjacent_layers_only(&layout);
    }

    #[test]
    fn test_long_edge_gets_dummy_chain() {
        let layout = sugiyama(&graph_of("a b\nb c\na c\n"));
        assert_eq!(layout.layer_count(), 3);
        assert_eq!(layer_names(&layout, 0), vec!["a"]);
        let mut middle = layer_names(&layout, 1);
        middle.sort();
        assert_eq!(middle, vec!["_d0", "b"]);
        assert_eq!(layer_names(&layout, 2), vec!["c"]);

        // the chain carries the original a → c direction
        let a = id_of(&layout, "a");
        let c = id_of(&layout, "c");
        let d = id_of(&layout, "_d0");
        assert!(layout.graph.node(d).is_dummy);
        assert!(layout.graph.has_edge(a, d));
        assert!(layout.graph.has_edge(d, c));
        assert!(!layout.graph.has_edge(a, c));
        assert_adjacent_layers_only(&layout);
    }

    #[test]
    fn test_reversed_long_edge_chains_upward() {
        // c → a is a back-edge spanning two layers; its dummy chain must run
        // upward so the rendered direction stays c → a.
        let layout = sugiyama(&graph_of("a b\nb c\nc a\n"));
        let a = id_of(&layout, "a");
        let c = id_of(&layout, "c");
        let d = id_of(&layout, "_d0");
        assert!(layout.graph.has_edge(c, d));
        assert!(layout.graph.has_edge(d, a));
        assert_eq!(layout.graph.node(d).layer, 1);
    }

    #[test]
    fn test_default_graph_layout() {
        let layout = sugiyama(&build_graph(&default_edges()));
        assert!(layout.layer_count() >= 5);
        assert_layering_total(&layout);
        assert_adjacent_layers_only(&layout);
        assert_eq!(layer_names(&layout, 0), vec!["init"]);
    }

    // ── Phase internals ───────────────────────────────────────────────────────

    #[test]
    fn test_cycle_order_peels_sources_first() {
        let g = graph_of("a b\nb c\n");
        let order = cycle_order(&g);
        let names: Vec<&str> = order.iter().map(|&id| g.node(id).name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cycle_order_covers_every_vertex_once() {
        let g = graph_of("a b\nb c\nc a\nc d\nd b\n");
        let order = cycle_order(&g);
        let unique: HashSet<NodeIndex> = order.iter().copied().collect();
        assert_eq!(unique.len(), g.active_nodes().count());
        assert_eq!(order.len(), unique.len());
    }

    #[test]
    fn test_invert_back_edges_yields_dag() {
        let g = graph_of("a b\nb c\nc a\nb d\nd a\n");
        assert!(!g.is_dag());
        let order = cycle_order(&g);
        let acyclic = invert_back_edges(&g, &order);
        assert!(acyclic.is_dag());
        assert_eq!(acyclic.edge_count(), g.edge_count());
    }

    #[test]
    fn test_assign_layers_bottom_up() {
        let g = graph_of("a b\nb c\n");
        let layers = assign_layers(&g);
        let names: Vec<Vec<&str>> = layers
            .iter()
            .map(|layer| layer.iter().map(|&id| g.node(id).name.as_str()).collect())
            .collect();
        assert_eq!(names, vec![vec!["a"], vec!["b"], vec!["c"]]);
    }

    #[test]
    fn test_crossing_minimisation_swaps_crossed_pair() {
        // a → d and b → c cross when the upper layer reads [a, b]
        let mut g = DagGraph::new();
        let a = g.add("a");
        let b = g.add("b");
        let c = g.add("c");
        let d = g.add("d");
        g.add_edge(a, d);
        g.add_edge(b, c);
        let layers = vec![vec![a, b], vec![c, d]];
        let result = minimise_crossings(&g, layers);
        assert_eq!(result[0], vec![b, a]);
        assert_eq!(result[1], vec![c, d]);
    }

    #[test]
    fn test_crossing_costs_matrix() {
        let mut g = DagGraph::new();
        let a = g.add("a");
        let b = g.add("b");
        let c = g.add("c");
        let d = g.add("d");
        g.add_edge(a, d);
        g.add_edge(b, c);
        let matrix = crossing_costs(&g, &[a, b], &[c, d]);
        assert_eq!(matrix[0][1], 1);
        assert_eq!(matrix[1][0], 0);
    }

    #[test]
    fn test_merge_by_cost_is_stable_on_ties() {
        let matrix = vec![vec![0; 3]; 3];
        assert_eq!(merge_by_cost(&[0, 1, 2], &matrix), vec![0, 1, 2]);
    }

    #[test]
    fn test_single_layer_taken_as_is() {
        let mut g = DagGraph::new();
        let a = g.add("a");
        let b = g.add("b");
        let layers = vec![vec![b, a]];
        assert_eq!(minimise_crossings(&g, layers.clone()), layers);
    }
}
