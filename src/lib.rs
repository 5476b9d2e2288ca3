//! dagviz — directed-graph diagrams in the terminal.
//!
//! Pipeline: edge list → graph store → layered layout → glyph canvas.
//! `render_text()` runs the whole batch path; the interactive shell in
//! `tui` drives the same pieces with scrolling and selection highlighting.

pub mod config;
pub mod graph;
pub mod highlight;
pub mod layout;
pub mod parse;
pub mod renderers;
pub mod tui;

pub use graph::DagGraph;
pub use layout::Layout;
pub use parse::DagError;
pub use renderers::Canvas;

/// Render edge-list text straight to canvas text.
///
/// Rows have trailing spaces stripped and are joined with newlines; nothing
/// follows the final row.
pub fn render_text(input: &str) -> Result<String, DagError> {
    let edges = parse::parse_edges(input);
    if edges.is_empty() {
        return Err(DagError::EmptyEdgeList);
    }
    let graph = parse::build_graph(&edges);
    let layout = layout::sugiyama(&graph);
    let width = renderers::recommended_width(&layout);
    Ok(Canvas::build(&layout, width).to_text())
}
