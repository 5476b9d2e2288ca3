//! Interactive shell: draws the canvas, tracks scroll and selection, and
//! feeds selection changes back through the highlight engine.
//!
//! One blocking event read per iteration drives a full recompute and redraw;
//! there is no background work and no shared state.

use std::io::{self, Write};

use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use petgraph::graph::NodeIndex;

use crate::config::{DRAW_MARGIN, SCROLL_STEP};
use crate::graph::DagGraph;
use crate::highlight;
use crate::renderers::{Canvas, LabelBox};

/// Restores the terminal on drop, so a panic or early return cannot leave raw
/// mode or the alternate screen behind.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("enabling raw mode")?;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            Hide
        )
        .context("entering alternate screen")?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, DisableMouseCapture, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Run the blocking event loop until the user quits.
pub fn run(graph: &DagGraph, canvas: &Canvas) -> Result<()> {
    let _guard = TerminalGuard::enter()?;
    let mut out = io::stdout();
    let step = SCROLL_STEP as i64;
    let mut scroll_x: i64 = 0;
    let mut scroll_y: i64 = 0;
    let mut selected: Option<NodeIndex> = None;

    loop {
        let (cols, rows) = terminal::size().context("querying terminal size")?;
        let (max_x, max_y) = max_scroll(
            (canvas.width, canvas.height),
            (cols as usize, rows as usize),
        );
        scroll_x = scroll_x.clamp(0, max_x as i64);
        scroll_y = scroll_y.clamp(0, max_y as i64);

        let marks = highlight::compute(canvas, graph, selected);
        draw(
            &mut out,
            canvas,
            &marks,
            selected.and_then(|id| canvas.label_box(id)),
            (scroll_x as usize, scroll_y as usize),
            (cols as usize, rows as usize),
        )
        .context("drawing canvas")?;

        match event::read().context("reading terminal event")? {
            Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                KeyCode::Char('q') | KeyCode::Char('Q') => break,
                KeyCode::Char(' ') => selected = None,
                KeyCode::Left | KeyCode::Char('a') => scroll_x -= step,
                KeyCode::Right | KeyCode::Char('d') => scroll_x += step,
                KeyCode::Up | KeyCode::Char('z') => scroll_y -= step,
                KeyCode::Down | KeyCode::Char('s') => scroll_y += step,
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => scroll_y -= step,
                MouseEventKind::ScrollDown => scroll_y += step,
                MouseEventKind::Down(MouseButton::Left) => {
                    let hit = canvas.hit_test(
                        mouse.column as i64 + scroll_x,
                        mouse.row as i64 + scroll_y,
                    );
                    selected = toggle_selection(selected, hit);
                }
                _ => {}
            },
            Event::Resize(..) => {}
            _ => {}
        }
    }
    Ok(())
}

/// Largest permitted scroll offsets for a canvas inside a terminal, keeping
/// one spare column at the right edge.
fn max_scroll(canvas: (usize, usize), term: (usize, usize)) -> (usize, usize) {
    let (width, height) = canvas;
    let (cols, rows) = term;
    (
        width.saturating_sub(cols),
        height.saturating_sub(rows.saturating_sub(DRAW_MARGIN)),
    )
}

/// Click semantics: clicking the selected vertex (or empty space) clears the
/// selection; clicking another vertex moves it.
fn toggle_selection(
    current: Option<NodeIndex>,
    clicked: Option<NodeIndex>,
) -> Option<NodeIndex> {
    if clicked == current {
        None
    } else {
        clicked
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellStyle {
    Blank,
    Stroke,
    Highlight,
    Selected,
}

fn cell_style(
    canvas: &Canvas,
    marks: &[bool],
    selected_box: Option<LabelBox>,
    col: usize,
    row: usize,
) -> CellStyle {
    if let Some(b) = selected_box {
        if row == b.row && (col as i64) >= b.x_start && (col as i64) <= b.x_end {
            return CellStyle::Selected;
        }
    }
    if marks[row * canvas.width + col] {
        return CellStyle::Highlight;
    }
    if canvas.glyph(col, row) != ' ' {
        CellStyle::Stroke
    } else {
        CellStyle::Blank
    }
}

/// Repaint the visible window, batching runs of equally-styled cells.
fn draw(
    out: &mut impl Write,
    canvas: &Canvas,
    marks: &[bool],
    selected_box: Option<LabelBox>,
    (scroll_x, scroll_y): (usize, usize),
    (cols, rows): (usize, usize),
) -> io::Result<()> {
    let draw_width = cols.saturating_sub(DRAW_MARGIN);
    queue!(out, Clear(ClearType::All))?;

    for screen_row in 0..rows {
        let row = scroll_y + screen_row;
        if row >= canvas.height {
            break;
        }
        queue!(out, MoveTo(0, screen_row as u16))?;
        let mut run = String::new();
        let mut run_style = CellStyle::Blank;
        for screen_col in 0..draw_width {
            let col = scroll_x + screen_col;
            if col >= canvas.width {
                break;
            }
            let style = cell_style(canvas, marks, selected_box, col, row);
            if style != run_style && !run.is_empty() {
                flush_run(out, run_style, &run)?;
                run.clear();
            }
            run_style = style;
            run.push(canvas.glyph(col, row));
        }
        if !run.is_empty() {
            flush_run(out, run_style, &run)?;
        }
    }
    out.flush()
}

fn flush_run(out: &mut impl Write, style: CellStyle, text: &str) -> io::Result<()> {
    match style {
        CellStyle::Blank => queue!(out, SetAttribute(Attribute::Reset), ResetColor, Print(text)),
        CellStyle::Stroke => queue!(
            out,
            SetAttribute(Attribute::Reset),
            SetForegroundColor(Color::White),
            Print(text)
        ),
        CellStyle::Highlight => queue!(
            out,
            SetAttribute(Attribute::Reset),
            SetAttribute(Attribute::Bold),
            SetForegroundColor(Color::Yellow),
            Print(text)
        ),
        CellStyle::Selected => queue!(
            out,
            SetAttribute(Attribute::Reset),
            SetAttribute(Attribute::Reverse),
            SetForegroundColor(Color::Yellow),
            Print(text)
        ),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
