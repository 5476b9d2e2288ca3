//! dagviz CLI entry point.

use std::fs;
use std::io::{self, Read, Write};
use std::process;

use clap::Parser;

use dagviz::layout::sugiyama;
use dagviz::parse::{self, DagError, RawEdge};
use dagviz::renderers::{recommended_width, Canvas};
use dagviz::tui;

/// Render a directed graph as a Unicode diagram in the terminal.
#[derive(Parser, Debug)]
#[command(
    name = "dagviz",
    about = "Render a directed graph as a Unicode diagram in the terminal"
)]
struct Cli {
    /// Edge-list file; "-" reads from standard input. Omit for a demo graph.
    input: Option<String>,

    /// Print the canvas to standard output and exit
    #[arg(long = "print")]
    print: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let edges = match read_input(cli.input.as_deref()) {
        Ok(edges) => edges,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let graph = parse::build_graph(&edges);
    let layout = sugiyama(&graph);
    let canvas = Canvas::build(&layout, recommended_width(&layout));

    if cli.print {
        print!("{}", canvas.to_text());
        if let Err(e) = io::stdout().flush() {
            eprintln!("error: cannot flush stdout: {}", e);
            process::exit(1);
        }
    } else if let Err(e) = tui::run(&layout.graph, &canvas) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

/// Pick the edge source from the CLI argument: a file, `-` for stdin, or the
/// built-in demo graph when no argument is given.
fn read_input(arg: Option<&str>) -> Result<Vec<RawEdge>, DagError> {
    let edges = match arg {
        None => parse::default_edges(),
        Some("-") => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| DagError::Read {
                    path: "<stdin>".into(),
                    source,
                })?;
            parse::parse_edges(&text)
        }
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| DagError::Read {
                path: path.into(),
                source,
            })?;
            parse::parse_edges(&text)
        }
    };
    if edges.is_empty() {
        return Err(DagError::EmptyEdgeList);
    }
    Ok(edges)
}
