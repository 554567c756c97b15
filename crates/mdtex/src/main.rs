//! mdtex CLI - Markdown to LaTeX renderer.
//!
//! Provides commands for:
//! - `render`: Render one markdown file (or JSON document tree) to LaTeX
//! - `paper`: Lay out several exercise files as one exam paper

mod commands;
mod compile;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{PaperArgs, RenderArgs};
use output::Output;

/// mdtex - Markdown to LaTeX renderer.
#[derive(Parser)]
#[command(name = "mdtex", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a document to LaTeX.
    Render(RenderArgs),
    /// Render exercise files into one exam paper.
    Paper(PaperArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Render(args) => args.verbose,
            Self::Paper(args) => args.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Paper(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(format_args!("Error: {err}"));
        std::process::exit(1);
    }
}
