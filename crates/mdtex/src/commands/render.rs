//! `mdtex render` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdtex_config::{CliSettings, Config};
use mdtex_renderer::{Node, assemble, markdown};

use super::{document_meta, file_stem, page_layout, read_source, renderer, write_and_compile};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file, or a JSON document tree with `--json`.
    input: PathBuf,

    /// Output `.tex` file (default: `<output_dir>/<input stem>.tex`).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output directory (overrides `[compile] output_dir`).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Read the input as a JSON document tree.
    #[arg(long)]
    json: bool,

    /// Write only the normalized body, without the document skeleton.
    #[arg(long)]
    body_only: bool,

    /// Document title (overrides config; default: input file stem).
    #[arg(long)]
    title: Option<String>,

    /// Document author (overrides config).
    #[arg(long, env = "MDTEX_AUTHOR")]
    author: Option<String>,

    /// Compile the result to PDF.
    #[arg(long)]
    compile: bool,

    /// Path to configuration file (default: auto-discover mdtex.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;

        let source = read_source(&self.input)?;
        let tree: Node = if self.json {
            serde_json::from_str(&source)?
        } else {
            markdown::parse(&source)
        };

        output.info(format_args!("Rendering {}", self.input.display()));
        let result = renderer(&config).render(&tree)?;
        output.warnings(&result.warnings);

        let stem = file_stem(&self.input);
        let latex = if self.body_only {
            format!("{}\n", result.body)
        } else {
            let meta = document_meta(&config, || stem.clone());
            assemble(&result.body, &meta, &page_layout(&config))
        };

        let tex_path = self
            .output
            .unwrap_or_else(|| config.compile_resolved.output_dir.join(format!("{stem}.tex")));

        let compile_pdf = config.compile_resolved.enabled && !self.body_only;
        if config.compile_resolved.enabled && self.body_only {
            output.warning("Skipping compilation: body-only output is not a standalone document");
        }
        write_and_compile(&output, &config, &tex_path, &latex, compile_pdf)
    }

    /// Flags that override the loaded config.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            title: self.title.clone(),
            author: self.author.clone(),
            output_dir: self.output_dir.clone(),
            compile: self.compile.then_some(true),
        }
    }
}
