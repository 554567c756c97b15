//! `mdtex paper` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use mdtex_config::{CliSettings, Config};
use mdtex_renderer::{Exercise, Paper, assemble, markdown};
use rayon::prelude::*;

use super::{
    collect_inputs, document_meta, file_stem, page_layout, read_source, renderer,
    write_and_compile,
};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the paper command.
#[derive(Args)]
pub(crate) struct PaperArgs {
    /// Exercise markdown files, or directories of them. The file stem is the
    /// exercise id.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output `.tex` file (default: `<output_dir>/paper.tex`).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output directory (overrides `[compile] output_dir`).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Document title (overrides config; default: `Topic Questions on <syllabus>`).
    #[arg(long)]
    title: Option<String>,

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

impl PaperArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;

        let files = collect_inputs(&self.inputs)?;
        if files.is_empty() {
            return Err(CliError::Validation("no exercise files found".to_owned()));
        }
        output.info(format_args!("Collecting {} exercise(s)", files.len()));

        let paper = load_paper(&files)?;
        let result = paper.render(&renderer(&config))?;
        output.warnings(&result.warnings);

        let meta = document_meta(&config, || paper.default_title());
        let latex = assemble(&result.body, &meta, &page_layout(&config));

        let tex_path = self
            .output
            .unwrap_or_else(|| config.compile_resolved.output_dir.join("paper.tex"));
        write_and_compile(
            &output,
            &config,
            &tex_path,
            &latex,
            config.compile_resolved.enabled,
        )
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            title: self.title.clone(),
            output_dir: self.output_dir.clone(),
            compile: self.compile.then_some(true),
            ..CliSettings::default()
        }
    }
}

/// Read and parse exercise files in parallel, keeping input order.
fn load_paper(files: &[PathBuf]) -> Result<Paper, CliError> {
    let exercises = files
        .par_iter()
        .map(|path| load_exercise(path))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!(count = exercises.len(), "Parsed exercises");
    Ok(exercises.into_iter().collect())
}

fn load_exercise(path: &Path) -> Result<Exercise, CliError> {
    let source = read_source(path)?;
    Ok(Exercise::new(file_stem(path), markdown::parse(&source)))
}
