//! CLI command implementations.

mod paper;
mod render;

pub(crate) use paper::PaperArgs;
pub(crate) use render::RenderArgs;

use std::fs;
use std::path::{Path, PathBuf};

use mdtex_config::Config;
use mdtex_renderer::{DocumentDate, DocumentMeta, LatexRenderer, PageLayout, RenderOptions};

use crate::compile;
use crate::error::CliError;
use crate::output::{Output, Written};

/// Renderer configured from `[render]`.
fn renderer(config: &Config) -> LatexRenderer {
    LatexRenderer::new(RenderOptions::default().with_image_width(config.render.image_width.clone()))
}

/// Title page metadata from `[document]`, with a command-specific default title.
fn document_meta(config: &Config, default_title: impl FnOnce() -> String) -> DocumentMeta {
    let title = config.document.title.clone().unwrap_or_else(default_title);
    DocumentMeta::new(title, config.document.author.clone())
        .with_date(DocumentDate::parse(&config.document.date))
}

/// Page layout from `[layout]`.
fn page_layout(config: &Config) -> PageLayout {
    PageLayout {
        paper: config.layout.paper.clone(),
        margin: config.layout.margin.clone(),
        outline: config.layout.outline,
        parskip: config.layout.parskip.clone(),
    }
}

fn read_source(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// File stem used for ids and default output names.
fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "document".to_owned(), |s| s.to_string_lossy().into_owned())
}

/// Write a `.tex` file, then compile it when enabled.
fn write_and_compile(
    output: &Output,
    config: &Config,
    tex_path: &Path,
    latex: &str,
    compile_pdf: bool,
) -> Result<(), CliError> {
    if let Some(parent) = tex_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(tex_path, latex)?;
    tracing::info!(path = %tex_path.display(), bytes = latex.len(), "Wrote LaTeX");
    output.wrote(Written::Latex, tex_path);

    if compile_pdf {
        output.info(format_args!("Compiling with {}...", config.compile_resolved.engine));
        let pdf = compile::compile(&config.compile_resolved.engine, tex_path)?;
        output.wrote(Written::Pdf, &pdf);
    }
    Ok(())
}

/// Expand directories into their markdown files, sorted by name.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut entries: Vec<PathBuf> = fs::read_dir(input)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "md"))
            .collect();
        entries.sort();
        files.extend(entries);
    }
    Ok(files)
}
