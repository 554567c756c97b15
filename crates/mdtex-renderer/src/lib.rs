//! Document tree to LaTeX renderer.
//!
//! This crate turns a parsed document tree ([`Node`]) into LaTeX source that
//! compiles with two `pdflatex` passes.
//!
//! # Architecture
//!
//! Rendering is split into small, independently testable stages:
//! - [`escape_latex`]: escapes reserved characters in literal text
//! - [`tags`]: expands `<answer-area/>` and `<figure/>` tags into LaTeX
//! - [`LatexRenderer`]: walks the tree with a closed `match` over node kinds
//! - reference collection: reference-style links are emitted once after the body
//! - [`normalize`]: removes redundant line breaks until a fixed point is reached
//! - [`assemble`]: wraps a [`NormalizedBody`] in a document skeleton
//!
//! A [`markdown::parse`] front end builds the tree from markdown text, and
//! [`Paper`] lays out several exercises as one exam paper.
//!
//! # Example
//!
//! ```
//! use mdtex_renderer::{LatexRenderer, RenderOptions, markdown};
//!
//! let tree = markdown::parse("# Hello\n\n**Bold** text");
//! let result = LatexRenderer::new(RenderOptions::default())
//!     .render(&tree)
//!     .unwrap();
//! assert!(result.body.as_str().contains(r"\section{Hello}"));
//! ```

mod document;
mod error;
mod escape;
pub mod markdown;
mod node;
mod normalize;
mod paper;
mod references;
mod renderer;
mod state;
pub mod tags;

pub use document::{DocumentDate, DocumentMeta, PageLayout, assemble};
pub use error::RenderError;
pub use escape::{escape_latex, escape_url};
pub use node::{LinkTarget, List, Node, Table, TableCell, TableRow};
pub use normalize::{MAX_PASSES, NormalizedBody, normalize};
pub use paper::{Exercise, Paper};
pub use renderer::{LatexRenderer, RenderOptions, RenderResult};
pub use state::{Reference, RenderState};
