//! Hyperlinks and the trailing reference section.

use crate::escape::{escape_latex, escape_url};
use crate::state::Reference;

/// Render a hyperlink with an optional footnote.
///
/// `text` must already be valid LaTeX; the title is escaped here.
pub(crate) fn href(url: &str, text: &str, title: Option<&str>) -> String {
    let mut out = format!("\\href{{{}}}{{{text}}}", escape_url(url));
    if let Some(title) = title {
        out.push_str(&format!(" \\footnote{{{}}}", escape_latex(title)));
    }
    out
}

/// Render every collected reference once, separated by blank lines.
///
/// Entries come out in label order, not citation order.
pub(crate) fn render_references(references: &[Reference]) -> String {
    references
        .iter()
        .map(|r| href(&r.url, &escape_latex(&r.label), r.title.as_deref()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
