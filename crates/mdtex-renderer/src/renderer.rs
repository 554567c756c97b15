//! Recursive LaTeX renderer over the document tree.

use std::fmt::Write;

use crate::error::RenderError;
use crate::escape::{escape_latex, escape_url};
use crate::node::{LinkTarget, List, Node, Table};
use crate::normalize::{NormalizedBody, normalize};
use crate::references::{href, render_references};
use crate::state::RenderState;
use crate::tags::{self, Diagnostic, TagContext};

/// Indent applied to every continuation line of a list item.
const ITEM_INDENT: &str = "    ";

/// Sectioning commands for heading levels 1 to 5.
const SECTIONING: [&str; 5] = [
    "section",
    "subsection",
    "subsubsection",
    "paragraph",
    "subparagraph",
];

/// Forced line break emitted for `Node::LineBreak`.
const LINE_BREAK: &str = "\\\\\n";

/// Line break that takes no optional argument, used before `[` or `*`.
const BARE_LINE_BREAK: &str = "\\newline\n";

/// Counters of the four nested `enumerate` levels.
const ENUM_COUNTERS: [&str; 4] = ["enumi", "enumii", "enumiii", "enumiv"];

/// Renderer configuration.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Width passed to `\includegraphics`.
    pub image_width: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            image_width: r"0.8\linewidth".to_owned(),
        }
    }
}

impl RenderOptions {
    /// Set the image width.
    #[must_use]
    pub fn with_image_width(mut self, width: impl Into<String>) -> Self {
        self.image_width = width.into();
        self
    }
}

/// Result of rendering a document tree.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Normalized LaTeX body, ready for [`assemble`](crate::assemble).
    pub body: NormalizedBody,
    /// Diagnostics for degraded content (e.g. unsupported tags).
    pub warnings: Vec<String>,
    /// Number of entries in the trailing reference section.
    pub reference_count: usize,
}

/// Unnormalized output of a single tree walk.
pub(crate) struct RawRender {
    pub(crate) latex: String,
    pub(crate) warnings: Vec<String>,
    pub(crate) reference_count: usize,
}

/// LaTeX renderer.
///
/// Holds only its options; every call to [`render`](Self::render) starts from
/// fresh [`RenderState`], so one renderer can be shared across threads.
#[derive(Clone, Debug, Default)]
pub struct LatexRenderer {
    options: RenderOptions,
}

impl LatexRenderer {
    /// Create a renderer with the given options.
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a tree, append its reference section and normalize the result.
    pub fn render(&self, node: &Node) -> Result<RenderResult, RenderError> {
        let raw = self.render_raw(node)?;
        Ok(RenderResult {
            body: normalize(&raw.latex)?,
            warnings: raw.warnings,
            reference_count: raw.reference_count,
        })
    }

    /// Walk the tree and append the reference section, without normalizing.
    pub(crate) fn render_raw(&self, node: &Node) -> Result<RawRender, RenderError> {
        let mut state = RenderState::new();
        let mut latex = self.render_node(node, &mut state)?;

        let references = state.take_references();
        if !references.is_empty() {
            latex.push_str("\n\n");
            latex.push_str(&render_references(&references));
            latex.push('\n');
        }

        Ok(RawRender {
            latex,
            warnings: state.take_warnings(),
            reference_count: references.len(),
        })
    }

    /// Render a single node into a LaTeX fragment.
    pub fn render_node(&self, node: &Node, state: &mut RenderState) -> Result<String, RenderError> {
        let out = match node {
            Node::Document(children) => self.render_children(children, state)?,
            Node::Paragraph(children) => {
                format!("{}\n\n", self.render_children(children, state)?.trim())
            }
            Node::Heading { level, children } => {
                let text = self.render_children(children, state)?;
                heading(*level, text.trim())
            }
            Node::Text(raw) => escape_latex(raw).into_owned(),
            Node::Emphasis(children) => {
                format!("\\emph{{{}}}", self.render_children(children, state)?)
            }
            Node::Strong(children) => {
                format!("\\textbf{{{}}}", self.render_children(children, state)?)
            }
            Node::Link { target, children } => {
                require_url(target, "link")?;
                record_reference(target, state);
                let text = self.render_children(children, state)?;
                href(&target.url, &text, target.title.as_deref())
            }
            Node::Image { target, alt } => {
                require_url(target, "image")?;
                record_reference(target, state);
                self.image(target, alt)
            }
            Node::Codespan(raw) => format!("\\texttt{{{}}}", escape_latex(raw)),
            Node::LineBreak => LINE_BREAK.to_owned(),
            Node::SoftBreak => "\n".to_owned(),
            Node::BlankLine => String::new(),
            Node::InlineTag(raw) => render_tag(raw, state),
            Node::BlockTag(raw) => format!("{}\n\n", render_tag(raw, state).trim_end()),
            Node::BlockCode { raw, info: _ } => code_block(raw, state),
            Node::BlockQuote(children) => {
                let text = self.render_children(children, state)?;
                format!("\\begin{{quote}}\n{}\n\\end{{quote}}\n\n", text.trim())
            }
            Node::BlockText(children) => {
                format!("{}\n", self.render_children(children, state)?.trim())
            }
            Node::ThematicBreak => {
                "\\begin{center}\\rule{0.5\\linewidth}{0.5pt}\\end{center}\n\n".to_owned()
            }
            Node::List(list) => self.list(list, state)?,
            Node::ListItem(children) => self.list_item(children, state)?,
            Node::Table(table) => self.table(table, state)?,
            Node::BlockMath(raw) => format!("\n\n\\[\n{}\n\\]\n\n", raw.trim()),
            Node::InlineMath(raw) => format!("${raw}$"),
        };
        Ok(out)
    }

    fn render_children(&self, children: &[Node], state: &mut RenderState) -> Result<String, RenderError> {
        let mut out = String::new();
        let mut after_break = false;
        for child in children {
            let fragment = self.render_node(child, state)?;
            // `\\` would read a following `[` or `*` as its own argument.
            if after_break && fragment.trim_start().starts_with(['[', '*']) {
                out.truncate(out.len() - LINE_BREAK.len());
                out.push_str(BARE_LINE_BREAK);
            }
            after_break = matches!(child, Node::LineBreak);
            out.push_str(&fragment);
        }
        Ok(out)
    }

    fn image(&self, target: &LinkTarget, alt: &[Node]) -> String {
        let graphic = format!(
            "\\includegraphics[width={}]{{{}}}",
            self.options.image_width,
            escape_url(&target.url)
        );
        let Some(title) = target.title.as_deref() else {
            return graphic;
        };

        let mut out = String::with_capacity(graphic.len() + 96);
        out.push_str("\n\\begin{center}\n");
        out.push_str(&graphic);
        writeln!(out, "\n\\captionof{{figure}}{{{}}}", escape_latex(title)).unwrap();
        let key = label_slug(&plain_text(alt));
        if !key.is_empty() {
            writeln!(out, "\\label{{fig:{key}}}").unwrap();
        }
        out.push_str("\\end{center}\n");
        out
    }

    fn list(&self, list: &List, state: &mut RenderState) -> Result<String, RenderError> {
        let env = if list.ordered { "enumerate" } else { "itemize" };
        let mut out = format!("\\begin{{{env}}}\n");

        if list.ordered {
            let depth = state.enter_ordered();
            if list.start != 1
                && let Some(counter) = ENUM_COUNTERS.get(depth - 1)
            {
                writeln!(out, "\\setcounter{{{counter}}}{{{}}}", list.start.saturating_sub(1)).unwrap();
            }
        }

        let previous = state.set_tight(list.tight);
        let items = self.list_items(&list.items, state);
        state.set_tight(previous);
        if list.ordered {
            state.leave_ordered();
        }

        out.push_str(&items?);
        writeln!(out, "\\end{{{env}}}\n").unwrap();
        Ok(out)
    }

    fn list_items(&self, items: &[Node], state: &mut RenderState) -> Result<String, RenderError> {
        let mut out = String::new();
        for item in items {
            let rendered = match item {
                Node::ListItem(children) => self.list_item(children, state)?,
                other => self.list_item(std::slice::from_ref(other), state)?,
            };
            out.push_str(&rendered);
        }
        Ok(out)
    }

    /// Render one `\item`, using the tight flag of the enclosing list.
    fn list_item(&self, children: &[Node], state: &mut RenderState) -> Result<String, RenderError> {
        let mut text = String::new();
        for child in children {
            if matches!(child, Node::BlankLine) {
                continue;
            }
            text.push_str(&self.render_node(child, state)?);
        }

        let body = indent_continuation(&text);
        // A leading `[` would be taken as the optional item label.
        let item = if body.starts_with('[') { "\\item{}" } else { "\\item" };
        let mut out = format!("{item} {body}\n");
        if !state.is_tight() {
            out.push('\n');
        }
        Ok(out)
    }

    fn table(&self, table: &Table, state: &mut RenderState) -> Result<String, RenderError> {
        let columns = table.header.len();
        if columns == 0 {
            state.warn("table without header cells skipped".to_owned());
            return Ok(String::new());
        }

        let mut out = String::from("\n\\begin{tabular}{");
        out.push_str(&vec!["l"; columns].join(" "));
        out.push_str("}\n");

        let mut header = Vec::with_capacity(columns);
        for cell in &table.header {
            header.push(format!("\\textbf{{{}}}", self.table_cell(cell, state)?));
        }
        writeln!(out, "{} \\\\", header.join(" & ")).unwrap();
        out.push_str("\\hline\n\\hline\n");

        for row in &table.rows {
            let mut cells = Vec::with_capacity(columns);
            for index in 0..columns {
                cells.push(match row.get(index) {
                    Some(cell) => self.table_cell(cell, state)?,
                    None => String::new(),
                });
            }
            writeln!(out, "{} \\\\", cells.join(" & ")).unwrap();
            out.push_str("\\hline\n");
        }

        out.push_str("\\end{tabular}\n\n");
        Ok(out)
    }

    fn table_cell(&self, cell: &[Node], state: &mut RenderState) -> Result<String, RenderError> {
        let text = self.render_children(cell, state)?;
        Ok(text.trim().replace('\n', " "))
    }
}

/// Render a heading at the given level.
fn heading(level: u8, text: &str) -> String {
    let index = usize::from(level.max(1)) - 1;
    match SECTIONING.get(index) {
        Some(command) => format!("\\{command}{{{text}}}\n\n"),
        None => format!("\\textbf{{{text}}}\n\n"),
    }
}

fn require_url(target: &LinkTarget, kind: &'static str) -> Result<(), RenderError> {
    if target.url.trim().is_empty() {
        return Err(RenderError::MissingUrl { kind });
    }
    Ok(())
}

fn record_reference(target: &LinkTarget, state: &mut RenderState) {
    if let Some(label) = &target.reference {
        state.record_reference(label, &target.url, target.title.as_deref());
    }
}

/// Expand a raw tag span, or degrade it to a literal block.
fn render_tag(raw: &str, state: &mut RenderState) -> String {
    if raw.trim_start().starts_with("<!--") {
        tracing::debug!("Dropping comment span");
        return String::new();
    }

    let diagnostic = match tags::parse_tag_name(raw) {
        Some(name) if tags::is_recognized(name) => {
            if tags::contains_tag(raw) && !tags::contains_invalid_tag(raw) {
                return tags::expand_tags(raw, TagContext::Prose);
            }
            Diagnostic::Malformed(name)
        }
        name => Diagnostic::Unsupported(name),
    };

    let marker = diagnostic.marker();
    tracing::warn!(diagnostic = %marker, "Tag rendered as literal block");
    state.warn(format!("{marker} {}", raw.trim()));
    tags::literal_block(raw, diagnostic)
}

fn code_block(raw: &str, state: &mut RenderState) -> String {
    if tags::contains_invalid_tag(raw) {
        let marker = Diagnostic::Malformed(tags::ANSWER_AREA).marker();
        tracing::warn!(diagnostic = %marker, "Tag left unexpanded in code block");
        state.warn(format!("{marker} left unexpanded in code block"));
    }
    let mut code = tags::expand_tags(raw, TagContext::Verbatim);
    if !code.ends_with('\n') {
        code.push('\n');
    }
    format!("\\begin{{verbatim}}\n{code}\\end{{verbatim}}\n\n")
}

/// Indent every line after the first by [`ITEM_INDENT`].
///
/// Blank lines stay empty, and one trailing `\\` is stripped because a line
/// break cannot end an item.
fn indent_continuation(text: &str) -> String {
    let text = text.trim();
    let text = text.strip_suffix("\\\\").map_or(text, str::trim_end);

    let mut lines = text.lines();
    let mut out = lines.next().unwrap_or_default().to_owned();
    for line in lines {
        out.push('\n');
        if !line.trim().is_empty() {
            out.push_str(ITEM_INDENT);
            out.push_str(line);
        }
    }
    out
}

/// Concatenated raw text of inline nodes.
fn plain_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(raw) | Node::Codespan(raw) | Node::InlineMath(raw) => out.push_str(raw),
            Node::Emphasis(children)
            | Node::Strong(children)
            | Node::Link { children, .. }
            | Node::Image { alt: children, .. } => out.push_str(&plain_text(children)),
            Node::SoftBreak | Node::LineBreak => out.push(' '),
            _ => {}
        }
    }
    out
}

/// Lowercase ASCII slug for use as a `\label` key.
fn label_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_owned()
}
