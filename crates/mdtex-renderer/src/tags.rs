//! Custom exam tags.
//!
//! Two self-closing tags are recognized inside raw tag spans:
//!
//! - `<answer-area size="N"/>`: N ruled answer lines
//! - `<figure description="TEXT" id="TEXT"/>`: a captioned placeholder figure
//!
//! Any other tag degrades to a literal block carrying a visible diagnostic,
//! so the document still compiles.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::escape::escape_latex;

/// Tag name of the answer area.
pub const ANSWER_AREA: &str = "answer-area";
/// Tag name of the figure placeholder.
pub const FIGURE: &str = "figure";

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<answer-area size="(?P<size>\d+)"\s*/>|<figure description="(?P<description>[^"]+)" id="(?P<id>[^"]+)"\s*/>"#,
    )
    .unwrap()
});

/// Largest accepted answer area, in lines.
pub const MAX_ANSWER_LINES: u32 = 200;

/// One answer line: a full-width box with a dotted rule.
const ANSWER_LINE: &str = r"\parbox[t][2em][c]{\linewidth}{\dotfill}";

/// Where a tag span sits in the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagContext {
    /// Ordinary LaTeX prose.
    Prose,
    /// Inside a `verbatim` environment, which must be closed around the
    /// expansion.
    Verbatim,
}

/// A recognized custom tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CustomTag {
    /// `<answer-area size="N"/>`
    AnswerArea { size: u32 },
    /// `<figure description="TEXT" id="TEXT"/>`
    Figure { description: String, id: String },
}

impl CustomTag {
    /// Build a tag from a pattern match. Returns `None` for an answer area
    /// larger than [`MAX_ANSWER_LINES`].
    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        if let Some(size) = caps.name("size") {
            return size
                .as_str()
                .parse::<u32>()
                .ok()
                .filter(|&size| size <= MAX_ANSWER_LINES)
                .map(|size| Self::AnswerArea { size });
        }
        Some(Self::Figure {
            description: caps.name("description")?.as_str().to_owned(),
            id: caps.name("id")?.as_str().to_owned(),
        })
    }

    /// Render the tag as LaTeX.
    #[must_use]
    pub fn to_latex(&self) -> String {
        match self {
            Self::AnswerArea { size } => answer_area(*size),
            Self::Figure { description, id } => figure(description, id),
        }
    }
}

/// Stacked answer lines joined by forced line breaks.
fn answer_area(size: u32) -> String {
    if size == 0 {
        return String::new();
    }
    let lines = vec![ANSWER_LINE; size as usize].join("\\newline\n");
    format!("\n\\par\\noindent\n{lines}\n\\par\n")
}

/// Placeholder rectangle with caption and label, kept on one page.
fn figure(description: &str, id: &str) -> String {
    let mut out = String::with_capacity(256);
    out.push_str("\n\\begin{minipage}[t]{\\linewidth}\n");
    out.push_str("  \\begin{center}\n");
    out.push_str("    \\fbox{\\rule{0pt}{2cm} \\rule{5cm}{0pt}}\n");
    out.push_str("  \\end{center}\n");
    writeln!(out, "  \\captionof{{figure}}{{{}}}", escape_latex(description)).unwrap();
    writeln!(out, "  \\label{{fig:{}}}", label_key(id)).unwrap();
    out.push_str("\\end{minipage}\n");
    out
}

/// Make an id safe for use inside `\label{}`.
fn label_key(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            '\\' | '{' | '}' | '%' | '#' | '$' | '^' | '~' | '&' => '-',
            c => c,
        })
        .collect()
}

/// Extract the tag name from a raw span such as `<figure description=...>`.
///
/// Returns `None` for closing tags, comments and spans that do not start
/// with a tag.
///
/// # Example
///
/// ```
/// use mdtex_renderer::tags::parse_tag_name;
///
/// assert_eq!(parse_tag_name(r#"<answer-area size="2"/>"#), Some("answer-area"));
/// assert_eq!(parse_tag_name("<unknown-tag/>"), Some("unknown-tag"));
/// assert_eq!(parse_tag_name("</figure>"), None);
/// ```
#[must_use]
pub fn parse_tag_name(raw: &str) -> Option<&str> {
    let rest = raw.trim_start().strip_prefix('<')?;
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    let name = &rest[..end];
    (!name.is_empty()).then_some(name)
}

/// Whether `name` is one of the recognized custom tags.
#[must_use]
pub fn is_recognized(name: &str) -> bool {
    name == ANSWER_AREA || name == FIGURE
}

/// Whether `raw` contains at least one well-formed recognized tag.
#[must_use]
pub fn contains_tag(raw: &str) -> bool {
    TAG_PATTERN.is_match(raw)
}

/// Whether `raw` holds a tag that matches the tag syntax but cannot be
/// expanded, such as an answer area over [`MAX_ANSWER_LINES`] lines.
#[must_use]
pub fn contains_invalid_tag(raw: &str) -> bool {
    TAG_PATTERN
        .captures_iter(raw)
        .any(|caps| CustomTag::from_captures(&caps).is_none())
}

/// Expand every recognized tag in `raw`.
///
/// The leftmost occurrence is replaced first and scanning resumes after its
/// replacement, until no occurrence remains. Text between tags is escaped in
/// prose context and copied unchanged in verbatim context. In verbatim
/// context each expansion is wrapped in `\end{verbatim}` ... `\begin{verbatim}`.
/// Tags that cannot be expanded are treated as text.
#[must_use]
pub fn expand_tags(raw: &str, context: TagContext) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pos = 0;

    while let Some(caps) = TAG_PATTERN.captures_at(raw, pos) {
        let Some(whole) = caps.get(0) else { break };
        push_between(&mut out, &raw[pos..whole.start()], context);

        match CustomTag::from_captures(&caps) {
            Some(tag) => match context {
                TagContext::Prose => out.push_str(&tag.to_latex()),
                TagContext::Verbatim => {
                    out.push_str("\\end{verbatim}\n");
                    out.push_str(&tag.to_latex());
                    out.push_str("\n\\begin{verbatim}");
                }
            },
            None => push_between(&mut out, whole.as_str(), context),
        }
        pos = whole.end();
    }

    push_between(&mut out, &raw[pos..], context);
    out
}

fn push_between(out: &mut String, text: &str, context: TagContext) {
    match context {
        TagContext::Prose => out.push_str(&escape_latex(text)),
        TagContext::Verbatim => out.push_str(text),
    }
}

/// Why a tag span could not be expanded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Diagnostic<'a> {
    /// The tag name is not one of the recognized tags.
    Unsupported(Option<&'a str>),
    /// The tag name is recognized but its attributes do not match.
    Malformed(&'a str),
}

impl Diagnostic<'_> {
    /// Marker shown at the top of the literal block.
    #[must_use]
    pub fn marker(&self) -> String {
        match self {
            Self::Unsupported(Some(name)) => format!("[unsupported tag: {name}]"),
            Self::Unsupported(None) => "[unsupported tag]".to_owned(),
            Self::Malformed(name) => format!("[malformed tag: {name}]"),
        }
    }
}

/// Render `raw` as an escaped, monospaced literal block with a diagnostic
/// marker on its first line.
#[must_use]
pub fn literal_block(raw: &str, diagnostic: Diagnostic<'_>) -> String {
    let mut out = String::with_capacity(raw.len() + 96);
    out.push_str("\n\\begin{flushleft}\\ttfamily\n");
    write!(out, "\\textbf{{{}}}", escape_latex(&diagnostic.marker())).unwrap();
    for line in raw.lines().map(str::trim_end).filter(|l| !l.is_empty()) {
        out.push_str("\\\\\n");
        out.push_str(&escape_latex(line));
    }
    out.push_str("\n\\end{flushleft}\n");
    out
}
