//! Standalone LaTeX document assembly.

use std::fmt::Write;

use crate::escape::escape_latex;
use crate::normalize::NormalizedBody;

/// Date shown on the title page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DocumentDate {
    /// `\today`, resolved when the document is compiled.
    #[default]
    Today,
    /// Literal text.
    Fixed(String),
    /// No date.
    Empty,
}

impl DocumentDate {
    /// Parse a configured date: `"today"`, `""` or literal text.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" => Self::Empty,
            v if v.eq_ignore_ascii_case("today") => Self::Today,
            v => Self::Fixed(v.to_owned()),
        }
    }

    fn to_latex(&self) -> String {
        match self {
            Self::Today => "\\today".to_owned(),
            Self::Fixed(text) => escape_latex(text).into_owned(),
            Self::Empty => String::new(),
        }
    }
}

/// Title page metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentMeta {
    pub title: String,
    pub author: String,
    pub date: DocumentDate,
}

impl DocumentMeta {
    #[must_use]
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            date: DocumentDate::Today,
        }
    }

    #[must_use]
    pub fn with_date(mut self, date: DocumentDate) -> Self {
        self.date = date;
        self
    }
}

/// Page geometry and front matter options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLayout {
    /// `geometry` paper name, e.g. `a4paper`.
    pub paper: String,
    /// `geometry` margin, e.g. `1in`.
    pub margin: String,
    /// Add PDF bookmarks for the cover and the body.
    pub outline: bool,
    /// Paragraph spacing, e.g. `6pt`.
    pub parskip: Option<String>,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            paper: "a4paper".to_owned(),
            margin: "1in".to_owned(),
            outline: false,
            parskip: None,
        }
    }
}

/// Wrap a normalized body into a compilable `article` document.
///
/// Title and author are escaped; the body is inserted as is.
#[must_use]
pub fn assemble(body: &NormalizedBody, meta: &DocumentMeta, layout: &PageLayout) -> String {
    let mut out = String::with_capacity(body.as_str().len() + 512);

    out.push_str("\\documentclass{article}\n");
    writeln!(
        out,
        "\\usepackage[{},margin={}]{{geometry}}",
        layout.paper, layout.margin
    )
    .unwrap();
    out.push_str("\\usepackage{graphicx}\n");
    out.push_str("\\usepackage{caption}\n");
    out.push_str("\\usepackage{hyperref}\n\n");

    writeln!(out, "\\title{{{}}}", escape_latex(&meta.title)).unwrap();
    writeln!(out, "\\author{{{}}}", escape_latex(&meta.author)).unwrap();
    writeln!(out, "\\date{{{}}}\n", meta.date.to_latex()).unwrap();

    out.push_str("\\begin{document}\n");
    out.push_str("\\setlength{\\parindent}{0pt}\n");
    if let Some(parskip) = &layout.parskip {
        writeln!(out, "\\setlength{{\\parskip}}{{{parskip}}}").unwrap();
    }
    out.push_str("\\maketitle\n");
    if layout.outline {
        out.push_str("\\pdfbookmark[0]{Cover}{cover}\n");
    }
    out.push_str("\\newpage\n");
    if layout.outline {
        out.push_str("\\hypertarget{body}{}\n");
    }
    out.push('\n');

    out.push_str(body.as_str());
    if !body.is_empty() {
        out.push('\n');
    }
    out.push_str("\n\\end{document}\n");
    out
}
