//! Document tree consumed by the renderer.
//!
//! The node set is closed: the renderer matches on [`Node`] exhaustively, so a
//! new kind cannot be added without a rendering rule.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One cell of a table: inline content.
pub type TableCell = Vec<Node>;

/// One row of a table.
pub type TableRow = Vec<TableCell>;

/// Node of a parsed document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Node {
    /// Root of a document.
    Document(Vec<Node>),
    Paragraph(Vec<Node>),
    /// Heading; levels above 5 have no sectioning command.
    Heading { level: u8, children: Vec<Node> },
    /// Literal prose text, escaped on output.
    Text(String),
    Emphasis(Vec<Node>),
    Strong(Vec<Node>),
    /// Hyperlink; `children` is the link label.
    Link {
        target: LinkTarget,
        children: Vec<Node>,
    },
    /// Image; `alt` is the alternative text.
    Image { target: LinkTarget, alt: Vec<Node> },
    /// Inline code.
    Codespan(String),
    /// Forced line break.
    LineBreak,
    SoftBreak,
    BlankLine,
    /// Raw inline tag, e.g. `<answer-area size="2"/>` inside a paragraph.
    InlineTag(String),
    /// Raw block-level tag.
    BlockTag(String),
    /// Fenced or indented code block.
    BlockCode {
        raw: String,
        #[cfg_attr(feature = "serde", serde(default))]
        info: Option<String>,
    },
    BlockQuote(Vec<Node>),
    /// Inline content of a tight list item.
    BlockText(Vec<Node>),
    ThematicBreak,
    List(List),
    ListItem(Vec<Node>),
    Table(Table),
    /// Display math, passed through unescaped.
    BlockMath(String),
    /// Inline math, passed through unescaped.
    InlineMath(String),
}

impl Node {
    /// Create a text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a paragraph holding a single text node.
    #[must_use]
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph(vec![Self::text(text)])
    }

    /// Whether this node belongs in inline (phrasing) context.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Self::Text(_)
                | Self::Emphasis(_)
                | Self::Strong(_)
                | Self::Link { .. }
                | Self::Image { .. }
                | Self::Codespan(_)
                | Self::LineBreak
                | Self::SoftBreak
                | Self::InlineTag(_)
                | Self::InlineMath(_)
        )
    }
}

/// Target of a link or image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkTarget {
    /// Destination URL. An empty URL is a defect of the input tree.
    #[cfg_attr(feature = "serde", serde(default))]
    pub url: String,
    /// Optional title, rendered as a footnote (links) or caption (images).
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: Option<String>,
    /// Label of a reference-style link (`[text][label]`).
    #[cfg_attr(feature = "serde", serde(default))]
    pub reference: Option<String>,
}

impl LinkTarget {
    /// Create an inline target with no title.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            reference: None,
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Mark the target as resolved through a reference label.
    #[must_use]
    pub fn with_reference(mut self, label: impl Into<String>) -> Self {
        self.reference = Some(label.into());
        self
    }
}

/// Ordered or unordered list.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct List {
    pub ordered: bool,
    /// First number of an ordered list.
    #[cfg_attr(feature = "serde", serde(default = "default_start"))]
    pub start: u64,
    /// Tight lists have no blank lines between items.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tight: bool,
    /// Items, normally [`Node::ListItem`].
    pub items: Vec<Node>,
}

#[cfg(feature = "serde")]
fn default_start() -> u64 {
    1
}

/// Table with a header row and zero or more body rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Table {
    /// Header cells; their count fixes the column count.
    pub header: TableRow,
    #[cfg_attr(feature = "serde", serde(default))]
    pub rows: Vec<TableRow>,
}
