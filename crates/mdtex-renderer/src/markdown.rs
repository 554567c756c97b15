//! Markdown front end.
//!
//! Builds a [`Node`] tree from `pulldown-cmark` events. Raw HTML is kept as
//! tag nodes so that custom tags reach the renderer untouched.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag};

use crate::node::{LinkTarget, List, Node, Table, TableRow};

/// Parser options used by [`parse`].
#[must_use]
pub fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_MATH
}

/// Parse markdown into a document tree.
///
/// Parsing never fails: anything the tree cannot represent is flattened into
/// its content.
#[must_use]
pub fn parse(markdown: &str) -> Node {
    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(markdown, options()) {
        builder.event(event);
    }
    builder.finish()
}

/// Open container while its children are collected.
enum Frame {
    Document,
    Paragraph,
    Heading(u8),
    BlockQuote,
    CodeBlock(Option<String>),
    HtmlBlock,
    List(Option<u64>),
    Item,
    Table { header: TableRow, rows: Vec<TableRow> },
    TableHead(TableRow),
    TableRow(TableRow),
    TableCell,
    Emphasis,
    Strong,
    Link(LinkTarget),
    Image(LinkTarget),
    /// Construct without a node kind; children go to the parent.
    Transparent,
}

struct Open {
    frame: Frame,
    children: Vec<Node>,
    /// Verbatim content of code and HTML blocks.
    raw: String,
}

impl Open {
    fn new(frame: Frame) -> Self {
        Self {
            frame,
            children: Vec::new(),
            raw: String::new(),
        }
    }
}

struct TreeBuilder {
    stack: Vec<Open>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Open::new(Frame::Document)],
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push(Node::Codespan(code.into_string())),
            Event::InlineMath(math) => self.push(Node::InlineMath(math.into_string())),
            Event::DisplayMath(math) => self.push(Node::BlockMath(math.into_string())),
            Event::Html(html) => match self.stack.last_mut() {
                Some(open) if matches!(open.frame, Frame::HtmlBlock) => open.raw.push_str(&html),
                _ => self.push(Node::BlockTag(html.into_string())),
            },
            Event::InlineHtml(html) => self.push(Node::InlineTag(html.into_string())),
            Event::FootnoteReference(label) => self.push(Node::Text(format!("[{label}]"))),
            Event::SoftBreak => self.push(Node::SoftBreak),
            Event::HardBreak => self.push(Node::LineBreak),
            Event::Rule => self.push(Node::ThematicBreak),
            Event::TaskListMarker(checked) => {
                self.push(Node::text(if checked { "[x] " } else { "[ ] " }));
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph,
            Tag::Heading { level, .. } => Frame::Heading(level as u8),
            Tag::BlockQuote(_) => Frame::BlockQuote,
            Tag::CodeBlock(kind) => Frame::CodeBlock(match kind {
                CodeBlockKind::Fenced(info) if !info.trim().is_empty() => {
                    Some(info.trim().to_owned())
                }
                _ => None,
            }),
            Tag::HtmlBlock => Frame::HtmlBlock,
            Tag::List(start) => Frame::List(start),
            Tag::Item => Frame::Item,
            Tag::Table(_) => Frame::Table {
                header: Vec::new(),
                rows: Vec::new(),
            },
            Tag::TableHead => Frame::TableHead(Vec::new()),
            Tag::TableRow => Frame::TableRow(Vec::new()),
            Tag::TableCell => Frame::TableCell,
            Tag::Emphasis => Frame::Emphasis,
            Tag::Strong => Frame::Strong,
            Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            } => Frame::Link(link_target(link_type, dest_url, title, id)),
            Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            } => Frame::Image(link_target(link_type, dest_url, title, id)),
            _ => Frame::Transparent,
        };
        self.stack.push(Open::new(frame));
    }

    fn end(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        let Some(Open {
            frame,
            children,
            raw,
        }) = self.stack.pop()
        else {
            return;
        };

        let node = match frame {
            Frame::Document => return,
            Frame::Paragraph => Node::Paragraph(children),
            Frame::Heading(level) => Node::Heading { level, children },
            Frame::BlockQuote => Node::BlockQuote(children),
            Frame::CodeBlock(info) => Node::BlockCode { raw, info },
            Frame::HtmlBlock => Node::BlockTag(raw),
            Frame::List(start) => list(start, children),
            Frame::Item => Node::ListItem(group_inline(children)),
            Frame::Table { header, rows } => Node::Table(Table { header, rows }),
            Frame::TableHead(cells) => {
                if let Some(Frame::Table { header, .. }) = self.top_frame_mut() {
                    *header = cells;
                }
                return;
            }
            Frame::TableRow(cells) => {
                if let Some(Frame::Table { rows, .. }) = self.top_frame_mut() {
                    rows.push(cells);
                }
                return;
            }
            Frame::TableCell => {
                if let Some(Frame::TableHead(cells) | Frame::TableRow(cells)) = self.top_frame_mut() {
                    cells.push(children);
                }
                return;
            }
            Frame::Emphasis => Node::Emphasis(children),
            Frame::Strong => Node::Strong(children),
            Frame::Link(target) => Node::Link { target, children },
            Frame::Image(target) => Node::Image {
                target,
                alt: children,
            },
            Frame::Transparent => {
                for child in children {
                    self.push(child);
                }
                return;
            }
        };
        self.push(node);
    }

    fn top_frame_mut(&mut self) -> Option<&mut Frame> {
        self.stack.last_mut().map(|open| &mut open.frame)
    }

    fn text(&mut self, text: &str) {
        match self.stack.last_mut() {
            Some(open) if matches!(open.frame, Frame::CodeBlock(_) | Frame::HtmlBlock) => {
                open.raw.push_str(text);
            }
            _ => self.push(Node::text(text)),
        }
    }

    /// Append a node to the innermost container, merging adjacent text.
    fn push(&mut self, node: Node) {
        let Some(open) = self.stack.last_mut() else {
            return;
        };
        if let Node::Text(text) = &node
            && let Some(Node::Text(previous)) = open.children.last_mut()
        {
            previous.push_str(text);
            return;
        }
        open.children.push(node);
    }

    fn finish(mut self) -> Node {
        while self.stack.len() > 1 {
            self.end();
        }
        let children = self.stack.pop().map(|open| open.children).unwrap_or_default();
        Node::Document(children)
    }
}

fn link_target(link_type: LinkType, dest_url: CowStr<'_>, title: CowStr<'_>, id: CowStr<'_>) -> LinkTarget {
    let url = match link_type {
        LinkType::Email => format!("mailto:{dest_url}"),
        _ => dest_url.into_string(),
    };
    let mut target = LinkTarget::new(url);
    if !title.is_empty() {
        target = target.with_title(title.into_string());
    }
    let by_reference = matches!(
        link_type,
        LinkType::Reference
            | LinkType::ReferenceUnknown
            | LinkType::Collapsed
            | LinkType::CollapsedUnknown
            | LinkType::Shortcut
            | LinkType::ShortcutUnknown
    );
    if by_reference && !id.is_empty() {
        target = target.with_reference(id.into_string());
    }
    target
}

/// Build a list; it is tight unless some item holds a paragraph.
fn list(start: Option<u64>, items: Vec<Node>) -> Node {
    let loose = items.iter().any(|item| {
        matches!(item, Node::ListItem(children)
            if children.iter().any(|child| matches!(child, Node::Paragraph(_))))
    });
    Node::List(List {
        ordered: start.is_some(),
        start: start.unwrap_or(1),
        tight: !loose,
        items,
    })
}

/// Wrap each run of inline children of a list item in [`Node::BlockText`].
fn group_inline(children: Vec<Node>) -> Vec<Node> {
    let mut grouped = Vec::with_capacity(children.len());
    let mut run: Vec<Node> = Vec::new();
    for child in children {
        if child.is_inline() {
            run.push(child);
            continue;
        }
        if !run.is_empty() {
            grouped.push(Node::BlockText(std::mem::take(&mut run)));
        }
        grouped.push(child);
    }
    if !run.is_empty() {
        grouped.push(Node::BlockText(run));
    }
    grouped
}
