//! Markdown block tree built on `pulldown-cmark`.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::engine::{RenderError, Renderer};

/// A block-level node of a parsed markdown span.
///
/// Inline emphasis is flattened into the block text; the tree exists so a
/// view layer can give each block kind its own presentation, not to
/// round-trip the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkdownNode {
    /// A paragraph of flattened inline text.
    Paragraph(String),
    /// An ATX or setext heading.
    Heading {
        /// Heading depth, 1-6.
        level: u8,
        /// Flattened heading text.
        text: String,
    },
    /// A fenced or indented code block.
    CodeBlock {
        /// Info-string language, if any.
        language: Option<String>,
        /// Verbatim code content.
        code: String,
    },
    /// An ordered or bullet list.
    List {
        /// Whether the list is ordered.
        ordered: bool,
        /// The list's items, in order.
        items: Vec<MarkdownNode>,
    },
    /// One list item.
    Item(Vec<MarkdownNode>),
    /// A block quote.
    BlockQuote(Vec<MarkdownNode>),
    /// A thematic break.
    Rule,
    /// A raw HTML block, passed through verbatim.
    Html(String),
}

/// Renderer producing a [`MarkdownNode`] tree per span.
#[derive(Debug, Clone)]
pub struct TreeRenderer {
    options: Options,
}

impl TreeRenderer {
    /// Create a renderer with strikethrough and task lists enabled.
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS,
        }
    }
}

impl Default for TreeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TreeRenderer {
    type Node = Vec<MarkdownNode>;

    fn render(&self, text: &str) -> Result<Self::Node, RenderError> {
        let mut builder = TreeBuilder::default();
        for event in Parser::new_ext(text, self.options) {
            builder.on_event(event);
        }
        Ok(builder.finish())
    }
}

/// Kinds of open block containers during a parse.
enum ContainerKind {
    Paragraph,
    Heading(u8),
    CodeBlock(Option<String>),
    List(bool),
    Item,
    BlockQuote,
    Html,
}

struct Container {
    kind: ContainerKind,
    children: Vec<MarkdownNode>,
    text: String,
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<MarkdownNode>,
    stack: Vec<Container>,
}

impl TreeBuilder {
    fn on_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.on_start(tag),
            Event::End(end) => self.on_end(end),
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => {
                // Inline code keeps its backticks so the flattened text
                // still reads as markdown.
                self.push_text("`");
                self.push_text(&code);
                self.push_text("`");
            }
            Event::Html(html) | Event::InlineHtml(html) => self.push_text(&html),
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.push_text("\n"),
            Event::Rule => self.attach(MarkdownNode::Rule),
            _ => {}
        }
    }

    fn on_start(&mut self, tag: Tag<'_>) {
        let kind = match tag {
            Tag::Paragraph => ContainerKind::Paragraph,
            Tag::Heading { level, .. } => ContainerKind::Heading(heading_depth(level)),
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                let language = info.split_whitespace().next().map(str::to_owned);
                ContainerKind::CodeBlock(language)
            }
            Tag::CodeBlock(CodeBlockKind::Indented) => ContainerKind::CodeBlock(None),
            Tag::List(start) => ContainerKind::List(start.is_some()),
            Tag::Item => ContainerKind::Item,
            Tag::BlockQuote(_) => ContainerKind::BlockQuote,
            Tag::HtmlBlock => ContainerKind::Html,
            // Inline containers flatten into the surrounding block.
            _ => return,
        };
        self.stack.push(Container {
            kind,
            children: Vec::new(),
            text: String::new(),
        });
    }

    fn on_end(&mut self, end: TagEnd) {
        match end {
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::CodeBlock
            | TagEnd::List(_)
            | TagEnd::Item
            | TagEnd::BlockQuote(_)
            | TagEnd::HtmlBlock => {
                if let Some(container) = self.stack.pop() {
                    let node = close(container);
                    self.attach(node);
                }
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(top) = self.stack.last_mut() {
            top.text.push_str(text);
        }
    }

    fn attach(&mut self, node: MarkdownNode) {
        match self.stack.last_mut() {
            Some(top) => top.children.push(node),
            None => self.root.push(node),
        }
    }

    fn finish(mut self) -> Vec<MarkdownNode> {
        // Streaming spans may end mid-construct; close whatever is open.
        while let Some(container) = self.stack.pop() {
            let node = close(container);
            self.attach(node);
        }
        self.root
    }
}

fn close(container: Container) -> MarkdownNode {
    let Container {
        kind,
        mut children,
        text,
    } = container;
    match kind {
        ContainerKind::Paragraph => MarkdownNode::Paragraph(text),
        ContainerKind::Heading(level) => MarkdownNode::Heading { level, text },
        ContainerKind::CodeBlock(language) => MarkdownNode::CodeBlock {
            language,
            code: text,
        },
        ContainerKind::List(ordered) => MarkdownNode::List {
            ordered,
            items: children,
        },
        ContainerKind::Item => {
            // Tight items carry bare text; loose items carry child blocks.
            if !text.is_empty() {
                children.insert(0, MarkdownNode::Paragraph(text));
            }
            MarkdownNode::Item(children)
        }
        ContainerKind::BlockQuote => {
            if !text.is_empty() {
                children.insert(0, MarkdownNode::Paragraph(text));
            }
            MarkdownNode::BlockQuote(children)
        }
        ContainerKind::Html => MarkdownNode::Html(text),
    }
}

const fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
