//! Markdown → document tree, built from pulldown-cmark events.
//!
//! Adjacent text events and soft breaks are merged into one text node, so
//! a term is found even when the parser splits the run. Code, HTML,
//! images, math, and similar constructs become opaque nodes.

use linkweave_types::Node;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

/// Markdown parser producing [`Node`] trees
pub struct MarkdownParser {
    options: Options,
}

enum Frame {
    Container {
        kind: &'static str,
        children: Vec<Node>,
    },
    Link {
        url: String,
        title: Option<String>,
        children: Vec<Node>,
    },
    /// Collects raw text for an opaque node; `collect` is false for
    /// images, whose value is their source URL
    Literal {
        kind: &'static str,
        value: String,
        collect: bool,
    },
}

impl Frame {
    fn container(kind: &'static str) -> Self {
        Frame::Container {
            kind,
            children: Vec::new(),
        }
    }

    fn into_node(self) -> Node {
        match self {
            Frame::Container { kind, children } => Node::container(kind, children),
            Frame::Link {
                url,
                title,
                children,
            } => Node::link(url, title, children),
            Frame::Literal { kind, value, .. } => Node::opaque(kind, value),
        }
    }
}

impl MarkdownParser {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self { options }
    }

    /// Parse a markdown body (without front-matter) into the children of
    /// a document root
    pub fn parse(&self, markdown: &str) -> Vec<Node> {
        let mut stack: Vec<Frame> = vec![Frame::container("root")];

        for event in Parser::new_ext(markdown, self.options) {
            match event {
                Event::Start(tag) => stack.push(frame_for(tag)),
                Event::End(_) => {
                    if stack.len() > 1 {
                        if let Some(frame) = stack.pop() {
                            push_node(&mut stack, frame.into_node());
                        }
                    }
                }
                Event::Text(text) => push_text(&mut stack, &text),
                Event::SoftBreak => push_text(&mut stack, "\n"),
                Event::HardBreak => push_node(&mut stack, Node::opaque("break", "")),
                Event::Code(code) => push_node(&mut stack, Node::opaque("inlineCode", code.to_string())),
                Event::Html(html) | Event::InlineHtml(html) => {
                    if let Some(Frame::Literal { value, collect: true, .. }) = stack.last_mut() {
                        value.push_str(&html);
                    } else {
                        push_node(&mut stack, Node::opaque("html", html.to_string()));
                    }
                }
                Event::InlineMath(math) => push_node(&mut stack, Node::opaque("inlineMath", math.to_string())),
                Event::DisplayMath(math) => push_node(&mut stack, Node::opaque("math", math.to_string())),
                Event::FootnoteReference(label) => {
                    push_node(&mut stack, Node::opaque("footnoteReference", label.to_string()))
                }
                Event::Rule => push_node(&mut stack, Node::opaque("thematicBreak", "")),
                Event::TaskListMarker(checked) => push_node(
                    &mut stack,
                    Node::opaque("taskListMarker", if checked { "x" } else { " " }),
                ),
            }
        }

        // Unbalanced input cannot come out of pulldown-cmark, but fold any
        // leftovers rather than dropping them
        while stack.len() > 1 {
            if let Some(frame) = stack.pop() {
                push_node(&mut stack, frame.into_node());
            }
        }

        match stack.pop() {
            Some(Frame::Container { children, .. }) => children,
            _ => Vec::new(),
        }
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse with the default options
pub fn parse_markdown(markdown: &str) -> Vec<Node> {
    MarkdownParser::new().parse(markdown)
}

fn frame_for(tag: Tag<'_>) -> Frame {
    match tag {
        Tag::Link {
            dest_url, title, ..
        } => Frame::Link {
            url: dest_url.to_string(),
            title: Some(title.to_string()).filter(|t| !t.is_empty()),
            children: Vec::new(),
        },
        Tag::Image { dest_url, .. } => Frame::Literal {
            kind: "image",
            value: dest_url.to_string(),
            collect: false,
        },
        Tag::CodeBlock(kind) => Frame::Literal {
            kind: match kind {
                CodeBlockKind::Fenced(_) => "code",
                CodeBlockKind::Indented => "indentedCode",
            },
            value: String::new(),
            collect: true,
        },
        Tag::HtmlBlock => Frame::Literal {
            kind: "html",
            value: String::new(),
            collect: true,
        },
        Tag::MetadataBlock(_) => Frame::Literal {
            kind: "yaml",
            value: String::new(),
            collect: true,
        },
        Tag::Paragraph => Frame::container("paragraph"),
        Tag::Heading { .. } => Frame::container("heading"),
        Tag::BlockQuote(_) => Frame::container("blockquote"),
        Tag::List(_) => Frame::container("list"),
        Tag::Item => Frame::container("listItem"),
        Tag::FootnoteDefinition(_) => Frame::container("footnoteDefinition"),
        Tag::Table(_) => Frame::container("table"),
        Tag::TableHead => Frame::container("tableHead"),
        Tag::TableRow => Frame::container("tableRow"),
        Tag::TableCell => Frame::container("tableCell"),
        Tag::Emphasis => Frame::container("emphasis"),
        Tag::Strong => Frame::container("strong"),
        Tag::Strikethrough => Frame::container("delete"),
        #[allow(unreachable_patterns)]
        _ => Frame::container("container"),
    }
}

fn push_text(stack: &mut [Frame], text: &str) {
    let Some(frame) = stack.last_mut() else {
        return;
    };
    let children = match frame {
        Frame::Literal { value, collect, .. } => {
            if *collect {
                value.push_str(text);
            }
            return;
        }
        Frame::Container { children, .. } | Frame::Link { children, .. } => children,
    };

    if let Some(Node::Text(last)) = children.last_mut() {
        last.value.push_str(text);
    } else {
        children.push(Node::text(text));
    }
}

fn push_node(stack: &mut [Frame], node: Node) {
    match stack.last_mut() {
        Some(Frame::Container { children, .. }) | Some(Frame::Link { children, .. }) => {
            children.push(node)
        }
        // Nodes inside an image's alt text or a code block are not kept
        Some(Frame::Literal { .. }) | None => {}
    }
}
