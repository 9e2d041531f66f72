//! Shared types for linkweave
//!
//! This crate provides the document tree the link transforms operate on,
//! along with the identifier used for documents across the workspace.

use serde::{Deserialize, Serialize};

/// Document identifier (the slug derived from the source file name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocId(pub String);

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A node in a parsed document.
///
/// Only text and link nodes carry semantics for the link transforms.
/// Containers are walked, opaque nodes are passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Text(Text),
    Link(Link),
    Container(Container),
    Opaque(Opaque),
}

/// Plain text leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub value: String,
}

/// Hyperlink with its visible children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub children: Vec<Node>,
}

/// Structural node (paragraph, heading, emphasis, list item, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub kind: String,

    #[serde(default)]
    pub children: Vec<Node>,
}

/// Leaf whose content must never be rewritten (code, raw HTML, images)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opaque {
    pub kind: String,

    #[serde(default)]
    pub value: String,
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(Text {
            value: value.into(),
        })
    }

    pub fn link(url: impl Into<String>, title: Option<String>, children: Vec<Node>) -> Self {
        Node::Link(Link {
            url: url.into(),
            title,
            children,
        })
    }

    pub fn container(kind: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Container(Container {
            kind: kind.into(),
            children,
        })
    }

    pub fn opaque(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Node::Opaque(Opaque {
            kind: kind.into(),
            value: value.into(),
        })
    }

    /// Kind name as it appears in the serialized tree
    pub fn kind(&self) -> &str {
        match self {
            Node::Text(_) => "text",
            Node::Link(_) => "link",
            Node::Container(c) => &c.kind,
            Node::Opaque(o) => &o.kind,
        }
    }

    /// Child list, if this node can have children
    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Link(link) => Some(&link.children),
            Node::Container(container) => Some(&container.children),
            Node::Text(_) | Node::Opaque(_) => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Link(link) => Some(&mut link.children),
            Node::Container(container) => Some(&mut container.children),
            Node::Text(_) | Node::Opaque(_) => None,
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Node::Link(_))
    }
}

/// A parsed document: its id and the root of its tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub root: Node,
}

impl Document {
    pub fn new(id: DocId, children: Vec<Node>) -> Self {
        Self {
            id,
            root: Node::container("root", children),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_serializes_with_type_tag() {
        let node = Node::link(
            "https://example.com",
            Some("Example".to_string()),
            vec![Node::text("example")],
        );

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "link");
        assert_eq!(json["url"], "https://example.com");
        assert_eq!(json["children"][0]["type"], "text");
        assert_eq!(json["children"][0]["value"], "example");
    }

    #[test]
    fn test_node_roundtrip_keeps_opaque_content() {
        let node = Node::container(
            "paragraph",
            vec![Node::text("run "), Node::opaque("inlineCode", "cargo build")],
        );

        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_kind_and_children() {
        let mut node = Node::container("heading", vec![Node::text("Intro")]);
        assert_eq!(node.kind(), "heading");
        assert_eq!(node.children().map(Vec::len), Some(1));

        node.children_mut().unwrap().push(Node::text("!"));
        assert_eq!(node.children().map(Vec::len), Some(2));
        assert!(Node::text("x").children().is_none());
    }
}
