//! Document tree walking.
//!
//! Edits are expressed as "replace the child at index `i` of its parent
//! with a sequence of nodes", which keeps sibling order intact without
//! the visitor needing a handle on the parent itself.

use linkweave_types::{Link, Node};

/// What to do with the node just visited
#[derive(Debug)]
pub enum Action {
    /// Visit the node's children next
    Descend,
    /// Leave the node and its subtree alone
    Skip,
    /// Splice these nodes in place of the visited one; they are not visited
    Replace(Vec<Node>),
}

/// Depth-first pre-order walk over `children` and their descendants.
///
/// The visitor receives each node together with its index in the parent
/// list.
pub fn walk_mut<F>(children: &mut Vec<Node>, visitor: &mut F)
where
    F: FnMut(&Node, usize) -> Action,
{
    let mut index = 0;
    while index < children.len() {
        match visitor(&children[index], index) {
            Action::Replace(nodes) => {
                let inserted = nodes.len();
                children.splice(index..=index, nodes);
                index += inserted;
                continue;
            }
            Action::Skip => {}
            Action::Descend => {
                if let Some(grandchildren) = children[index].children_mut() {
                    walk_mut(grandchildren, visitor);
                }
            }
        }
        index += 1;
    }
}

/// Call `f` on every link node, outermost first
pub fn for_each_link_mut<F>(nodes: &mut [Node], f: &mut F)
where
    F: FnMut(&mut Link),
{
    for node in nodes {
        if let Node::Link(link) = node {
            f(link);
        }
        if let Some(children) = node.children_mut() {
            for_each_link_mut(children, f);
        }
    }
}

/// All link nodes in document order
pub fn links(nodes: &[Node]) -> Vec<&Link> {
    let mut found = Vec::new();
    collect_links(nodes, &mut found);
    found
}

fn collect_links<'a>(nodes: &'a [Node], found: &mut Vec<&'a Link>) {
    for node in nodes {
        if let Node::Link(link) = node {
            found.push(link);
        }
        if let Some(children) = node.children() {
            collect_links(children, found);
        }
    }
}

/// Concatenated value of every text node under `nodes`
pub fn text_content(nodes: &[Node]) -> String {
    let mut out = String::new();
    push_text(nodes, &mut out);
    out
}

fn push_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(&text.value),
            Node::Link(_) | Node::Container(_) => {
                if let Some(children) = node.children() {
                    push_text(children, out);
                }
            }
            Node::Opaque(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Node> {
        vec![
            Node::container(
                "paragraph",
                vec![
                    Node::text("See "),
                    Node::link("https://a.test/", None, vec![Node::text("A")]),
                    Node::text(" and "),
                    Node::container("strong", vec![Node::text("bold")]),
                ],
            ),
            Node::opaque("code", "let x = 1;"),
        ]
    }

    #[test]
    fn test_replace_preserves_sibling_order() {
        let mut nodes = sample();
        walk_mut(&mut nodes, &mut |node, _| match node {
            Node::Text(t) if t.value == " and " => {
                Action::Replace(vec![Node::text(" "), Node::text("&"), Node::text(" ")])
            }
            Node::Link(_) => Action::Skip,
            _ => Action::Descend,
        });

        let para = nodes[0].children().unwrap();
        assert_eq!(para.len(), 6);
        assert_eq!(para[2], Node::text(" "));
        assert_eq!(para[3], Node::text("&"));
        assert!(matches!(para[5], Node::Container(_)));
    }

    #[test]
    fn test_skip_keeps_link_children_unvisited() {
        let mut nodes = sample();
        let mut seen = Vec::new();
        walk_mut(&mut nodes, &mut |node, index| {
            if let Node::Text(t) = node {
                seen.push((t.value.clone(), index));
            }
            if node.is_link() {
                Action::Skip
            } else {
                Action::Descend
            }
        });

        assert_eq!(
            seen,
            vec![
                ("See ".to_string(), 0),
                (" and ".to_string(), 2),
                ("bold".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_replacement_nodes_are_not_revisited() {
        let mut nodes = vec![Node::text("x")];
        let mut calls = 0;
        walk_mut(&mut nodes, &mut |_, _| {
            calls += 1;
            Action::Replace(vec![Node::text("y"), Node::text("z")])
        });
        assert_eq!(calls, 1);
        assert_eq!(nodes, vec![Node::text("y"), Node::text("z")]);
    }

    #[test]
    fn test_text_content_skips_opaque() {
        let nodes = vec![
            Node::text("click "),
            Node::container("emphasis", vec![Node::text("here")]),
            Node::opaque("inlineCode", "ignored"),
        ];
        assert_eq!(text_content(&nodes), "click here");
    }

    #[test]
    fn test_links_and_mutation() {
        let mut nodes = sample();
        assert_eq!(links(&nodes).len(), 1);

        for_each_link_mut(&mut nodes, &mut |link| link.url.push_str("?x=1"));
        assert_eq!(links(&nodes)[0].url, "https://a.test/?x=1");
    }
}
