//! Set operations over node sequences.
//!
//! Nodes are compared by identity. Every combinator keeps the order nodes arrive in
//! and pulls from its inputs only as far as the caller consumes.

use std::collections::HashSet;

use crate::ast::LogicalKind;
use crate::node::Node;

/// A lazy sequence of nodes.
pub type NodeIter<'a> = Box<dyn Iterator<Item = Node> + 'a>;

/// Combines `left` and `right` with the given operator.
pub fn combine<'a>(kind: LogicalKind, left: NodeIter<'a>, right: NodeIter<'a>) -> NodeIter<'a> {
    match kind {
        LogicalKind::Or => Box::new(Union {
            left,
            right,
            seen: HashSet::new(),
        }),
        LogicalKind::And => Box::new(Filtered {
            left,
            right: Deferred::new(right),
            keep_members: true,
        }),
        LogicalKind::Not => Box::new(Filtered {
            left,
            right: Deferred::new(right),
            keep_members: false,
        }),
        LogicalKind::Xor => Box::new(SymmetricDifference {
            left,
            right: Deferred::new(right),
            seen: HashSet::new(),
            tail: None,
        }),
    }
}

/// A right-hand side collected on first use. `nodes` keeps duplicates in source
/// order; `members` answers membership.
struct Deferred<'a> {
    source: Option<NodeIter<'a>>,
    nodes: Vec<Node>,
    members: HashSet<Node>,
}

impl<'a> Deferred<'a> {
    fn new(source: NodeIter<'a>) -> Self {
        Deferred {
            source: Some(source),
            nodes: Vec::new(),
            members: HashSet::new(),
        }
    }

    fn force(&mut self) -> &mut Self {
        if let Some(source) = self.source.take() {
            for node in source {
                self.members.insert(node.clone());
                self.nodes.push(node);
            }
        }
        self
    }

    fn contains(&mut self, node: &Node) -> bool {
        self.force().members.contains(node)
    }
}

/// `left`, then whatever of `right` was not in `left`.
struct Union<'a> {
    left: NodeIter<'a>,
    right: NodeIter<'a>,
    seen: HashSet<Node>,
}

impl Iterator for Union<'_> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        if let Some(node) = self.left.next() {
            self.seen.insert(node.clone());
            return Some(node);
        }
        let seen = &mut self.seen;
        self.right.by_ref().find(|node| seen.insert(node.clone()))
    }
}

/// Nodes of `left` that are (And) or are not (Not) in `right`.
struct Filtered<'a> {
    left: NodeIter<'a>,
    right: Deferred<'a>,
    keep_members: bool,
}

impl Iterator for Filtered<'_> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        loop {
            let node = self.left.next()?;
            if self.right.contains(&node) == self.keep_members {
                return Some(node);
            }
        }
    }
}

/// `left` minus `right`, then `right` minus `left`.
struct SymmetricDifference<'a> {
    left: NodeIter<'a>,
    right: Deferred<'a>,
    seen: HashSet<Node>,
    tail: Option<std::vec::IntoIter<Node>>,
}

impl Iterator for SymmetricDifference<'_> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        if self.tail.is_none() {
            while let Some(node) = self.left.next() {
                self.seen.insert(node.clone());
                if !self.right.contains(&node) {
                    return Some(node);
                }
            }
            let right = std::mem::take(&mut self.right.force().nodes);
            self.tail = Some(right.into_iter());
        }

        let seen = &self.seen;
        self.tail.as_mut()?.find(|node| !seen.contains(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn names(iter: NodeIter<'_>) -> Vec<String> {
        iter.map(|n| n.name()).collect()
    }

    #[test]
    fn test_combinators_follow_source_order() {
        let root = Node::with_children(
            "root",
            Value::Null,
            ["a", "b", "c", "d"].map(Node::new),
        );
        let pick = |indices: &'static [usize]| -> NodeIter<'static> {
            let children = root.children();
            Box::new(indices.iter().map(move |&i| children[i].clone()))
        };

        assert_eq!(
            names(combine(LogicalKind::Or, pick(&[2, 0]), pick(&[1, 2, 3]))),
            ["c", "a", "b", "d"]
        );
        assert_eq!(
            names(combine(LogicalKind::And, pick(&[3, 1, 0]), pick(&[0, 3]))),
            ["d", "a"]
        );
        assert_eq!(
            names(combine(LogicalKind::Xor, pick(&[0, 1]), pick(&[1, 2]))),
            ["a", "c"]
        );
        assert_eq!(
            names(combine(LogicalKind::Xor, pick(&[0]), pick(&[2, 0, 2, 3, 3]))),
            ["c", "c", "d", "d"]
        );
        assert_eq!(
            names(combine(LogicalKind::Not, pick(&[0, 1, 2]), pick(&[1]))),
            ["a", "c"]
        );
    }
}
