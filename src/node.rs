//! The document tree that path expressions are evaluated against.
//!
//! A [`Node`] is a cheap, reference-counted handle. Cloning the handle does not copy
//! the subtree; use [`Node::deep_clone`] for that. Parents are held through a weak
//! back-reference so a tree never owns itself.
//!
//! ```
//! use nodex_lang::{Node, Value};
//!
//! let root = Node::with_children(
//!     "root",
//!     Value::Null,
//!     [Node::with_value("first", "su"), Node::with_value("second", "ccess")],
//! );
//!
//! assert_eq!(root.len(), 2);
//! assert_eq!(root.child(1).unwrap().name(), "second");
//! assert_eq!(root.child(1).unwrap().path().to_string(), "/1");
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};
use std::str::FromStr;

use crate::value::Value;

/// Errors raised by structural tree mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The child is the target node itself or one of its ancestors.
    #[error("cannot add '{child}' beneath '{parent}': it would make the tree cyclic")]
    Cycle { parent: String, child: String },

    /// Insert position past the end of the children list.
    #[error("position {position} is out of range for '{parent}' with {len} children")]
    PositionOutOfRange {
        parent: String,
        position: usize,
        len: usize,
    },
}

struct Inner {
    name: String,
    value: Value,
    children: Vec<Node>,
    parent: Weak<RefCell<Inner>>,
}

/// A named, valued, ordered tree vertex.
///
/// Equality and hashing are by reference identity, which is what the logical
/// combinators rely on. Use [`Node::structurally_eq`] to compare shape and content.
#[derive(Clone)]
pub struct Node(Rc<RefCell<Inner>>);

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as *const ()).hash(state)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("Node")
            .field("name", &inner.name)
            .field("value", &inner.value)
            .field("children", &inner.children.len())
            .finish()
    }
}

impl Node {
    /// Creates a node with the given name and a `Null` value.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_value(name, Value::Null)
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Node(Rc::new(RefCell::new(Inner {
            name: name.into(),
            value: value.into(),
            children: Vec::new(),
            parent: Weak::new(),
        })))
    }

    /// Creates a fresh parent node holding `children`.
    ///
    /// Children that are already attached somewhere are detached first. A freshly
    /// created parent cannot be a descendant of any of its children, so this never
    /// fails.
    pub fn with_children(
        name: impl Into<String>,
        value: impl Into<Value>,
        children: impl IntoIterator<Item = Node>,
    ) -> Self {
        let node = Self::with_value(name, value);
        for child in children {
            child.untie();
            child.0.borrow_mut().parent = Rc::downgrade(&node.0);
            node.0.borrow_mut().children.push(child);
        }
        node
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    /// Compares the name without cloning it.
    pub fn has_name(&self, name: &str) -> bool {
        self.0.borrow().name == name
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.0.borrow_mut().name = name.into();
    }

    pub fn value(&self) -> Value {
        self.0.borrow().value.clone()
    }

    pub fn set_value(&self, value: impl Into<Value>) {
        self.0.borrow_mut().value = value.into();
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().children.is_empty()
    }

    /// Snapshot of the child handles, in order.
    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn child(&self, index: usize) -> Option<Node> {
        self.0.borrow().children.get(index).cloned()
    }

    pub fn first_child(&self) -> Option<Node> {
        self.0.borrow().children.first().cloned()
    }

    pub fn last_child(&self) -> Option<Node> {
        self.0.borrow().children.last().cloned()
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.borrow().parent.upgrade().map(Node)
    }

    pub fn root(&self) -> Node {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Position of this node within its parent's children.
    pub fn index(&self) -> Option<usize> {
        let parent = self.parent()?;
        let inner = parent.0.borrow();
        inner.children.iter().position(|c| c == self)
    }

    /// Appends `child` as the last child.
    pub fn add(&self, child: Node) -> Result<(), TreeError> {
        self.attach(None, child)
    }

    /// Inserts `child` at `position` (`0..=len`).
    pub fn insert(&self, position: usize, child: Node) -> Result<(), TreeError> {
        self.attach(Some(position), child)
    }

    fn attach(&self, position: Option<usize>, child: Node) -> Result<(), TreeError> {
        if child.is_ancestor_or_self_of(self) {
            return Err(TreeError::Cycle {
                parent: self.name(),
                child: child.name(),
            });
        }

        // Length once the child has left its current place
        let len = self.len() - usize::from(child.parent().as_ref() == Some(self));
        let position = position.unwrap_or(len);
        if position > len {
            return Err(TreeError::PositionOutOfRange {
                parent: self.name(),
                position,
                len,
            });
        }

        child.untie();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.insert(position, child);
        Ok(())
    }

    fn is_ancestor_or_self_of(&self, other: &Node) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if &node == self {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Detaches the node from its parent, returning its former position.
    pub fn untie(&self) -> Option<usize> {
        let parent = self.parent()?;
        let position = {
            let mut inner = parent.0.borrow_mut();
            let position = inner.children.iter().position(|c| c == self);
            if let Some(p) = position {
                inner.children.remove(p);
            }
            position
        };
        self.0.borrow_mut().parent = Weak::new();
        position
    }

    /// Detaches and returns all children.
    pub fn untie_children(&self) -> Vec<Node> {
        let children = std::mem::take(&mut self.0.borrow_mut().children);
        for child in &children {
            child.0.borrow_mut().parent = Weak::new();
        }
        children
    }

    /// Copies the whole subtree. Node-valued values that point inside the subtree
    /// are redirected to the matching copy; values pointing elsewhere keep
    /// sharing their target.
    pub fn deep_clone(&self) -> Node {
        let mut copies = HashMap::new();
        let copy = self.clone_structure(&mut copies);
        for (original, cloned) in &copies {
            if let Value::Node(target) = original.value() {
                if let Some(redirected) = copies.get(&target) {
                    cloned.set_value(Value::Node(redirected.clone()));
                }
            }
        }
        copy
    }

    fn clone_structure(&self, copies: &mut HashMap<Node, Node>) -> Node {
        let inner = self.0.borrow();
        let children = inner
            .children
            .iter()
            .map(|child| child.clone_structure(copies))
            .collect::<Vec<_>>();
        let copy = Node::with_children(inner.name.clone(), inner.value.clone(), children);
        copies.insert(self.clone(), copy.clone());
        copy
    }

    /// First child matching `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(&Node) -> bool) -> Option<Node> {
        self.0.borrow().children.iter().find(|c| predicate(c)).cloned()
    }

    /// Lazily yields the children matching `predicate`.
    pub fn find_all<P>(&self, mut predicate: P) -> impl Iterator<Item = Node> + use<P>
    where
        P: FnMut(&Node) -> bool,
    {
        let node = self.clone();
        (0..)
            .map_while(move |index| node.child(index))
            .filter(move |c| predicate(c))
    }

    /// All descendants in pre-order, excluding the node itself.
    pub fn descendants(&self) -> Descendants {
        let mut stack = self.children();
        stack.reverse();
        Descendants { stack }
    }

    /// Positional address from the root.
    pub fn path(&self) -> NodePath {
        let mut indices = Vec::new();
        let mut current = self.clone();
        while let Some(index) = current.index() {
            indices.push(index);
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        indices.reverse();
        NodePath(indices)
    }

    /// Resolves a positional address relative to this node.
    pub fn node_at(&self, path: &NodePath) -> Option<Node> {
        path.0
            .iter()
            .try_fold(self.clone(), |node, &index| node.child(index))
    }

    /// The sibling `offset` positions away; `None` past either edge.
    pub fn sibling(&self, offset: isize) -> Option<Node> {
        let parent = self.parent()?;
        let index = self.index()?.checked_add_signed(offset)?;
        parent.child(index)
    }

    pub fn previous_sibling(&self) -> Option<Node> {
        self.sibling(-1)
    }

    pub fn next_sibling(&self) -> Option<Node> {
        self.sibling(1)
    }

    /// The node that follows this one in pre-order.
    pub fn next_in_document(&self) -> Option<Node> {
        if let Some(child) = self.first_child() {
            return Some(child);
        }
        let mut current = self.clone();
        loop {
            if let Some(sibling) = current.next_sibling() {
                return Some(sibling);
            }
            current = current.parent()?;
        }
    }

    /// The node that precedes this one in pre-order.
    pub fn previous_in_document(&self) -> Option<Node> {
        match self.previous_sibling() {
            Some(mut node) => {
                while let Some(last) = node.last_child() {
                    node = last;
                }
                Some(node)
            }
            None => self.parent(),
        }
    }

    /// Same names, values and shape, regardless of identity.
    ///
    /// Node-valued values are equal when they are the same node, or when they
    /// sit at the same position relative to the two nodes being compared.
    pub fn structurally_eq(&self, other: &Node) -> bool {
        self.shape_eq(other, self, other)
    }

    fn shape_eq(&self, other: &Node, left_root: &Node, right_root: &Node) -> bool {
        if self == other {
            return true;
        }
        let (a, b) = (self.0.borrow(), other.0.borrow());
        let values_eq = match (&a.value, &b.value) {
            (Value::Node(x), Value::Node(y)) => {
                x == y
                    || matches!(
                        (x.path_within(left_root), y.path_within(right_root)),
                        (Some(p), Some(q)) if p == q
                    )
            }
            (x, y) => x == y,
        };
        a.name == b.name
            && values_eq
            && a.children.len() == b.children.len()
            && a
                .children
                .iter()
                .zip(&b.children)
                .all(|(x, y)| x.shape_eq(y, left_root, right_root))
    }

    /// Child indices leading from `ancestor` down to this node.
    fn path_within(&self, ancestor: &Node) -> Option<Vec<usize>> {
        let mut indices = Vec::new();
        let mut current = self.clone();
        while &current != ancestor {
            indices.push(current.index()?);
            current = current.parent()?;
        }
        indices.reverse();
        Some(indices)
    }
}

/// Pre-order descendant iterator returned by [`Node::descendants`].
pub struct Descendants {
    stack: Vec<Node>,
}

impl Iterator for Descendants {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        let node = self.stack.pop()?;
        let mut children = node.children();
        children.reverse();
        self.stack.extend(children);
        Some(node)
    }
}

/// A node's address as the child indices leading to it from the root.
///
/// Displayed as `/0/2/1`; the root itself is `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn new(indices: Vec<usize>) -> Self {
        NodePath(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for index in &self.0 {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

impl FromStr for NodePath {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(NodePath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::with_children(
            "root",
            Value::Null,
            [
                Node::with_children("a", Value::Null, [Node::new("a0"), Node::new("a1")]),
                Node::new("b"),
            ],
        )
    }

    #[test]
    fn test_document_order_neighbours() {
        let root = sample();
        let b = root.child(1).unwrap();
        let a1 = root.child(0).unwrap().child(1).unwrap();

        assert_eq!(root.next_in_document().unwrap().name(), "a");
        assert_eq!(a1.next_in_document().unwrap(), b);
        assert_eq!(b.previous_in_document().unwrap(), a1);
        assert!(b.next_in_document().is_none());
        assert!(root.previous_in_document().is_none());
    }

    #[test]
    fn test_path_round_trips_through_text() {
        let root = sample();
        let a1 = root.child(0).unwrap().child(1).unwrap();
        let path: NodePath = a1.path().to_string().parse().unwrap();
        assert_eq!(path.indices(), &[0, 1]);
        assert_eq!(root.node_at(&path).unwrap(), a1);
        assert_eq!("/".parse::<NodePath>().unwrap(), NodePath::default());
    }
}
