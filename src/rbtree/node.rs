use super::RangeTree;
use crate::TextRange;

/// Index of a node inside the tree's arena.
pub(crate) type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Node<V> {
    pub(crate) key: TextRange,
    pub(crate) value: V,
    pub(crate) color: Color,

    /// Navigational only; the owning edge is the parent's `left`/`right`.
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl<V> Node<V> {
    pub(crate) const fn new(key: TextRange, value: V, parent: Option<NodeId>) -> Self {
        Self { key, value, color: Color::Red, parent, left: None, right: None }
    }

    pub(crate) const fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}

/// A read-only cursor on a node of a [`RangeTree`].
///
/// All navigation is local: it only follows the links of the nodes it passes.
pub struct NodeRef<'a, V> {
    pub(crate) tree: &'a RangeTree<V>,
    pub(crate) id: NodeId,
}

// Derives would require `V: Clone`.
impl<V> Clone for NodeRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for NodeRef<'_, V> {}

impl<V> std::fmt::Debug for NodeRef<'_, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("key", &self.key())
            .field("color", &self.color())
            .finish()
    }
}

impl<'a, V> NodeRef<'a, V> {
    fn node(&self) -> &'a Node<V> {
        self.tree.node(self.id)
    }

    fn to(&self, id: Option<NodeId>) -> Option<Self> {
        id.map(|id| Self { tree: self.tree, id })
    }

    pub fn key(&self) -> TextRange {
        self.node().key
    }

    pub fn value(&self) -> &'a V {
        &self.node().value
    }

    pub fn color(&self) -> Color {
        self.node().color
    }

    pub fn parent(&self) -> Option<Self> {
        self.to(self.node().parent)
    }

    pub fn left(&self) -> Option<Self> {
        self.to(self.node().left)
    }

    pub fn right(&self) -> Option<Self> {
        self.to(self.node().right)
    }

    /// The leftmost node of this subtree.
    pub fn minimum(&self) -> Self {
        let mut node = *self;
        while let Some(left) = node.left() {
            node = left;
        }
        node
    }

    /// The rightmost node of this subtree.
    pub fn maximum(&self) -> Self {
        let mut node = *self;
        while let Some(right) = node.right() {
            node = right;
        }
        node
    }

    /// The next node in key order.
    pub fn successor(&self) -> Option<Self> {
        if let Some(right) = self.right() {
            return Some(right.minimum());
        }
        let mut node = *self;
        while node.is_right_child() {
            node = node.parent()?;
        }
        node.parent()
    }

    /// The previous node in key order.
    pub fn predecessor(&self) -> Option<Self> {
        if let Some(left) = self.left() {
            return Some(left.maximum());
        }
        let mut node = *self;
        while node.is_left_child() {
            node = node.parent()?;
        }
        node.parent()
    }

    pub fn is_left_child(&self) -> bool {
        self.parent().is_some_and(|p| p.node().left == Some(self.id))
    }

    pub fn is_right_child(&self) -> bool {
        self.parent().is_some_and(|p| p.node().right == Some(self.id))
    }

    /// The other child of this node's parent.
    pub fn sibling(&self) -> Option<Self> {
        let parent = self.parent()?;
        if self.is_left_child() { parent.right() } else { parent.left() }
    }
}
