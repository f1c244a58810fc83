//! A red-black tree mapping disjoint [`TextRange`]s to values.

mod cache;
mod node;

use cache::NodeCache;
pub use node::{Color, NodeRef};
use node::{Node, NodeId, Side};

use crate::{Error, Result, TextRange};

/// A red-black tree storing values keyed by pairwise disjoint ranges.
///
/// Nodes live in an arena and refer to each other by index; the parent link
/// is a plain index kept in sync by every rotation and splice.
///
/// # Examples
///
/// ```
/// # use text_storage::{RangeTree, TextRange, Error};
/// let mut tree = RangeTree::new();
/// tree.insert(TextRange::new(0, 5), "first").unwrap();
/// tree.insert(TextRange::new(5, 2), "second").unwrap();
/// assert_eq!(tree.get(6), Some(&"second"));
/// assert_eq!(tree.get(7), None);
///
/// let err = tree.insert(TextRange::new(2, 3), "third").unwrap_err();
/// assert!(matches!(err, Error::Overlap { .. }));
/// ```
#[derive(Debug)]
pub struct RangeTree<V> {
    nodes: Vec<Option<Node<V>>>,
    /// Vacant slots of `nodes`, reused before the arena grows.
    free: Vec<NodeId>,
    root: Option<NodeId>,
    len: usize,
    cache: NodeCache,
}

impl<V> Default for RangeTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RangeTree<V> {
    pub const DEFAULT_CACHE_CAPACITY: usize = crate::Config::DEFAULT_CACHE_CAPACITY;

    pub fn new() -> Self {
        Self::with_cache_capacity(Self::DEFAULT_CACHE_CAPACITY)
    }

    /// A tree remembering up to `capacity` recently found nodes. A capacity of
    /// `0` disables the cache.
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
            cache: NodeCache::new(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity()
    }

    pub fn root(&self) -> Option<NodeRef<'_, V>> {
        self.node_ref(self.root)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
        self.cache.clear();
    }

    /// The value whose range contains `position`.
    pub fn get(&self, position: usize) -> Option<&V> {
        self.node_at(position).map(|node| node.value())
    }

    /// The node whose range contains `position`.
    ///
    /// The cache is scanned first; a node found by descending the tree is
    /// recorded in it.
    pub fn node_at(&self, position: usize) -> Option<NodeRef<'_, V>> {
        let cached =
            self.cache.find(|id| self.node(id).key.contains(position));
        if cached.is_some() {
            return self.node_ref(cached);
        }

        let id = self.search(position)?;
        self.cache.push(id);
        self.node_ref(Some(id))
    }

    /// Iterate over the stored ranges and values in order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter { next: self.root().map(|root| root.minimum()) }
    }

    /// Iterate in order, starting at the node containing `position`. The
    /// iterator is empty if no range contains it.
    pub fn iter_from(&self, position: usize) -> Iter<'_, V> {
        Iter { next: self.node_at(position) }
    }

    /// Insert `value` at `range`.
    ///
    /// If `range` is already stored, its value is replaced and the old one is
    /// returned.
    ///
    /// # Errors
    ///
    /// [`Error::Overlap`] if `range` partially intersects a stored range.
    pub fn insert(&mut self, range: TextRange, value: V) -> Result<Option<V>> {
        let mut parent = None;
        let mut side = Side::Left;
        let mut curr = self.root;

        // Disjoint ranges sorted by start: the only candidates for an overlap
        // are the in-order neighbours of `range`, and both lie on this path.
        while let Some(id) = curr {
            let node = self.node(id);
            if node.key == range {
                let node = self.node_mut(id);
                return Ok(Some(std::mem::replace(&mut node.value, value)));
            }
            if node.key.overlaps(&range) {
                return Err(Error::Overlap { range, existing: node.key });
            }

            side = if range.location < node.key.location {
                Side::Left
            } else {
                Side::Right
            };
            parent = Some(id);
            curr = node.child(side);
        }

        let id = self.alloc(Node::new(range, value, parent));
        match parent {
            Some(parent) => self.node_mut(parent).set_child(side, Some(id)),
            None => self.root = Some(id),
        }
        self.len += 1;
        self.insert_fixup(id);

        Ok(None)
    }

    /// Remove the node stored exactly at `range`, returning its value.
    pub fn remove(&mut self, range: TextRange) -> Option<V> {
        let z = self.find_exact(range)?;

        // A node with two children trades places with its successor, which
        // has at most one child.
        let y = match (self.node(z).left, self.node(z).right) {
            (Some(_), Some(right)) => self.minimum(right),
            _ => z,
        };
        let y_node = self.node(y);
        let x = y_node.left.or(y_node.right);
        let x_parent = y_node.parent;

        if let Some(x) = x {
            self.node_mut(x).parent = x_parent;
        }
        self.replace_child(x_parent, y, x);

        let y_node = self.dealloc(y);
        let removed = if y == z {
            y_node.value
        } else {
            let z_node = self.node_mut(z);
            z_node.key = y_node.key;
            std::mem::replace(&mut z_node.value, y_node.value)
        };

        if y_node.color == Color::Black {
            self.remove_fixup(x, x_parent);
        }
        self.len -= 1;

        Some(removed)
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while let Some(p) = self.node(z).parent
            && self.is_red(Some(p))
        {
            // A red node is never the root, so `p` has a parent.
            let Some(g) = self.node(p).parent else { break };
            let side = self.side_of(p, g);
            let uncle = self.node(g).child(side.opposite());

            if let Some(uncle) = uncle
                && self.is_red(Some(uncle))
            {
                self.node_mut(p).color = Color::Black;
                self.node_mut(uncle).color = Color::Black;
                self.node_mut(g).color = Color::Red;
                z = g;
                continue;
            }

            let mut p = p;
            if self.node(p).child(side.opposite()) == Some(z) {
                // Inner child: turn it into the outer case.
                self.rotate(p, side);
                std::mem::swap(&mut z, &mut p);
            }

            self.node_mut(p).color = Color::Black;
            self.node_mut(g).color = Color::Red;
            self.rotate(g, side.opposite());
            break;
        }

        if let Some(root) = self.root {
            self.node_mut(root).color = Color::Black;
        }
    }

    /// Restore the red-black invariants after a black node was spliced out.
    /// `x` is the node that took its place (possibly none), and `parent` is
    /// the parent of that slot.
    fn remove_fixup(&mut self, mut x: Option<NodeId>, mut parent: Option<NodeId>) {
        while x != self.root && !self.is_red(x) {
            let Some(p) = parent else { break };
            let side = if self.node(p).left == x { Side::Left } else { Side::Right };
            let far = side.opposite();

            // `x` carries an extra black, so its sibling subtree has black
            // height of at least one.
            let Some(mut w) = self.node(p).child(far) else { break };

            if self.is_red(Some(w)) {
                self.node_mut(w).color = Color::Black;
                self.node_mut(p).color = Color::Red;
                self.rotate(p, side);
                let Some(sibling) = self.node(p).child(far) else { break };
                w = sibling;
            }

            let near_child = self.node(w).child(side);
            let far_child = self.node(w).child(far);

            if !self.is_red(near_child) && !self.is_red(far_child) {
                self.node_mut(w).color = Color::Red;
                x = Some(p);
                parent = self.node(p).parent;
                continue;
            }

            if !self.is_red(far_child) {
                if let Some(near) = near_child {
                    self.node_mut(near).color = Color::Black;
                }
                self.node_mut(w).color = Color::Red;
                self.rotate(w, far);
                let Some(sibling) = self.node(p).child(far) else { break };
                w = sibling;
            }

            self.node_mut(w).color = self.node(p).color;
            self.node_mut(p).color = Color::Black;
            if let Some(far_child) = self.node(w).child(far) {
                self.node_mut(far_child).color = Color::Black;
            }
            self.rotate(p, side);
            x = self.root;
            break;
        }

        if let Some(x) = x {
            self.node_mut(x).color = Color::Black;
        }
    }

    /// Rotate `pivot` towards `side`: its child on the opposite side takes
    /// its place, and `pivot` becomes that child's `side` child.
    fn rotate(&mut self, pivot: NodeId, side: Side) {
        let Some(child) = self.node(pivot).child(side.opposite()) else {
            unreachable!("rotation without a child to lift");
        };
        let inner = self.node(child).child(side);

        self.node_mut(pivot).set_child(side.opposite(), inner);
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(pivot);
        }

        let parent = self.node(pivot).parent;
        self.node_mut(child).parent = parent;
        self.replace_child(parent, pivot, Some(child));

        self.node_mut(child).set_child(side, Some(pivot));
        self.node_mut(pivot).parent = Some(child);
    }

    /// Point the link of `parent` that referred to `old` at `new`, or the
    /// root if `parent` is `None`. The parent link of `new` is left as is.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let side = self.side_of(old, parent);
                self.node_mut(parent).set_child(side, new);
            }
        }
    }

    fn side_of(&self, child: NodeId, parent: NodeId) -> Side {
        if self.node(parent).left == Some(child) { Side::Left } else { Side::Right }
    }

    /// `None` children are black.
    fn is_red(&self, id: Option<NodeId>) -> bool {
        id.is_some_and(|id| self.node(id).color == Color::Red)
    }

    fn minimum(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.node(id).left {
            id = left;
        }
        id
    }

    fn search(&self, position: usize) -> Option<NodeId> {
        let mut curr = self.root;
        while let Some(id) = curr {
            let key = self.node(id).key;
            if position < key.location {
                curr = self.node(id).left;
            } else if position >= key.end() {
                curr = self.node(id).right;
            } else {
                return Some(id);
            }
        }
        None
    }

    fn find_exact(&self, range: TextRange) -> Option<NodeId> {
        let mut curr = self.root;
        while let Some(id) = curr {
            let key = self.node(id).key;
            if key == range {
                return Some(id);
            }
            curr = if range.location < key.location {
                self.node(id).left
            } else {
                self.node(id).right
            };
        }
        None
    }

    fn alloc(&mut self, node: Node<V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn dealloc(&mut self, id: NodeId) -> Node<V> {
        self.cache.invalidate(id);
        let Some(node) = self.nodes[id].take() else {
            unreachable!("node {id} freed twice");
        };
        self.free.push(id);
        node
    }

    fn node_ref(&self, id: Option<NodeId>) -> Option<NodeRef<'_, V>> {
        id.map(|id| NodeRef { tree: self, id })
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<V> {
        match &self.nodes[id] {
            Some(node) => node,
            None => unreachable!("dangling node handle {id}"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<V> {
        match &mut self.nodes[id] {
            Some(node) => node,
            None => unreachable!("dangling node handle {id}"),
        }
    }
}

/// In-order iterator over a [`RangeTree`].
#[derive(Debug)]
pub struct Iter<'a, V> {
    next: Option<NodeRef<'a, V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (TextRange, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.successor();
        Some((node.key(), node.value()))
    }
}

impl<'a, V> IntoIterator for &'a RangeTree<V> {
    type Item = (TextRange, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Check the red-black invariants, returning the black height.
    fn check(node: Option<NodeRef<'_, u32>>) -> usize {
        let Some(node) = node else { return 1 };

        if let Some(left) = node.left() {
            assert_eq!(left.parent().map(|p| p.key()), Some(node.key()));
            assert!(left.key().end() <= node.key().location);
        }
        if let Some(right) = node.right() {
            assert_eq!(right.parent().map(|p| p.key()), Some(node.key()));
            assert!(node.key().end() <= right.key().location);
        }
        if node.color() == Color::Red {
            assert!(node.left().is_none_or(|n| n.color() == Color::Black));
            assert!(node.right().is_none_or(|n| n.color() == Color::Black));
        }

        let left = check(node.left());
        let right = check(node.right());
        assert_eq!(left, right, "black heights differ under {}", node.key());
        left + usize::from(node.color() == Color::Black)
    }

    fn assert_valid(tree: &RangeTree<u32>) {
        if let Some(root) = tree.root() {
            assert_eq!(root.color(), Color::Black);
            assert!(root.parent().is_none());
        }
        check(tree.root());
        assert_eq!(tree.iter().count(), tree.len());
    }

    fn r(location: usize, length: usize) -> TextRange {
        TextRange::new(location, length)
    }

    #[test]
    fn validity_after_inserts_and_removals() {
        let mut tree = RangeTree::new();
        let keys = [(5, 1), (0, 1), (2, 2), (10, 1), (7, 2), (11, 1), (12, 1)]
            .into_iter()
            .chain((13..=18).map(|i| (i, 1)));
        for (i, (loc, len)) in keys.enumerate() {
            tree.insert(r(loc, len), i as u32).unwrap();
            assert_valid(&tree);
        }

        for loc in [10, 11, 13, 17] {
            assert!(tree.remove(r(loc, 1)).is_some());
            assert_valid(&tree);
        }

        assert_eq!(tree.len(), 9);
        assert_eq!(tree.root().map(|r| r.color()), Some(Color::Black));
    }

    #[test]
    fn overlapping_insert_fails() {
        let mut tree = RangeTree::new();
        tree.insert(r(0, 5), 0).unwrap();

        assert_eq!(
            tree.insert(r(2, 3), 1),
            Err(Error::Overlap { range: r(2, 3), existing: r(0, 5) })
        );
        assert!(tree.insert(r(4, 2), 1).is_err());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn exact_insert_replaces_value() {
        let mut tree = RangeTree::new();
        tree.insert(r(0, 5), 0).unwrap();
        tree.insert(r(5, 5), 1).unwrap();

        assert_eq!(tree.insert(r(5, 5), 2), Ok(Some(1)));
        assert_eq!(tree.get(7), Some(&2));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn get_resolves_positions() {
        let mut tree = RangeTree::new();
        for i in 0..10 {
            tree.insert(r(i * 3, 3), i as u32).unwrap();
        }
        for position in 0..30 {
            assert_eq!(tree.get(position), Some(&(position as u32 / 3)));
        }
        assert_eq!(tree.get(30), None);
    }

    #[test]
    fn removing_a_miss_is_not_an_error() {
        let mut tree: RangeTree<u32> = RangeTree::new();
        assert_eq!(tree.remove(r(0, 1)), None);
        tree.insert(r(0, 4), 1).unwrap();
        assert_eq!(tree.remove(r(0, 2)), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn removal_invalidates_cached_nodes() {
        let mut tree = RangeTree::new();
        tree.insert(r(0, 2), 0).unwrap();
        tree.insert(r(2, 2), 1).unwrap();
        tree.insert(r(4, 2), 2).unwrap();

        // Warm the cache with every node.
        for position in 0..6 {
            tree.get(position);
        }
        assert_eq!(tree.remove(r(2, 2)), Some(1));
        assert_eq!(tree.get(3), None);
        assert_eq!(tree.get(1), Some(&0));
        assert_eq!(tree.get(5), Some(&2));

        // The freed slot is reused by the next insert.
        tree.insert(r(2, 2), 3).unwrap();
        assert_eq!(tree.get(3), Some(&3));
    }

    #[test]
    fn navigation() {
        let mut tree = RangeTree::new();
        for i in 0..7 {
            tree.insert(r(i, 1), i as u32).unwrap();
        }

        let root = tree.root().unwrap();
        assert_eq!(root.minimum().key(), r(0, 1));
        assert_eq!(root.maximum().key(), r(6, 1));
        assert!(!root.is_left_child());
        assert!(!root.is_right_child());
        assert!(root.sibling().is_none());

        let first = tree.node_at(0).unwrap();
        assert!(first.predecessor().is_none());
        let keys: Vec<_> =
            std::iter::successors(Some(first), |n| n.successor()).map(|n| n.key().location).collect();
        assert_eq!(keys, (0..7).collect::<Vec<_>>());

        let last = tree.node_at(6).unwrap();
        let keys: Vec<_> =
            std::iter::successors(Some(last), |n| n.predecessor()).map(|n| n.key().location).collect();
        assert_eq!(keys, (0..7).rev().collect::<Vec<_>>());

        let left = root.left().unwrap();
        assert!(left.is_left_child());
        assert_eq!(left.sibling().map(|s| s.key()), root.right().map(|s| s.key()));
    }

    #[test]
    fn iter_from_starts_at_containing_node() {
        let mut tree = RangeTree::new();
        for i in 0..5 {
            tree.insert(r(i * 2, 2), i as u32).unwrap();
        }
        let values: Vec<_> = tree.iter_from(5).map(|(_, v)| *v).collect();
        assert_eq!(values, [2, 3, 4]);
        assert_eq!(tree.iter_from(10).count(), 0);
    }

    #[test]
    fn random_operations_keep_invariants() {
        use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

        let mut rng = StdRng::seed_from_u64(0x5eed);
        for cache in [0, RangeTree::<u32>::DEFAULT_CACHE_CAPACITY] {
            let mut tree = RangeTree::with_cache_capacity(cache);
            let mut keys: Vec<usize> = (0..200).collect();
            keys.shuffle(&mut rng);

            for &k in &keys {
                tree.insert(r(k * 4, 4), k as u32).unwrap();
            }
            assert_valid(&tree);

            keys.shuffle(&mut rng);
            for (i, &k) in keys.iter().enumerate() {
                assert_eq!(tree.remove(r(k * 4, 4)), Some(k as u32));
                if i % 17 == 0 {
                    assert_valid(&tree);
                    let probe = rng.gen_range(0..800);
                    let expected = keys[i + 1..].contains(&(probe / 4));
                    assert_eq!(tree.get(probe).is_some(), expected);
                }
            }
            assert!(tree.is_empty());
            assert!(tree.root().is_none());
        }
    }
}
