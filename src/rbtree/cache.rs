use std::cell::Cell;

use super::node::NodeId;

/// A small circular buffer of recently resolved nodes.
///
/// Lookups take `&self`, so the slots are [`Cell`]s. Entries are only hints:
/// callers re-check the key of every hit.
#[derive(Debug)]
pub(crate) struct NodeCache {
    slots: Box<[Cell<Option<NodeId>>]>,
    front: Cell<usize>,
}

impl NodeCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| Cell::new(None)).collect(),
            front: Cell::new(0),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn find(&self, mut pred: impl FnMut(NodeId) -> bool) -> Option<NodeId> {
        self.slots.iter().filter_map(Cell::get).find(|&id| pred(id))
    }

    /// Overwrite the slot at the front and advance it.
    pub(crate) fn push(&self, id: NodeId) {
        if self.slots.is_empty() {
            return;
        }
        let front = self.front.get();
        self.slots[front].set(Some(id));
        self.front.set((front + 1) % self.slots.len());
    }

    pub(crate) fn invalidate(&self, id: NodeId) {
        for slot in &self.slots {
            if slot.get() == Some(id) {
                slot.set(None);
            }
        }
    }

    pub(crate) fn clear(&self) {
        self.slots.iter().for_each(|slot| slot.set(None));
        self.front.set(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_around() {
        let cache = NodeCache::new(2);
        cache.push(1);
        cache.push(2);
        cache.push(3);
        assert_eq!(cache.find(|id| id == 1), None);
        assert_eq!(cache.find(|id| id == 2), Some(2));
        assert_eq!(cache.find(|id| id == 3), Some(3));
    }

    #[test]
    fn invalidate_removes_every_copy() {
        let cache = NodeCache::new(3);
        cache.push(7);
        cache.push(7);
        cache.invalidate(7);
        assert_eq!(cache.find(|_| true), None);
    }

    #[test]
    fn zero_capacity_never_hits() {
        let cache = NodeCache::new(0);
        cache.push(1);
        assert_eq!(cache.find(|_| true), None);
    }
}
