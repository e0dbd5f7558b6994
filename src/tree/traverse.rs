use alloc::vec::Vec;
use core::iter::FusedIterator;

use log::debug;

use super::RbTree;
use crate::{
    Key, NodeHandle,
    node::{NIL, Side},
};

impl RbTree {
    /// Returns the node that follows `node` in key order.
    ///
    /// # Returns
    ///
    /// * `Option<NodeHandle>` - The in-order successor, or `None` if `node` is
    ///   the last node or is not live
    pub fn successor(&self, node: NodeHandle) -> Option<NodeHandle> {
        let idx = self.resolve(node)?;
        let next = self.next_index(idx);
        (next != NIL).then(|| self.handle(next))
    }

    /// Returns the node that precedes `node` in key order.
    ///
    /// # Returns
    ///
    /// * `Option<NodeHandle>` - The in-order predecessor, or `None` if `node`
    ///   is the first node or is not live
    pub fn predecessor(&self, node: NodeHandle) -> Option<NodeHandle> {
        let idx = self.resolve(node)?;
        let prev = self.prev_index(idx);
        (prev != NIL).then(|| self.handle(prev))
    }

    /// Returns an iterator over the keys in non-decreasing order.
    ///
    /// ```
    /// # use arena_rbtree::RbTree;
    /// let mut tree = RbTree::new(4)?;
    /// for key in [3, 1, 2, 1] {
    ///     tree.insert(key)?;
    /// }
    /// let keys: Vec<_> = tree.iter().collect();
    /// assert_eq!(keys, [1, 1, 2, 3]);
    /// assert_eq!(tree.iter().rev().next(), Some(3));
    /// # Ok::<(), arena_rbtree::Error>(())
    /// ```
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tree: self,
            front: self.find_minimum(self.root),
            back: self.find_maximum(self.root),
            remaining: self.len,
        }
    }

    /// Writes keys in non-decreasing order into `dest`, stopping when `dest` is
    /// full or the tree is exhausted.
    ///
    /// The walk keeps no state between calls, so exporting again restarts from
    /// the smallest key.
    ///
    /// # Arguments
    ///
    /// * `dest` - Destination buffer; its length is the export capacity
    ///
    /// # Returns
    ///
    /// * `usize` - Number of keys written, `min(dest.len(), self.len())`
    ///
    /// # Examples
    ///
    /// ```
    /// # use arena_rbtree::RbTree;
    /// let mut tree = RbTree::new(8)?;
    /// for key in [40, 10, 30, 20] {
    ///     tree.insert(key)?;
    /// }
    /// let mut first_three = [0; 3];
    /// assert_eq!(tree.export_ordered(&mut first_three), 3);
    /// assert_eq!(first_three, [10, 20, 30]);
    /// # Ok::<(), arena_rbtree::Error>(())
    /// ```
    pub fn export_ordered(&self, dest: &mut [Key]) -> usize {
        let mut written = 0;
        for (slot, key) in dest.iter_mut().zip(self.iter()) {
            *slot = key;
            written += 1;
        }
        written
    }

    /// Collects every key in non-decreasing order.
    pub fn to_vec(&self) -> Vec<Key> {
        self.iter().collect()
    }

    /// Removes every node, keeping the arena for reuse.
    ///
    /// Nodes are released in post-order, each child before its parent, by
    /// walking the parent links, so no auxiliary stack is needed. Handles
    /// issued before the call no longer resolve afterwards.
    pub fn clear(&mut self) {
        let released = self.len;
        let mut node = self.root;

        while node != NIL {
            let left = self.node_at(node).left;
            if left != NIL {
                node = left;
                continue;
            }
            let right = self.node_at(node).right;
            if right != NIL {
                node = right;
                continue;
            }

            let parent = self.get_parent(node);
            if parent != NIL {
                let side = self.side_of(node);
                self.node_at_mut(parent).set_child(side, NIL);
            }
            self.deallocate_node(node);
            node = parent;
        }

        self.root = NIL;
        self.len = 0;
        debug!("cleared {released} nodes");
    }

    fn next_index(&self, node: usize) -> usize {
        self.step(node, Side::Right)
    }

    fn prev_index(&self, node: usize) -> usize {
        self.step(node, Side::Left)
    }

    /// One in-order step toward `side`: the extreme node of the `side`
    /// subtree if there is one, otherwise the first ancestor reached from its
    /// opposite side.
    fn step(&self, node: usize, side: Side) -> usize {
        let child = self.get_child(node, side);
        if child != NIL {
            return match side {
                Side::Right => self.find_minimum(child),
                Side::Left => self.find_maximum(child),
            };
        }

        let mut current = node;
        let mut parent = self.get_parent(current);
        while parent != NIL && self.get_child(parent, side) == current {
            current = parent;
            parent = self.get_parent(current);
        }
        parent
    }
}

/// In-order iterator over the keys of an [`RbTree`].
///
/// Created by [`RbTree::iter`]. Walks parent links, so it borrows the tree
/// without allocating.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    tree: &'a RbTree,
    front: usize,
    back: usize,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.tree.node_at(self.front).key;
        self.front = self.tree.next_index(self.front);
        self.remaining -= 1;
        Some(key)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Key> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.tree.node_at(self.back).key;
        self.back = self.tree.prev_index(self.back);
        self.remaining -= 1;
        Some(key)
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a RbTree {
    type Item = Key;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(capacity: usize, keys: &[Key]) -> RbTree {
        let mut tree = RbTree::new(capacity).unwrap();
        for &key in keys {
            tree.insert(key).unwrap();
        }
        tree
    }

    #[test]
    fn test_export_empty_tree() {
        let tree = RbTree::new(4).unwrap();
        let mut out = [7; 4];
        assert_eq!(tree.export_ordered(&mut out), 0);
        assert_eq!(out, [7; 4]);
        assert!(tree.to_vec().is_empty());
        assert_eq!(tree.iter().next(), None);
    }

    #[test]
    fn test_export_stops_at_capacity() {
        let tree = tree_with(10, &[5, 3, 8, 1, 4, 7, 9]);

        let mut out = [0; 4];
        assert_eq!(tree.export_ordered(&mut out), 4);
        assert_eq!(out, [1, 3, 4, 5]);

        let mut out = [0; 10];
        assert_eq!(tree.export_ordered(&mut out), 7);
        assert_eq!(&out[..7], &[1, 3, 4, 5, 7, 8, 9]);
        assert_eq!(&out[7..], &[0, 0, 0]);

        let mut none: [Key; 0] = [];
        assert_eq!(tree.export_ordered(&mut none), 0);
    }

    #[test]
    fn test_export_is_restartable() {
        let tree = tree_with(5, &[2, 1, 3]);
        let mut first = [0; 3];
        let mut second = [0; 3];
        tree.export_ordered(&mut first);
        tree.export_ordered(&mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_export() {
        let mut tree = tree_with(3, &[5, 5, 5]);
        let mut out = [0; 3];
        assert_eq!(tree.export_ordered(&mut out), 3);
        assert_eq!(out, [5, 5, 5]);

        tree.remove(5).unwrap();
        let mut out = [0; 3];
        assert_eq!(tree.export_ordered(&mut out), 2);
        assert_eq!(&out[..2], &[5, 5]);
    }

    #[test]
    fn test_iter_both_ends_meet() {
        let tree = tree_with(8, &[4, 2, 6, 1, 3, 5, 7]);
        let mut iter = tree.iter();
        assert_eq!(iter.len(), 7);
        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.next_back(), Some(7));
        assert_eq!(iter.next(), Some(2));
        assert_eq!(iter.next_back(), Some(6));
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.collect::<Vec<_>>(), vec![3, 4, 5]);

        let reversed: Vec<Key> = tree.iter().rev().collect();
        assert_eq!(reversed, vec![7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_into_iterator_for_reference() {
        let tree = tree_with(3, &[2, 3, 1]);
        let mut total = 0;
        for key in &tree {
            total += key;
        }
        assert_eq!(total, 6);
    }

    #[test]
    fn test_successor_and_predecessor_walk() {
        let tree = tree_with(16, &[50, 25, 75, 12, 37, 62, 87, 6, 18]);

        let mut forward = Vec::new();
        let mut node = tree.min();
        while let Some(handle) = node {
            forward.push(tree.key(handle).unwrap());
            node = tree.successor(handle);
        }
        assert_eq!(forward, vec![6, 12, 18, 25, 37, 50, 62, 75, 87]);

        let mut backward = Vec::new();
        let mut node = tree.max();
        while let Some(handle) = node {
            backward.push(tree.key(handle).unwrap());
            node = tree.predecessor(handle);
        }
        forward.reverse();
        assert_eq!(backward, forward);
    }

    #[test]
    fn test_successor_of_stale_handle_is_none() {
        let mut tree = tree_with(4, &[1, 2, 3]);
        let two = tree.find(2).unwrap();
        tree.erase(two).unwrap();
        assert!(tree.successor(two).is_none());
        assert!(tree.predecessor(two).is_none());
    }

    #[test]
    fn test_rbtree_reset_functionality() {
        let mut tree = tree_with(10, &[1, 2, 3, 4, 5]);
        let handles: Vec<NodeHandle> = (1..=5).map(|k| tree.find(k).unwrap()).collect();

        tree.clear();

        assert_eq!(tree.len(), 0);
        assert_eq!(tree.remaining_capacity(), 10);
        assert!(tree.is_empty());
        assert_eq!(tree.root, NIL);
        assert!(tree.validate().is_ok());
        for handle in handles {
            assert_eq!(tree.key(handle), None);
        }

        tree.insert(42).unwrap();
        assert_eq!(tree.to_vec(), vec![42]);
    }

    #[test]
    fn test_clear_releases_every_slot_once() {
        let keys: Vec<Key> = (0..100).collect();
        let mut tree = tree_with(100, &keys);

        tree.clear();

        assert_eq!(tree.free_top, 100);
        let mut released: Vec<usize> = tree.free_list.to_vec();
        released.sort_unstable();
        assert_eq!(released, (1..=100).collect::<Vec<_>>());
        for slot in 1..=100 {
            assert_eq!(tree.node_at(slot).generation, 1);
        }
    }

    #[test]
    fn test_clear_empty_tree() {
        let mut tree = RbTree::new(2).unwrap();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.free_top, 2);
    }
}
