use log::{debug, trace};

use super::RbTree;
use crate::{
    Error, Key, NodeHandle, Result,
    node::{Color, NIL, Side},
};

impl RbTree {
    /// Inserts `key` and returns a handle to the new node.
    ///
    /// Keys equal to an existing key are placed to its right, so duplicates
    /// come out of in-order traversal in insertion order.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to insert
    ///
    /// # Returns
    ///
    /// * `Result<NodeHandle>` - The new node, or [`Error::CapacityExhausted`]
    ///   if every arena slot is in use; the tree is left untouched on failure
    ///
    /// # Examples
    ///
    /// ```
    /// # use arena_rbtree::{Error, RbTree};
    /// let mut tree = RbTree::new(2)?;
    /// tree.insert(5)?;
    /// tree.insert(5)?;
    /// assert_eq!(tree.insert(6), Err(Error::CapacityExhausted { capacity: 2 }));
    /// assert_eq!(tree.to_vec(), vec![5, 5]);
    /// # Ok::<(), Error>(())
    /// ```
    pub fn insert(&mut self, key: Key) -> Result<NodeHandle> {
        let Some(new_idx) = self.allocate_node() else {
            debug!("insert {key}: all {} slots in use", self.capacity);
            return Err(Error::CapacityExhausted {
                capacity: self.capacity,
            });
        };
        trace!("insert {key} into slot {new_idx}");

        let (parent_idx, side) = self.find_insertion_parent(key);
        self.create_node(new_idx, key, parent_idx);
        self.link_to_parent(new_idx, parent_idx, side);
        self.len += 1;

        if self.is_red(parent_idx) {
            self.fix_insertion_violations(new_idx);
        }

        debug_assert!(
            self.validate().is_ok(),
            "RB tree invariants violated after insertion"
        );

        Ok(self.handle(new_idx))
    }

    /// Descends to the sentinel, returning the last real node visited and the
    /// side the new node hangs from. Ties go right.
    fn find_insertion_parent(&self, key: Key) -> (usize, Side) {
        let mut current = self.root;
        let mut parent = NIL;
        let mut side = Side::Left;

        while current != NIL {
            parent = current;
            let node = self.node_at(current);
            if key < node.key {
                side = Side::Left;
                current = node.left;
            } else {
                side = Side::Right;
                current = node.right;
            }
        }
        (parent, side)
    }

    fn create_node(&mut self, idx: usize, key: Key, parent: usize) {
        let node = self.node_at_mut(idx);
        node.key = key;
        node.parent = parent;
        node.left = NIL;
        node.right = NIL;
        node.color = Color::Red;
    }

    fn link_to_parent(&mut self, node_idx: usize, parent_idx: usize, side: Side) {
        if parent_idx == NIL {
            self.root = node_idx;
            self.set_color(node_idx, Color::Black);
        } else {
            self.node_at_mut(parent_idx).set_child(side, node_idx);
        }
    }

    /// Repairs a red node with a red parent, the only violation an insert can
    /// introduce.
    fn fix_insertion_violations(&mut self, mut node: usize) {
        while self.is_red(self.get_parent(node)) {
            let parent = self.get_parent(node);
            let grandparent = self.get_parent(parent);
            let parent_side = self.side_of(parent);
            let uncle = self.get_child(grandparent, parent_side.opposite());

            if self.is_red(uncle) {
                trace!(
                    "insert fix-up: red uncle, pushing red up to {}",
                    self.node_at(grandparent).key
                );
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            let mut parent = parent;
            if self.side_of(node) != parent_side {
                trace!(
                    "insert fix-up: straightening zig-zag at {}",
                    self.node_at(node).key
                );
                self.rotate(node, parent_side);
                node = parent;
                parent = self.get_parent(node);
            }

            trace!(
                "insert fix-up: rotating {} above {}",
                self.node_at(parent).key,
                self.node_at(grandparent).key
            );
            self.set_color(parent, Color::Black);
            self.set_color(grandparent, Color::Red);
            self.rotate(parent, parent_side.opposite());
        }
        self.set_color(self.root, Color::Black);
    }
}
