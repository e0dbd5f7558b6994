use log::{trace, warn};

use super::RbTree;
use crate::{
    Error, Key, NodeHandle, Result,
    node::{Color, NIL, Side},
};

impl RbTree {
    /// Removes the node named by `node` and returns its key.
    ///
    /// # Arguments
    ///
    /// * `node` - Handle previously returned by this tree
    ///
    /// # Returns
    ///
    /// * `Result<Key>` - The removed key, or [`Error::InvalidHandle`] if the
    ///   handle was already erased, cleared, or issued by another tree; the
    ///   tree is left untouched on failure
    ///
    /// # Examples
    ///
    /// ```
    /// # use arena_rbtree::{Error, RbTree};
    /// let mut tree = RbTree::new(4)?;
    /// let node = tree.insert(7)?;
    /// assert_eq!(tree.erase(node), Ok(7));
    /// assert_eq!(tree.erase(node), Err(Error::InvalidHandle));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn erase(&mut self, node: NodeHandle) -> Result<Key> {
        let Some(node_idx) = self.resolve(node) else {
            warn!("erase rejected a handle that is not live in this tree: {node:?}");
            return Err(Error::InvalidHandle);
        };

        let key = self.node_at(node_idx).key;
        trace!("erase {key} from slot {node_idx}");

        self.delete_node(node_idx);
        self.len -= 1;

        debug_assert!(
            self.validate().is_ok(),
            "RB tree invariants violated after removal"
        );

        Ok(key)
    }

    /// Removes one node holding `key`, the same one [`find`](Self::find)
    /// returns.
    ///
    /// # Returns
    ///
    /// * `Option<Key>` - The removed key, or `None` if no node holds it
    pub fn remove(&mut self, key: Key) -> Option<Key> {
        let node = self.find(key)?;
        self.erase(node).ok()
    }

    fn delete_node(&mut self, node_to_delete: usize) {
        let (removed_color, fixup_node) = self.perform_deletion(node_to_delete);

        if removed_color == Color::Black {
            self.fix_deletion_violations(fixup_node);
        }

        // transplant may have parked a parent on the sentinel
        self.node_at_mut(NIL).parent = NIL;
        self.deallocate_node(node_to_delete);
    }

    /// Unlinks `node`, returning the color that vanished from the tree and the
    /// node (possibly the sentinel) that now occupies the vacated position.
    fn perform_deletion(&mut self, node: usize) -> (Color, usize) {
        let original_color = self.get_color(node);
        let left = self.node_at(node).left;
        let right = self.node_at(node).right;

        if left == NIL {
            self.transplant(node, right);
            return (original_color, right);
        }
        if right == NIL {
            self.transplant(node, left);
            return (original_color, left);
        }

        let successor = self.find_minimum(right);
        let successor_color = self.get_color(successor);
        let fixup_node = self.node_at(successor).right;

        if self.get_parent(successor) == node {
            self.node_at_mut(fixup_node).parent = successor;
        } else {
            self.transplant(successor, fixup_node);
            self.node_at_mut(successor).right = right;
            self.node_at_mut(right).parent = successor;
        }

        self.transplant(node, successor);
        self.node_at_mut(successor).left = left;
        self.node_at_mut(left).parent = successor;
        self.node_at_mut(successor).color = original_color;

        (successor_color, fixup_node)
    }

    /// Restores black-height after a black node left the path through
    /// `fixup_node`, which carries an extra black until the loop resolves it.
    fn fix_deletion_violations(&mut self, mut fixup_node: usize) {
        while fixup_node != self.root && self.is_black(fixup_node) {
            let parent = self.get_parent(fixup_node);
            let side = if self.node_at(parent).left == fixup_node {
                Side::Left
            } else {
                Side::Right
            };
            let far = side.opposite();
            let mut sibling = self.get_child(parent, far);

            if self.is_red(sibling) {
                trace!(
                    "erase fix-up: red sibling {}, rotating it above {}",
                    self.node_at(sibling).key,
                    self.node_at(parent).key
                );
                self.set_color(sibling, Color::Black);
                self.set_color(parent, Color::Red);
                self.rotate(sibling, side);
                sibling = self.get_child(parent, far);
            }

            let near_child = self.get_child(sibling, side);
            let far_child = self.get_child(sibling, far);

            if self.is_black(near_child) && self.is_black(far_child) {
                trace!(
                    "erase fix-up: black nephews, moving deficit up to {}",
                    self.node_at(parent).key
                );
                self.set_color(sibling, Color::Red);
                fixup_node = parent;
                continue;
            }

            if self.is_black(far_child) {
                trace!(
                    "erase fix-up: red near nephew {}, rotating it above {}",
                    self.node_at(near_child).key,
                    self.node_at(sibling).key
                );
                self.set_color(near_child, Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(near_child, far);
                sibling = self.get_child(parent, far);
            }

            trace!(
                "erase fix-up: red far nephew, rotating {} above {}",
                self.node_at(sibling).key,
                self.node_at(parent).key
            );
            self.set_color(sibling, self.get_color(parent));
            self.set_color(parent, Color::Black);
            self.set_color(self.get_child(sibling, far), Color::Black);
            self.rotate(sibling, side);
            fixup_node = self.root;
        }

        self.set_color(fixup_node, Color::Black);
    }
}
