use alloc::{boxed::Box, vec::Vec};
use core::cmp::Ordering;
#[cfg(target_has_atomic = "32")]
use core::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

use crate::{
    Error, Key, NodeHandle, Result,
    node::{Color, NIL, Node, Side},
};

mod erase;
mod insert;
mod traverse;
mod validate;

pub use traverse::Iter;

/// Source of per-tree identifiers stamped into every handle.
#[cfg(target_has_atomic = "32")]
static NEXT_TREE_ID: AtomicU32 = AtomicU32::new(0);

#[cfg(target_has_atomic = "32")]
fn next_tree_id() -> u32 {
    NEXT_TREE_ID.fetch_add(1, AtomicOrdering::Relaxed)
}

/// Targets without 32-bit atomics share one id, so handles from another tree
/// are only caught by the slot generation check.
#[cfg(not(target_has_atomic = "32"))]
fn next_tree_id() -> u32 {
    0
}

/// A Red-Black tree over [`Key`]s backed by a fixed-capacity node arena.
///
/// This tree provides O(log n) insertion, lookup and deletion with support for
/// duplicate keys. Memory is pre-allocated at construction and reused via a
/// free list, so no allocation happens after [`RbTree::new`] returns.
///
/// Key features:
/// - Slot 0 of the arena is the black sentinel that replaces every absent
///   child and parent
/// - Duplicate keys are stored as separate nodes, each new copy to the right
///   of the existing ones
/// - Nodes are addressed through generation-checked [`NodeHandle`]s
/// - Every mutation re-validates all invariants in debug builds
#[derive(Debug)]
pub struct RbTree {
    /// Node arena; index 0 is the sentinel, indices `1..=capacity` hold nodes
    nodes: Box<[Node]>,

    /// Stack of available node indices for allocation
    /// Acts as a LIFO stack where free_top points to the next available slot
    free_list: Box<[usize]>,

    /// Index pointing to the next free slot in free_list (stack top)
    /// When free_top == 0, no free nodes are available
    free_top: usize,

    /// Number of nodes currently stored in the tree, duplicates included
    len: usize,

    /// Maximum number of nodes this tree can hold
    capacity: usize,

    /// Index of the root node, NIL when the tree is empty
    root: usize,

    /// Identifier stamped into handles issued by this tree
    id: u32,
}

impl RbTree {
    /// Creates an empty tree able to hold `capacity` nodes.
    ///
    /// The whole arena, sentinel included, is reserved up front.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of keys the tree can hold at once
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The empty tree, or [`Error::Allocation`] if the arena
    ///   could not be reserved
    ///
    /// # Panics
    ///
    /// If `capacity` is zero or larger than `usize::MAX / 2`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use arena_rbtree::RbTree;
    /// let tree = RbTree::new(8)?;
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.capacity(), 8);
    /// # Ok::<(), arena_rbtree::Error>(())
    /// ```
    pub fn new(capacity: usize) -> Result<Self> {
        assert!(capacity > 0, "Capacity must be greater than 0");
        assert!(
            capacity <= usize::MAX / 2,
            "Capacity too large - risk of index overflow"
        );

        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(capacity + 1)
            .map_err(Error::Allocation)?;
        nodes.resize(capacity + 1, Node::vacant());
        nodes[NIL] = Node::sentinel();

        let mut free_list = Vec::new();
        free_list
            .try_reserve_exact(capacity)
            .map_err(Error::Allocation)?;
        free_list.extend((1..=capacity).rev());

        Ok(Self {
            nodes: nodes.into_boxed_slice(),
            free_list: free_list.into_boxed_slice(),
            free_top: capacity,
            len: 0,
            capacity,
            root: NIL,
            id: next_tree_id(),
        })
    }

    /// Number of keys in the tree, duplicates included.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree holds no keys.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of keys the tree can hold.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of keys that can still be inserted.
    #[inline]
    pub const fn remaining_capacity(&self) -> usize {
        self.capacity - self.len
    }

    /// Finds a node holding `key`.
    ///
    /// Follows the same descent as insertion and returns the first matching
    /// node met on the way down. When duplicates exist this is not necessarily
    /// the first of them in order.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to look up
    ///
    /// # Returns
    ///
    /// * `Option<NodeHandle>` - A node holding `key`, or `None` if absent
    pub fn find(&self, key: Key) -> Option<NodeHandle> {
        self.find_node(key).map(|idx| self.handle(idx))
    }

    /// Returns `true` if at least one node holds `key`.
    pub fn contains(&self, key: Key) -> bool {
        self.find_node(key).is_some()
    }

    /// Returns the node with the smallest key, or `None` if the tree is empty.
    ///
    /// ```
    /// # use arena_rbtree::RbTree;
    /// let mut tree = RbTree::new(4)?;
    /// assert!(tree.min().is_none());
    /// tree.insert(3)?;
    /// tree.insert(-1)?;
    /// assert_eq!(tree.min().and_then(|node| tree.key(node)), Some(-1));
    /// # Ok::<(), arena_rbtree::Error>(())
    /// ```
    pub fn min(&self) -> Option<NodeHandle> {
        if self.root == NIL {
            return None;
        }
        Some(self.handle(self.find_minimum(self.root)))
    }

    /// Returns the node with the largest key, or `None` if the tree is empty.
    pub fn max(&self) -> Option<NodeHandle> {
        if self.root == NIL {
            return None;
        }
        Some(self.handle(self.find_maximum(self.root)))
    }

    /// Returns the key stored at `node`, or `None` if the handle is not live.
    pub fn key(&self, node: NodeHandle) -> Option<Key> {
        self.resolve(node).map(|idx| self.node_at(idx).key)
    }

    /// Longest root-to-leaf path, counted in nodes. `0` for an empty tree.
    pub fn height(&self) -> usize {
        self.subtree_height(self.root)
    }

    fn subtree_height(&self, node: usize) -> usize {
        if node == NIL {
            return 0;
        }
        let node = self.node_at(node);
        1 + self
            .subtree_height(node.left)
            .max(self.subtree_height(node.right))
    }

    #[inline]
    const fn allocate_node(&mut self) -> Option<usize> {
        if self.free_top == 0 {
            None
        } else {
            self.free_top -= 1;
            Some(self.free_list[self.free_top])
        }
    }

    #[inline]
    const fn deallocate_node(&mut self, node_idx: usize) {
        debug_assert!(node_idx != NIL && node_idx <= self.capacity);
        let node = self.node_at_mut(node_idx);
        node.generation = node.generation.wrapping_add(1);
        self.free_list[self.free_top] = node_idx;
        self.free_top += 1;
    }

    #[inline]
    const fn node_at(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    #[inline]
    const fn node_at_mut(&mut self, idx: usize) -> &mut Node {
        &mut self.nodes[idx]
    }

    #[inline]
    const fn handle(&self, idx: usize) -> NodeHandle {
        NodeHandle {
            tree: self.id,
            index: idx,
            generation: self.node_at(idx).generation,
        }
    }

    /// Maps a handle back to its arena index if it names a live node of this
    /// tree.
    fn resolve(&self, handle: NodeHandle) -> Option<usize> {
        let live = handle.tree == self.id
            && handle.index != NIL
            && handle.index < self.nodes.len()
            && self.node_at(handle.index).generation == handle.generation;
        live.then_some(handle.index)
    }

    fn find_node(&self, key: Key) -> Option<usize> {
        let mut current = self.root;

        while current != NIL {
            let node = self.node_at(current);
            match key.cmp(&node.key) {
                Ordering::Equal => return Some(current),
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
            }
        }
        None
    }

    const fn find_minimum(&self, mut node: usize) -> usize {
        while node != NIL {
            let left = self.node_at(node).left;
            if left == NIL {
                break;
            }
            node = left;
        }
        node
    }

    const fn find_maximum(&self, mut node: usize) -> usize {
        while node != NIL {
            let right = self.node_at(node).right;
            if right == NIL {
                break;
            }
            node = right;
        }
        node
    }

    #[inline]
    const fn get_color(&self, node_idx: usize) -> Color {
        self.node_at(node_idx).color
    }

    /// Recolors a node. The sentinel stays black.
    #[inline]
    const fn set_color(&mut self, node_idx: usize, color: Color) {
        if node_idx != NIL {
            self.node_at_mut(node_idx).color = color;
        }
    }

    #[inline]
    fn is_red(&self, node_idx: usize) -> bool {
        self.get_color(node_idx) == Color::Red
    }

    #[inline]
    fn is_black(&self, node_idx: usize) -> bool {
        self.get_color(node_idx) == Color::Black
    }

    #[inline]
    const fn get_parent(&self, node: usize) -> usize {
        self.node_at(node).parent
    }

    #[inline]
    const fn get_child(&self, node: usize, side: Side) -> usize {
        self.node_at(node).child(side)
    }

    /// Which child of its parent `node` is. `node` must not be the root.
    #[inline]
    const fn side_of(&self, node: usize) -> Side {
        if self.node_at(self.get_parent(node)).left == node {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Rotates `pivot` above its parent.
    ///
    /// A `Side::Left` rotation promotes a right child and a `Side::Right`
    /// rotation promotes a left child. The demoted parent becomes `pivot`'s
    /// `dir` child and adopts `pivot`'s former `dir` subtree. Colors and keys
    /// are untouched.
    const fn rotate(&mut self, pivot: usize, dir: Side) {
        let parent = self.get_parent(pivot);
        debug_assert!(parent != NIL, "rotation pivot has no parent");
        debug_assert!(
            self.get_child(parent, dir.opposite()) == pivot,
            "rotation direction does not match the pivot's side"
        );

        let grandparent = self.get_parent(parent);
        let inner = self.get_child(pivot, dir);

        self.node_at_mut(parent).set_child(dir.opposite(), inner);
        if inner != NIL {
            self.node_at_mut(inner).parent = parent;
        }

        self.node_at_mut(pivot).parent = grandparent;
        if grandparent == NIL {
            self.root = pivot;
        } else if self.node_at(grandparent).left == parent {
            self.node_at_mut(grandparent).left = pivot;
        } else {
            self.node_at_mut(grandparent).right = pivot;
        }

        self.node_at_mut(pivot).set_child(dir, parent);
        self.node_at_mut(parent).parent = pivot;
    }

    /// Puts `new_node` where `old_node` hangs from its parent.
    ///
    /// `new_node` may be the sentinel, whose parent is then set so deletion
    /// fix-up can climb from it.
    const fn transplant(&mut self, old_node: usize, new_node: usize) {
        let parent = self.get_parent(old_node);

        if parent == NIL {
            self.root = new_node;
        } else if old_node == self.node_at(parent).left {
            self.node_at_mut(parent).left = new_node;
        } else {
            self.node_at_mut(parent).right = new_node;
        }

        self.node_at_mut(new_node).parent = parent;
    }
}
