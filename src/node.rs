/// Key type stored in the tree.
pub type Key = i32;

/// Arena index of the sentinel.
///
/// Slot 0 is reserved at construction and stands in for every absent child
/// and absent parent, so structural code compares against `NIL` instead of
/// branching on `Option`.
pub(crate) const NIL: usize = 0;

/// Red-Black tree node colors used to maintain tree balance properties.
///
/// Red-Black trees maintain balance by ensuring:
/// - Red nodes have black children
/// - All paths from a node to the sentinel have equal black node counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    /// Red node - cannot be adjacent to other red nodes
    Red,
    /// Black node - contributes to black height
    Black,
}

/// Which child link of a node is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A slot of the node arena.
///
/// Occupied slots hold a tree node; released slots keep their last contents
/// until reused and are recognised by their bumped `generation`.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    /// The stored key
    pub(crate) key: Key,

    /// Index of parent node (NIL if this is root)
    pub(crate) parent: usize,

    /// Index of left child node (NIL if no left child)
    pub(crate) left: usize,

    /// Index of right child node (NIL if no right child)
    pub(crate) right: usize,

    /// Color of this node (Red or Black) used for Red-Black tree balancing
    pub(crate) color: Color,

    /// Bumped every time the slot is released, invalidating old handles
    pub(crate) generation: u32,
}

impl Node {
    /// The sentinel: black, with both children pointing at itself.
    pub(crate) const fn sentinel() -> Self {
        Self {
            key: 0,
            parent: NIL,
            left: NIL,
            right: NIL,
            color: Color::Black,
            generation: 0,
        }
    }

    /// A free slot that has never held a node.
    pub(crate) const fn vacant() -> Self {
        Self::sentinel()
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) const fn set_child(&mut self, side: Side, child: usize) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}

/// Opaque reference to a node of one particular [`RbTree`](crate::RbTree).
///
/// Handles are returned by [`insert`](crate::RbTree::insert),
/// [`find`](crate::RbTree::find), [`min`](crate::RbTree::min) and friends.
/// A handle stays valid until its node is erased or the tree is cleared; after
/// that every operation taking it treats it as absent, even if the slot has
/// since been reused for another key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    pub(crate) tree: u32,
    pub(crate) index: usize,
    pub(crate) generation: u32,
}
