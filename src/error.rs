use alloc::collections::TryReserveError;

use crate::Key;

/// Result alias for fallible tree operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors returned by tree operations.
///
/// Every failing operation leaves the tree exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The node arena could not be reserved when the tree was constructed.
    #[error("failed to reserve the node arena: {0}")]
    Allocation(TryReserveError),

    /// Every slot of the arena is in use.
    #[error("node arena exhausted: all {capacity} slots are in use")]
    CapacityExhausted {
        /// Number of slots the tree was built with.
        capacity: usize,
    },

    /// The handle does not name a live node of this tree.
    ///
    /// Raised for handles whose node was already erased, handles issued by a
    /// different tree, and handles left over from before a [`clear`].
    ///
    /// [`clear`]: crate::RbTree::clear
    #[error("handle does not refer to a live node of this tree")]
    InvalidHandle,
}

/// A broken red-black or binary-search-tree invariant found by
/// [`RbTree::validate`](crate::RbTree::validate).
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum InvariantViolation {
    /// The sentinel slot is not black.
    #[error("sentinel is not black")]
    SentinelNotBlack,

    /// The sentinel's children no longer point back at the sentinel.
    #[error("sentinel child links do not point at the sentinel")]
    SentinelLinksCorrupted,

    /// The root of a non-empty tree is red.
    #[error("root {key} is red")]
    RootNotBlack {
        /// Key stored at the root.
        key: Key,
    },

    /// The root's parent link is not the sentinel.
    #[error("root {key} has a parent")]
    RootHasParent {
        /// Key stored at the root.
        key: Key,
    },

    /// A child's parent link does not name the node that links to it.
    #[error("node {key} does not point back at its parent {parent}")]
    BrokenParentLink {
        /// Key of the child with the wrong back-reference.
        key: Key,
        /// Key of the node that actually links to the child.
        parent: Key,
    },

    /// A red node has a red child.
    #[error("red node {key} has a red child {child}")]
    RedRed {
        /// Key of the red parent.
        key: Key,
        /// Key of its red child.
        child: Key,
    },

    /// The two subtrees of a node have different black-heights.
    #[error("black-height mismatch under {key}: left {left}, right {right}")]
    BlackHeightMismatch {
        /// Key of the unbalanced node.
        key: Key,
        /// Black-height of the left subtree.
        left: usize,
        /// Black-height of the right subtree.
        right: usize,
    },

    /// An arena slot is reachable along more than one path.
    #[error("slot {index} is reachable more than once")]
    NodeReachedTwice {
        /// Arena index of the shared slot.
        index: usize,
    },

    /// The number of reachable nodes differs from the recorded length.
    #[error("tree records {expected} nodes but {found} are reachable")]
    LengthMismatch {
        /// Recorded length.
        expected: usize,
        /// Nodes actually reachable from the root.
        found: usize,
    },

    /// The in-order key sequence decreases.
    #[error("in-order sequence decreases from {prev} to {next}")]
    OrderViolation {
        /// Earlier key in the in-order walk.
        prev: Key,
        /// Following, smaller key.
        next: Key,
    },

    /// The tree is taller than 2·log2(n + 1).
    #[error("height {height} exceeds the red-black bound {bound:.2}")]
    HeightBoundExceeded {
        /// Measured height in nodes.
        height: usize,
        /// Maximum height allowed for the current length.
        bound: f64,
    },
}
