use ahash::RandomState;
use hashbrown::HashSet;

use super::RbTree;
use crate::{
    InvariantViolation,
    helper::{height_bound, within_height_bound},
    node::{Color, NIL},
};

type Visited = HashSet<usize, RandomState>;

impl RbTree {
    /// Checks every structural invariant of the tree.
    ///
    /// Verifies that the sentinel is black and self-linked, the root is black
    /// with no parent, every child points back at its parent, no red node has
    /// a red child, every path to the sentinel crosses the same number of black
    /// nodes, no slot is reachable twice, the reachable node count matches
    /// [`len`](Self::len), keys are non-decreasing in order, and the height is
    /// within `2·log2(n + 1)`.
    ///
    /// Every mutation runs this under `debug_assert!`.
    ///
    /// # Returns
    ///
    /// * `Result<usize, InvariantViolation>` - The number of black nodes on
    ///   every path from the root down to the sentinel, both ends included
    ///   (`1` for an empty tree), or the first violation found
    pub fn validate(&self) -> Result<usize, InvariantViolation> {
        let sentinel = self.node_at(NIL);
        if sentinel.color != Color::Black {
            return Err(InvariantViolation::SentinelNotBlack);
        }
        if sentinel.left != NIL || sentinel.right != NIL {
            return Err(InvariantViolation::SentinelLinksCorrupted);
        }

        if self.root != NIL {
            let root = self.node_at(self.root);
            if root.color != Color::Black {
                return Err(InvariantViolation::RootNotBlack { key: root.key });
            }
            if root.parent != NIL {
                return Err(InvariantViolation::RootHasParent { key: root.key });
            }
        }

        let mut visited = Visited::with_capacity_and_hasher(self.len, RandomState::default());
        let black_height = self.verify_black_height(self.root, &mut visited)?;

        if visited.len() != self.len {
            return Err(InvariantViolation::LengthMismatch {
                expected: self.len,
                found: visited.len(),
            });
        }

        self.verify_order()?;

        let height = self.height();
        if !within_height_bound(height, self.len) {
            return Err(InvariantViolation::HeightBoundExceeded {
                height,
                bound: height_bound(self.len),
            });
        }

        Ok(black_height)
    }

    fn verify_black_height(
        &self,
        node: usize,
        visited: &mut Visited,
    ) -> Result<usize, InvariantViolation> {
        if node == NIL {
            return Ok(1);
        }
        if !visited.insert(node) {
            return Err(InvariantViolation::NodeReachedTwice { index: node });
        }

        let node_ref = self.node_at(node);

        for child in [node_ref.left, node_ref.right] {
            if child == NIL {
                continue;
            }
            let child_ref = self.node_at(child);
            if child_ref.parent != node {
                return Err(InvariantViolation::BrokenParentLink {
                    key: child_ref.key,
                    parent: node_ref.key,
                });
            }
            if node_ref.color == Color::Red && child_ref.color == Color::Red {
                return Err(InvariantViolation::RedRed {
                    key: node_ref.key,
                    child: child_ref.key,
                });
            }
        }

        let left_height = self.verify_black_height(node_ref.left, visited)?;
        let right_height = self.verify_black_height(node_ref.right, visited)?;

        if left_height != right_height {
            return Err(InvariantViolation::BlackHeightMismatch {
                key: node_ref.key,
                left: left_height,
                right: right_height,
            });
        }

        if node_ref.color == Color::Black {
            Ok(left_height + 1)
        } else {
            Ok(left_height)
        }
    }

    fn verify_order(&self) -> Result<(), InvariantViolation> {
        let mut keys = self.iter();
        let Some(mut prev) = keys.next() else {
            return Ok(());
        };
        for next in keys {
            if next < prev {
                return Err(InvariantViolation::OrderViolation { prev, next });
            }
            prev = next;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Key;

    fn tree_with(keys: &[Key]) -> RbTree {
        let mut tree = RbTree::new(keys.len().max(1)).unwrap();
        for &key in keys {
            tree.insert(key).unwrap();
        }
        tree
    }

    fn idx(tree: &RbTree, key: Key) -> usize {
        tree.find_node(key).unwrap()
    }

    #[test]
    fn test_valid_trees_report_black_height() {
        assert_eq!(RbTree::new(1).unwrap().validate(), Ok(1));
        assert_eq!(tree_with(&[1]).validate(), Ok(2));
        assert_eq!(tree_with(&[10, 20, 30]).validate(), Ok(2));
        assert_eq!(tree_with(&[20, 10, 30, 5]).validate(), Ok(3));
    }

    #[test]
    fn test_detects_red_root() {
        let mut tree = tree_with(&[1]);
        tree.node_at_mut(tree.root).color = Color::Red;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::RootNotBlack { key: 1 })
        );
    }

    #[test]
    fn test_detects_red_red() {
        let mut tree = tree_with(&[20, 10, 30, 5]);
        let ten = idx(&tree, 10);
        tree.node_at_mut(ten).color = Color::Red;
        let thirty = idx(&tree, 30);
        tree.node_at_mut(thirty).color = Color::Red;

        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::RedRed { key: 10, child: 5 })
        );
    }

    #[test]
    fn test_detects_black_height_mismatch() {
        let mut tree = tree_with(&[10, 20, 30]);
        let thirty = idx(&tree, 30);
        tree.node_at_mut(thirty).color = Color::Black;

        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::BlackHeightMismatch {
                key: 20,
                left: 1,
                right: 2
            })
        );
    }

    #[test]
    fn test_detects_broken_parent_link() {
        let mut tree = tree_with(&[10, 20, 30]);
        let ten = idx(&tree, 10);
        let thirty = idx(&tree, 30);
        tree.node_at_mut(ten).parent = thirty;

        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::BrokenParentLink { key: 10, parent: 20 })
        );
    }

    #[test]
    fn test_detects_shared_subtree() {
        let mut tree = tree_with(&[10, 20, 30]);
        let twenty = idx(&tree, 20);
        let ten = idx(&tree, 10);
        tree.node_at_mut(twenty).right = ten;

        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::NodeReachedTwice { index: ten })
        );
    }

    #[test]
    fn test_detects_sentinel_corruption() {
        let mut tree = tree_with(&[1]);
        tree.node_at_mut(NIL).color = Color::Red;
        assert_eq!(tree.validate(), Err(InvariantViolation::SentinelNotBlack));

        tree.node_at_mut(NIL).color = Color::Black;
        tree.node_at_mut(NIL).left = tree.root;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::SentinelLinksCorrupted)
        );
    }

    #[test]
    fn test_detects_length_mismatch() {
        let mut tree = tree_with(&[10, 20, 30]);
        tree.len = 4;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::LengthMismatch {
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn test_detects_order_violation() {
        let mut tree = tree_with(&[10, 20, 30]);
        let ten = idx(&tree, 10);
        tree.node_at_mut(ten).key = 25;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::OrderViolation { prev: 25, next: 20 })
        );
    }

    #[test]
    fn test_detects_root_with_parent() {
        let mut tree = tree_with(&[10, 20, 30]);
        let root = tree.root;
        let ten = idx(&tree, 10);
        tree.node_at_mut(root).parent = ten;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::RootHasParent { key: 20 })
        );
    }
}
