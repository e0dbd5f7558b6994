use num_traits::Float;

/// Returns the maximum height a red-black tree with `len` nodes may reach
///
/// A red-black tree with `n` internal nodes has height at most `2·log2(n + 1)`.
///
/// # Arguments
///
/// * `len` - The number of nodes in the tree
///
/// # Returns
///
/// * `f64` - The height bound, `0.0` for an empty tree
#[inline]
pub fn height_bound(len: usize) -> f64 {
    2.0 * Float::log2(len as f64 + 1.0)
}

/// Returns `true` if a tree of the given `height` holding `len` nodes is within
/// the red-black height bound
///
/// # Arguments
///
/// * `height` - Longest root-to-leaf path, counted in nodes
/// * `len` - The number of nodes in the tree
///
/// # Returns
///
/// * `bool` - Whether `height <= 2·log2(len + 1)`
#[inline]
pub fn within_height_bound(height: usize, len: usize) -> bool {
    height as f64 <= height_bound(len)
}
