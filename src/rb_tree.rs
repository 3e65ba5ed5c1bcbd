//! An ordered multiset based on a red-black tree.

use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;

use smallvec::SmallVec;

use crate::raw::{Handle, RawRbTree};

pub use crate::raw::InvariantViolation;

/// An ordered multiset based on a [red-black tree].
///
/// Given a key type with a [total order], the tree stores its keys in sorted
/// order with O(log n) worst-case insertion, deletion, and exact-key search.
/// Keys must implement the [`Ord`] trait.
///
/// Equal keys are permitted: inserting a duplicate always succeeds and the
/// new entry is placed to the right of the existing one, so removal takes
/// out one occurrence at a time and in-order traversal yields a
/// non-decreasing sequence.
///
/// It is a logic error for a key to be modified in such a way that its
/// ordering relative to any other key changes while it is in the tree. The
/// behavior resulting from such a logic error is not specified but will not
/// result in undefined behavior; it could include panics or incorrect
/// results.
///
/// # Examples
///
/// ```
/// use scarlet_tree::RbTree;
///
/// let mut ranks = RbTree::new();
///
/// ranks.insert("gold");
/// ranks.insert("silver");
/// ranks.insert("bronze");
///
/// assert_eq!(ranks.len(), 3);
/// assert!(ranks.contains("silver"));
///
/// // Keys come back in sorted order.
/// let sorted: Vec<_> = ranks.iter().copied().collect();
/// assert_eq!(sorted, ["bronze", "gold", "silver"]);
///
/// ranks.remove("gold");
/// assert!(!ranks.contains("gold"));
/// ```
///
/// [red-black tree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
/// [total order]: https://en.wikipedia.org/wiki/Total_order
#[derive(Clone)]
pub struct RbTree<K> {
    raw: RawRbTree<K>,
}

/// An opaque reference to a node inside an [`RbTree`].
///
/// Obtained from [`RbTree::insert`] or [`RbTree::find`] and consumed by
/// [`RbTree::key_at`] and [`RbTree::remove_at`].
///
/// A `NodeRef` is valid only until the next mutating operation on the tree:
/// a deletion may swap the referenced node's key with its in-order successor
/// or release the node's slot entirely. Using a stale reference is a
/// contract violation — it panics or observes a different key, it never
/// touches freed memory.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NodeRef(Handle);

impl<K> RbTree<K> {
    /// Creates an empty tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use scarlet_tree::RbTree;
    ///
    /// let tree: RbTree<i32> = RbTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self { raw: RawRbTree::new() }
    }

    /// Creates an empty tree with space preallocated for `capacity` keys.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: RawRbTree::with_capacity(capacity),
        }
    }

    /// Returns the number of node slots the tree can hold without
    /// reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the number of keys in the tree, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use scarlet_tree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// assert!(tree.is_empty());
    /// tree.insert(1);
    /// assert!(!tree.is_empty());
    /// ```
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Removes all keys.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Gets an in-order iterator over the keys, smallest first.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(&self.raw)
    }
}

impl<K: Ord> RbTree<K> {
    /// Inserts a key, returning a reference to the new node.
    ///
    /// Insertion always succeeds: an equal key descends to the right of the
    /// existing occurrence.
    ///
    /// # Examples
    ///
    /// ```
    /// use scarlet_tree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// tree.insert(37);
    /// tree.insert(37);
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn insert(&mut self, key: K) -> NodeRef {
        NodeRef(self.raw.insert(key))
    }

    /// Removes one occurrence of a key, returning it if it was present.
    ///
    /// Removing a missing key is a no-op, not an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use scarlet_tree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// tree.insert(1);
    /// assert_eq!(tree.remove(&1), Some(1));
    /// assert_eq!(tree.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }

    /// Removes the referenced node, returning its key.
    ///
    /// # Panics
    ///
    /// Panics if `node` is stale (see [`NodeRef`]).
    pub fn remove_at(&mut self, node: NodeRef) -> K {
        self.raw.remove_at(node.0)
    }

    /// Returns a reference to the stored key equal to `key`, if any.
    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).map(|handle| self.raw.key(handle))
    }

    /// Returns `true` if the tree contains a key equal to `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scarlet_tree::RbTree;
    ///
    /// let tree: RbTree<i32> = [3, 1, 2].into_iter().collect();
    /// assert!(tree.contains(&2));
    /// assert!(!tree.contains(&4));
    /// ```
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }

    /// Finds a node holding a key equal to `key`.
    ///
    /// With duplicates present, which occurrence is found is unspecified.
    pub fn find<Q>(&self, key: &Q) -> Option<NodeRef>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).map(NodeRef)
    }

    /// Returns the key held by the referenced node.
    ///
    /// # Panics
    ///
    /// Panics if `node` is stale (see [`NodeRef`]).
    #[must_use]
    pub fn key_at(&self, node: NodeRef) -> &K {
        self.raw.key(node.0)
    }

    /// Returns the smallest key, if any.
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.raw.root().map(|root| self.raw.key(self.raw.minimum(root)))
    }

    /// Returns the largest key, if any.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.raw.root().map(|root| self.raw.key(self.raw.maximum(root)))
    }

    /// Walks the tree depth-first with three visitation points per node:
    /// before its left subtree, between the subtrees, and after its right
    /// subtree. A visitor returning `false` abandons the remainder of that
    /// node's subtree walk; the rest of the traversal continues.
    ///
    /// The walk uses an explicit stack, never call-stack recursion.
    ///
    /// # Examples
    ///
    /// ```
    /// use scarlet_tree::RbTree;
    ///
    /// let tree: RbTree<i32> = [2, 1, 3].into_iter().collect();
    /// let mut in_order = Vec::new();
    /// tree.traverse(
    ///     |_| true,
    ///     |key| {
    ///         in_order.push(*key);
    ///         true
    ///     },
    ///     |_| true,
    /// );
    /// assert_eq!(in_order, [1, 2, 3]);
    /// ```
    pub fn traverse<P, I, O>(&self, pre: P, inorder: I, post: O)
    where
        P: FnMut(&K) -> bool,
        I: FnMut(&K) -> bool,
        O: FnMut(&K) -> bool,
    {
        self.raw.traverse(pre, inorder, post);
    }

    /// Count of BLACK nodes on a root-to-nil path, the absent terminator
    /// included; −1 for the empty tree by convention.
    ///
    /// # Examples
    ///
    /// ```
    /// use scarlet_tree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// assert_eq!(tree.black_height(), -1);
    /// tree.insert(10);
    /// tree.insert(20);
    /// tree.insert(30);
    /// assert_eq!(tree.black_height(), 2);
    /// ```
    #[must_use]
    pub fn black_height(&self) -> i32 {
        self.raw.black_height()
    }

    /// Number of nodes on the longest root-to-leaf path; 0 for the empty
    /// tree. Never exceeds 2·log₂(len + 1).
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Checks the red-black structural invariants, stopping at the first
    /// violation.
    ///
    /// This is a diagnostic for tests and debugging: a well-behaved tree
    /// can never fail it, and validation never repairs anything.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] encountered.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.raw.validate()
    }
}

impl<K> Default for RbTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for RbTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Ord> FromIterator<K> for RbTree<K> {
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for RbTree<K> {
    fn extend<T: IntoIterator<Item = K>>(&mut self, iter: T) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord, const N: usize> From<[K; N]> for RbTree<K> {
    fn from(keys: [K; N]) -> Self {
        keys.into_iter().collect()
    }
}

impl<'a, K> IntoIterator for &'a RbTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

impl<K: PartialEq> PartialEq for RbTree<K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq> Eq for RbTree<K> {}

/// An in-order iterator over the keys of an [`RbTree`].
///
/// Created by [`RbTree::iter`]. Keys are yielded smallest first; duplicates
/// appear as often as they were inserted.
pub struct Iter<'a, K> {
    raw: &'a RawRbTree<K>,
    /// Handles whose key is still pending, deepest unvisited ancestor last.
    stack: SmallVec<[Handle; 64]>,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    fn new(raw: &'a RawRbTree<K>) -> Self {
        let mut iter = Self {
            raw,
            stack: SmallVec::new(),
            remaining: raw.len(),
        };
        iter.descend_left(raw.root());
        iter
    }

    fn descend_left(&mut self, from: Option<Handle>) {
        let mut current = from;
        while let Some(handle) = current {
            self.stack.push(handle);
            current = self.raw.node(handle).left;
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let handle = self.stack.pop()?;
        let node = self.raw.node(handle);
        self.descend_left(node.right);
        self.remaining -= 1;
        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}
impl<K> FusedIterator for Iter<'_, K> {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use pretty_assertions::{assert_eq, assert_ne};

    #[test]
    fn iter_yields_sorted_keys_with_duplicates() {
        let tree: RbTree<i32> = [5, 1, 5, 3, 1].into();
        let keys: Vec<i32> = tree.iter().copied().collect();
        assert_eq!(keys, [1, 1, 3, 5, 5]);
        assert_eq!(tree.iter().len(), 5);
    }

    #[test]
    fn first_and_last_track_the_extremes() {
        let mut tree = RbTree::new();
        assert_eq!(tree.first(), None);
        assert_eq!(tree.last(), None);
        tree.extend([8, 3, 12, 5]);
        assert_eq!(tree.first(), Some(&3));
        assert_eq!(tree.last(), Some(&12));
    }

    #[test]
    fn node_refs_round_trip_through_find() {
        let mut tree: RbTree<i32> = [4, 2, 6].into();
        let node = tree.find(&6).expect("present");
        assert_eq!(*tree.key_at(node), 6);
        assert_eq!(tree.remove_at(node), 6);
        assert!(!tree.contains(&6));
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let a: RbTree<i32> = [1, 2, 3].into();
        let b: RbTree<i32> = [3, 1, 2].into();
        let c: RbTree<i32> = [1, 2].into();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn clone_is_deep_and_independent() {
        let mut a: RbTree<i32> = [1, 2, 3].into();
        let b = a.clone();
        a.remove(&2);
        assert!(!a.contains(&2));
        assert!(b.contains(&2));
        assert!(b.validate().is_ok());
    }
}
