use core::borrow::Borrow;
use core::cmp::Ordering;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Branch, Color, Node};

/// The core red-black tree backing `RbTree`.
///
/// All nodes live in the arena; the tree itself is just the root handle.
/// Every mutation below restores the red-black invariants
/// before returning, so `validate` must pass between any two public
/// operations.
#[derive(Clone)]
pub(crate) struct RawRbTree<K> {
    /// Arena storing all tree nodes; its live-slot count is the key count.
    nodes: Arena<Node<K>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
}

/// A structural invariant failure reported by [`RawRbTree::validate`].
///
/// Validation is a diagnostic, not a repair mechanism: the first failure is
/// returned and the walk stops. "Every node is red or black" needs no
/// checking here; the color enum cannot express anything else.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InvariantViolation {
    /// The root node is red.
    RootNotBlack,
    /// A red node has a red child.
    RedRedViolation,
    /// Two sibling subtrees disagree on black-height.
    BlackHeightMismatch,
    /// A key is on the wrong side of an ancestor.
    OrderViolation,
    /// A parent back-reference does not match the owning child link.
    ParentLinkBroken,
}

impl core::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let message = match self {
            InvariantViolation::RootNotBlack => "root is not black",
            InvariantViolation::RedRedViolation => "red node has a red child",
            InvariantViolation::BlackHeightMismatch => "sibling subtrees disagree on black-height",
            InvariantViolation::OrderViolation => "key is on the wrong side of an ancestor",
            InvariantViolation::ParentLinkBroken => "parent back-reference does not match the owning child link",
        };
        f.write_str(message)
    }
}

/// Stage of a node's depth-first visit on the explicit traversal stack.
#[derive(Clone, Copy)]
enum Stage {
    Pre,
    In,
    Post,
}

/// Explicit depth-first stack. The inline capacity covers the height bound
/// of any tree that fits a few hundred million keys.
type WalkStack<T> = SmallVec<[T; 64]>;

impl<K> RawRbTree<K> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    #[inline]
    fn node_mut(&mut self, handle: Handle) -> &mut Node<K> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    pub(crate) fn key(&self, handle: Handle) -> &K {
        &self.node(handle).key
    }

    #[inline]
    fn color(&self, handle: Handle) -> Color {
        self.node(handle).color
    }

    /// Color of a possibly absent node; absent counts as BLACK.
    #[inline]
    fn color_of(&self, link: Option<Handle>) -> Color {
        Color::of(link, &self.nodes)
    }

    #[inline]
    fn set_color(&mut self, handle: Handle, color: Color) {
        self.node_mut(handle).color = color;
    }

    // ─── Navigation primitives ───────────────────────────────────────────

    /// Which child slot of `parent` holds `link`. With `link == None` this
    /// resolves the position a spliced-out child left behind; the ambiguity
    /// of two absent children cannot arise, because the other slot then
    /// holds the sibling a black deficit requires.
    fn slot_of(&self, parent: Handle, link: Option<Handle>) -> Branch {
        if self.node(parent).left == link { Branch::Left } else { Branch::Right }
    }

    /// Which child slot a non-root node occupies in its parent. Derived
    /// from the parent's links, never stored.
    pub(crate) fn branch_of(&self, handle: Handle) -> Branch {
        let parent = self.node(handle).parent.expect("`branch_of()` - the root occupies no branch!");
        self.slot_of(parent, Some(handle))
    }

    /// The other child of `handle`'s parent, absent for the root.
    pub(crate) fn sibling_of(&self, handle: Handle) -> Option<Handle> {
        let parent = self.node(handle).parent?;
        self.node(parent).child(self.branch_of(handle).opposite())
    }

    /// Leftmost node of the subtree rooted at `from`.
    pub(crate) fn minimum(&self, from: Handle) -> Handle {
        let mut current = from;
        while let Some(left) = self.node(current).left {
            current = left;
        }
        current
    }

    /// Rightmost node of the subtree rooted at `from`.
    pub(crate) fn maximum(&self, from: Handle) -> Handle {
        let mut current = from;
        while let Some(right) = self.node(current).right {
            current = right;
        }
        current
    }

    /// Exact-key search from the root. O(height).
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            current = match key.cmp(node.key.borrow()) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }

    // ─── Rotation ────────────────────────────────────────────────────────

    /// Rotates `handle` in `direction`, lifting the child on the opposite
    /// side into its place. Pure link surgery: colors are untouched, the
    /// in-order sequence is preserved, and no invariant is restored by the
    /// rotation itself — it is the primitive the fixups compose.
    ///
    /// # Panics
    ///
    /// Panics if the pivot child is absent. That is a broken caller
    /// contract, not a recoverable state.
    fn rotate(&mut self, handle: Handle, direction: Branch) {
        let pivot = self
            .node(handle)
            .child(direction.opposite())
            .expect("`rotate()` - rotating into an absent pivot!");
        let parent = self.node(handle).parent;
        let slot = parent.map(|p| self.slot_of(p, Some(handle)));

        // The pivot's inner subtree crosses over to `handle`.
        let transplant = self.node(pivot).child(direction);
        self.node_mut(handle).set_child(direction.opposite(), transplant);
        if let Some(child) = transplant {
            self.node_mut(child).parent = Some(handle);
        }

        // The pivot takes over `handle`'s position under the parent.
        self.node_mut(pivot).set_child(direction, Some(handle));
        self.node_mut(pivot).parent = parent;
        self.node_mut(handle).parent = Some(pivot);
        match (parent, slot) {
            (Some(p), Some(slot)) => self.node_mut(p).set_child(slot, Some(pivot)),
            _ => self.root = Some(pivot),
        }
    }

    // ─── Insertion ───────────────────────────────────────────────────────

    /// Inserts `key`, keeping duplicates: an equal key always descends
    /// right of the existing one. Returns the handle of the new node.
    pub(crate) fn insert(&mut self, key: K) -> Handle
    where
        K: Ord,
    {
        let Some(root) = self.root else {
            let handle = self.nodes.alloc(Node::new_leaf(key, None));
            self.root = Some(handle);
            return handle;
        };

        let mut current = root;
        let branch = loop {
            // Ties go right: only strictly smaller keys descend left.
            let branch = if key < self.node(current).key { Branch::Left } else { Branch::Right };
            match self.node(current).child(branch) {
                Some(child) => current = child,
                None => break branch,
            }
        };

        let handle = self.nodes.alloc(Node::new_leaf(key, Some(current)));
        self.node_mut(current).set_child(branch, Some(handle));
        self.insert_fixup(handle);
        handle
    }

    /// Restores invariants after attaching a red leaf. The loop walks up
    /// only while the parent is red; a red parent is never the root, so the
    /// grandparent always exists inside the loop.
    fn insert_fixup(&mut self, mut handle: Handle) {
        loop {
            let Some(parent) = self.node(handle).parent else { break };
            if self.color(parent) == Color::Black {
                break;
            }
            let grand = self.node(parent).parent.expect("`insert_fixup()` - red node at the root!");
            let parent_branch = self.branch_of(parent);
            let uncle = self.sibling_of(parent);

            if self.color_of(uncle) == Color::Red {
                // Red uncle: recolor and move the violation two levels up.
                self.set_color(parent, Color::Black);
                self.set_color(uncle.expect("red implies present"), Color::Black);
                self.set_color(grand, Color::Red);
                handle = grand;
                continue;
            }

            // Black uncle: line the pair up if the new node is an inner
            // grandchild, then rotate it above the grandparent.
            let mut top = parent;
            if self.branch_of(handle) != parent_branch {
                self.rotate(parent, parent_branch);
                top = handle;
            }
            self.rotate(grand, parent_branch.opposite());
            self.set_color(top, Color::Black);
            self.set_color(grand, Color::Red);
            break;
        }

        // The red-uncle case can bubble red all the way up.
        let root = self.root.expect("`insert_fixup()` - tree cannot be empty here!");
        self.set_color(root, Color::Black);
    }

    // ─── Deletion ────────────────────────────────────────────────────────

    /// Removes one occurrence of `key`, if present.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.remove_at(handle))
    }

    /// Removes the node at `handle` and returns its key.
    ///
    /// A node with two children never leaves the tree directly: its key is
    /// swapped with the in-order successor's, and the successor — which has
    /// no left child by construction — is spliced out instead.
    pub(crate) fn remove_at(&mut self, handle: Handle) -> K {
        let target = match (self.node(handle).left, self.node(handle).right) {
            (Some(_), Some(right)) => {
                let successor = self.minimum(right);
                let (a, b) = self.nodes.get2_mut(handle, successor);
                core::mem::swap(&mut a.key, &mut b.key);
                successor
            }
            _ => handle,
        };

        // `target` has at most one real child; splice it out.
        let replacement = self.node(target).left.or(self.node(target).right);
        let parent = self.node(target).parent;
        let removed_color = self.node(target).color;

        match parent {
            None => self.root = replacement,
            Some(p) => {
                let slot = self.slot_of(p, Some(target));
                self.node_mut(p).set_child(slot, replacement);
            }
        }
        if let Some(child) = replacement {
            self.node_mut(child).parent = parent;
        }

        // Splicing out a BLACK node shortens every path through it; the
        // fixup runs on the vacated position before the slot is released.
        if removed_color == Color::Black {
            self.delete_fixup(replacement, parent);
        }
        self.nodes.take(target).key
    }

    /// Restores invariants after a BLACK node left a position. `node` may
    /// be absent — the double black can sit on a nil position — in which
    /// case `parent` alone anchors it; no placeholder node is ever created.
    fn delete_fixup(&mut self, mut node: Option<Handle>, mut parent: Option<Handle>) {
        while self.color_of(node) == Color::Black && node != self.root {
            let Some(p) = parent else { break };
            let branch = self.slot_of(p, node);
            let sibling = self
                .node(p)
                .child(branch.opposite())
                .expect("`delete_fixup()` - a double-black node always has a sibling!");

            if self.color(sibling) == Color::Red {
                // Red sibling: rotate it above the parent, exposing a black
                // sibling for the next round of this iteration's cases.
                self.set_color(sibling, Color::Black);
                self.set_color(p, Color::Red);
                self.rotate(p, branch);
                continue;
            }

            let near = self.node(sibling).child(branch);
            let far = self.node(sibling).child(branch.opposite());

            if self.color_of(near) == Color::Black && self.color_of(far) == Color::Black {
                // Both nephews black: recolor and push the deficit up.
                self.set_color(sibling, Color::Red);
                node = Some(p);
                parent = self.node(p).parent;
            } else if self.color_of(far) == Color::Black {
                // Near nephew red, far black: fold the sibling inward so
                // the far nephew turns red.
                self.set_color(near.expect("red implies present"), Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, branch.opposite());
            } else {
                // Far nephew red: one rotation settles the black debt.
                let parent_color = self.color(p);
                self.set_color(sibling, parent_color);
                self.set_color(p, Color::Black);
                self.set_color(far.expect("red implies present"), Color::Black);
                self.rotate(p, branch);
                node = self.root;
                parent = None;
            }
        }

        if let Some(handle) = node {
            self.set_color(handle, Color::Black);
        }
    }

    // ─── Traversal & diagnostics ─────────────────────────────────────────

    /// Depth-first walk with three visitation points per node. A visitor
    /// returning `false` abandons the remainder of that node's subtree walk
    /// without disturbing the rest of the traversal.
    pub(crate) fn traverse<P, I, O>(&self, mut pre: P, mut inorder: I, mut post: O)
    where
        P: FnMut(&K) -> bool,
        I: FnMut(&K) -> bool,
        O: FnMut(&K) -> bool,
    {
        let mut stack: WalkStack<(Handle, Stage)> = SmallVec::new();
        if let Some(root) = self.root {
            stack.push((root, Stage::Pre));
        }
        while let Some((handle, stage)) = stack.pop() {
            let node = self.node(handle);
            match stage {
                Stage::Pre => {
                    if !pre(&node.key) {
                        continue;
                    }
                    stack.push((handle, Stage::In));
                    if let Some(left) = node.left {
                        stack.push((left, Stage::Pre));
                    }
                }
                Stage::In => {
                    if !inorder(&node.key) {
                        continue;
                    }
                    stack.push((handle, Stage::Post));
                    if let Some(right) = node.right {
                        stack.push((right, Stage::Pre));
                    }
                }
                Stage::Post => {
                    // Nothing of this node's walk remains either way.
                    let _ = post(&node.key);
                }
            }
        }
    }

    /// Count of BLACK nodes on a root-to-nil path, the absent terminator
    /// included (invariant 5 makes any path equivalent; this one follows
    /// the left spine). −1 for the empty tree by convention.
    pub(crate) fn black_height(&self) -> i32 {
        if self.root.is_none() {
            return -1;
        }
        // The absent terminator counts as BLACK.
        let mut height = 1;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            if node.color == Color::Black {
                height += 1;
            }
            current = node.left;
        }
        height
    }

    /// Number of nodes on the longest root-to-leaf path; 0 for the empty
    /// tree. Bounded by 2·log₂(len + 1) while the invariants hold.
    pub(crate) fn height(&self) -> usize {
        let mut tallest = 0;
        let mut stack: WalkStack<(Handle, usize)> = SmallVec::new();
        if let Some(root) = self.root {
            stack.push((root, 1));
        }
        while let Some((handle, depth)) = stack.pop() {
            tallest = tallest.max(depth);
            let node = self.node(handle);
            if let Some(left) = node.left {
                stack.push((left, depth + 1));
            }
            if let Some(right) = node.right {
                stack.push((right, depth + 1));
            }
        }
        tallest
    }

    // ─── Validation ──────────────────────────────────────────────────────

    /// Checks the structural invariants, stopping at the first violation.
    pub(crate) fn validate(&self) -> Result<(), InvariantViolation>
    where
        K: Ord,
    {
        let Some(root) = self.root else { return Ok(()) };
        if self.node(root).parent.is_some() {
            return Err(InvariantViolation::ParentLinkBroken);
        }
        if self.color(root) != Color::Black {
            return Err(InvariantViolation::RootNotBlack);
        }
        self.validate_node(root, None, None).map(|_| ())
    }

    /// Returns the subtree's black-height (absent terminator included).
    /// `lower`/`upper` are the key bounds inherited from ancestors: every
    /// key must satisfy `lower <= key < upper`, the asymmetry being the
    /// ties-go-right placement rule.
    fn validate_node(
        &self,
        handle: Handle,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> Result<usize, InvariantViolation>
    where
        K: Ord,
    {
        let node = self.node(handle);
        if let Some(lo) = lower
            && node.key < *lo
        {
            return Err(InvariantViolation::OrderViolation);
        }
        if let Some(hi) = upper
            && node.key >= *hi
        {
            return Err(InvariantViolation::OrderViolation);
        }

        // Absent children have black-height 1: just the terminator.
        let mut heights = [1usize; 2];
        for (slot, branch) in [Branch::Left, Branch::Right].into_iter().enumerate() {
            let Some(child) = node.child(branch) else { continue };
            let child_node = self.node(child);
            if child_node.parent != Some(handle) {
                return Err(InvariantViolation::ParentLinkBroken);
            }
            if node.color == Color::Red && child_node.color == Color::Red {
                return Err(InvariantViolation::RedRedViolation);
            }
            heights[slot] = match branch {
                Branch::Left => self.validate_node(child, lower, Some(&node.key))?,
                Branch::Right => self.validate_node(child, Some(&node.key), upper)?,
            };
        }
        if heights[0] != heights[1] {
            return Err(InvariantViolation::BlackHeightMismatch);
        }
        Ok(heights[0] + usize::from(node.color == Color::Black))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn build(keys: &[i64]) -> RawRbTree<i64> {
        let mut tree = RawRbTree::new();
        for &key in keys {
            tree.insert(key);
        }
        tree
    }

    #[test]
    fn three_ascending_keys_balance_into_a_v() {
        let tree = build(&[10, 20, 30]);
        let root = tree.root().expect("non-empty");

        assert_eq!(tree.node(root).key, 20);
        assert_eq!(tree.node(root).color, Color::Black);
        let left = tree.node(root).left.expect("left child");
        let right = tree.node(root).right.expect("right child");
        assert_eq!(tree.node(left).key, 10);
        assert_eq!(tree.node(right).key, 30);
        assert_eq!(tree.black_height(), 2);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn singleton_black_height_counts_the_terminator() {
        let tree = build(&[7]);
        assert_eq!(tree.black_height(), 2);
        assert_eq!(build(&[]).black_height(), -1);
    }

    #[test]
    fn search_misses_and_removals_on_empty_tree_are_no_ops() {
        let mut tree: RawRbTree<i64> = RawRbTree::new();
        assert_eq!(tree.search(&5), None);
        assert_eq!(tree.remove(&5), None);
        assert!(tree.is_empty());
    }

    #[test]
    fn removing_the_last_node_empties_the_tree() {
        let mut tree = build(&[42]);
        assert_eq!(tree.remove(&42), Some(42));
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.black_height(), -1);
    }

    #[test]
    fn two_child_deletion_swaps_in_the_successor() {
        let mut tree = build(&[5, 3, 8, 1, 4, 7, 9]);
        assert_eq!(tree.remove(&5), Some(5));
        assert!(tree.validate().is_ok());
        assert_eq!(tree.search(&5), None);
        for key in [3, 8, 1, 4, 7, 9] {
            assert!(tree.search(&key).is_some(), "lost key {key}");
        }
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn duplicate_keys_descend_right() {
        let mut tree = build(&[10, 10, 10]);
        assert!(tree.validate().is_ok());
        assert_eq!(tree.len(), 3);
        // Removing one occurrence at a time.
        assert_eq!(tree.remove(&10), Some(10));
        assert_eq!(tree.len(), 2);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn sibling_of_root_is_absent() {
        let tree = build(&[10, 20, 30]);
        let root = tree.root().expect("non-empty");
        assert_eq!(tree.sibling_of(root), None);

        let left = tree.node(root).left.expect("left child");
        let right = tree.node(root).right.expect("right child");
        assert_eq!(tree.sibling_of(left), Some(right));
        assert_eq!(tree.branch_of(left), Branch::Left);
        assert_eq!(tree.branch_of(right), Branch::Right);
    }

    #[test]
    #[should_panic(expected = "`rotate()` - rotating into an absent pivot!")]
    fn rotating_into_an_absent_pivot_panics() {
        let mut tree = build(&[1]);
        let root = tree.root().expect("non-empty");
        tree.rotate(root, Branch::Left);
    }

    #[test]
    fn traverse_visits_in_order_between_children() {
        let tree = build(&[4, 2, 6, 1, 3, 5, 7]);
        let mut keys = alloc::vec::Vec::new();
        tree.traverse(
            |_| true,
            |key| {
                keys.push(*key);
                true
            },
            |_| true,
        );
        assert_eq!(keys, [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn pre_visitor_false_prunes_the_subtree() {
        let tree = build(&[4, 2, 6, 1, 3, 5, 7]);
        let mut keys = alloc::vec::Vec::new();
        // Refuse the left half of the root; the right half still walks.
        tree.traverse(
            |key| *key != 2,
            |key| {
                keys.push(*key);
                true
            },
            |_| true,
        );
        assert_eq!(keys, [4, 5, 6, 7]);
    }

    proptest! {
        /// Invariants hold after every completed operation.
        #[test]
        fn invariants_survive_random_mutation(ops in prop::collection::vec((any::<bool>(), -64i64..64), 0..512)) {
            let mut tree: RawRbTree<i64> = RawRbTree::new();
            for (is_insert, key) in ops {
                if is_insert {
                    tree.insert(key);
                } else {
                    tree.remove(&key);
                }
                prop_assert_eq!(tree.validate(), Ok(()));
            }
        }

        /// In-order traversal yields the sorted multiset of live keys.
        #[test]
        fn in_order_matches_sorted_input(mut keys in prop::collection::vec(-1000i64..1000, 0..256)) {
            let tree = build(&keys);
            let mut walked = alloc::vec::Vec::new();
            tree.traverse(|_| true, |key| { walked.push(*key); true }, |_| true);
            keys.sort_unstable();
            prop_assert_eq!(walked, keys);
        }
    }
}
