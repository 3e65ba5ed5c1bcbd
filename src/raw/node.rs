use super::handle::Handle;

/// Node color for the red-black balancing scheme.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

impl Color {
    /// Color of a possibly absent node.
    ///
    /// This is the classical "nil leaves are black" convention, encoded in
    /// one place so that the fixup case analysis never special-cases a
    /// missing child.
    #[inline]
    pub(crate) fn of<K>(link: Option<Handle>, arena: &super::arena::Arena<Node<K>>) -> Self {
        link.map_or(Color::Black, |handle| arena.get(handle).color)
    }
}

/// Which child slot a node occupies in its parent.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Branch {
    Left,
    Right,
}

impl Branch {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Branch::Left => Branch::Right,
            Branch::Right => Branch::Left,
        }
    }
}

/// A single tree node.
///
/// The `left`/`right` links are the owning edges; `parent` is a plain
/// back-reference used for navigation and rebalancing only. All three are
/// arena handles, so "absent" is `None` — never a sentinel slot.
#[derive(Clone)]
pub(crate) struct Node<K> {
    pub(crate) key: K,
    pub(crate) color: Color,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    pub(crate) parent: Option<Handle>,
}

impl<K> Node<K> {
    /// Creates a detached leaf. New nodes are RED unless they become the
    /// root; insertion forces the root BLACK afterwards.
    pub(crate) fn new_leaf(key: K, parent: Option<Handle>) -> Self {
        Self {
            key,
            color: if parent.is_some() { Color::Red } else { Color::Black },
            left: None,
            right: None,
            parent,
        }
    }

    #[inline]
    pub(crate) fn child(&self, branch: Branch) -> Option<Handle> {
        match branch {
            Branch::Left => self.left,
            Branch::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, branch: Branch, child: Option<Handle>) {
        match branch {
            Branch::Left => self.left = child,
            Branch::Right => self.right = child,
        }
    }
}
