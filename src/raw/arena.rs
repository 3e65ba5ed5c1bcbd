use alloc::vec::Vec;

use super::handle::Handle;

/// Slot arena owning every node of a tree.
///
/// Handles are stable for the lifetime of the slot: rotations and fixups
/// rewire links between slots without moving them. A slot is recycled only
/// through [`Arena::take`], which the tree calls strictly after the node has
/// been unlinked, so no reachable link ever names a free slot.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(handle) = self.free.pop() {
            // Recycle a previously freed slot.
            self.slots[handle.to_index()] = Some(element);
            handle
        } else {
            assert!(
                self.slots.len() <= Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX
            );
            self.slots.push(Some(element));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is stale!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is stale!")
    }

    /// Returns mutable references to two distinct slots at once.
    ///
    /// Needed when deletion swaps a key with its in-order successor; the
    /// `split_at_mut` keeps the disjointness visible to the borrow checker.
    pub(crate) fn get2_mut(&mut self, a: Handle, b: Handle) -> (&mut T, &mut T) {
        let (i, j) = (a.to_index(), b.to_index());
        assert_ne!(i, j, "`Arena::get2_mut()` - the two handles must be distinct!");
        let stale = "`Arena::get2_mut()` - `handle` is stale!";
        if i < j {
            let (head, tail) = self.slots.split_at_mut(j);
            (head[i].as_mut().expect(stale), tail[0].as_mut().expect(stale))
        } else {
            let (head, tail) = self.slots.split_at_mut(i);
            let (first, second) = (tail[0].as_mut().expect(stale), head[j].as_mut().expect(stale));
            (first, second)
        }
    }

    /// Removes an element, returning it and marking the slot for reuse.
    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is stale!");
        self.free.push(handle);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}
