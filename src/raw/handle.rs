use core::num::NonZero;

/// Index of a node slot in the arena.
///
/// Stored off-by-one in a `NonZero` so that `Option<Handle>` — the type of
/// every child and parent link — is the same size as a bare `u32`. A tree
/// node carries three links, so the niche matters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<u32>);

impl Handle {
    /// Largest addressable slot index.
    pub(crate) const MAX: usize = (u32::MAX - 1) as usize;

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::from_index()` - `index` > `Handle::MAX`!");
        // `index + 1` cannot be zero and cannot overflow after the assert.
        Self(NonZero::new((index + 1) as u32).expect("`Handle::from_index()` - off-by-one index is non-zero"))
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}
