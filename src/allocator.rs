//! Frame Allocator
//!
//! Fixed-capacity bump arena backing the per-frame pass objects and any
//! auxiliary scheduling state. The whole frame's worth of allocations is
//! released in O(1) by [`FrameAllocator::reset`], which the next frame's
//! [`RenderGraph`](crate::RenderGraph) calls on construction.
//!
//! Exceeding the capacity is a hard logic error: the arena refuses to grow
//! and the offending allocation panics. Size the capacity for the worst-case
//! frame instead of handling overflow.

use bumpalo::Bump;

/// Fixed-capacity linear arena for per-frame allocations.
///
/// # Ownership
///
/// The allocator outlives its graphs: it is owned by the renderer and lent to
/// each frame's graph, which resets it before building. Values allocated from
/// the arena borrow it, so the borrow checker enforces that no pass object
/// survives into the next frame.
pub struct FrameAllocator {
    bump: Bump,
    capacity: usize,
}

impl FrameAllocator {
    /// Default arena capacity, enough for a few hundred passes.
    pub const DEFAULT_CAPACITY: usize = 64 * 1024;

    /// Creates an arena with [`Self::DEFAULT_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates an arena holding at most `capacity` bytes.
    ///
    /// The backing chunk is allocated up front; the arena will not request
    /// further memory from the OS.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let bump = Bump::with_capacity(capacity);
        bump.set_allocation_limit(Some(capacity));
        Self { bump, capacity }
    }

    /// Moves `value` into the arena and returns a reference valid until the
    /// next [`reset`](Self::reset).
    ///
    /// # Panics
    ///
    /// Panics if the arena capacity is exhausted.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc<T>(&self, value: T) -> &mut T {
        self.bump.alloc(value)
    }

    /// Copies `value` into the arena.
    ///
    /// # Panics
    ///
    /// Panics if the arena capacity is exhausted.
    pub fn alloc_str(&self, value: &str) -> &str {
        self.bump.alloc_str(value)
    }

    /// The raw bump arena, for arena-boxed allocations.
    #[must_use]
    pub(crate) fn bump(&self) -> &Bump {
        &self.bump
    }

    /// Releases every allocation made since the last reset.
    pub fn reset(&mut self) {
        self.bump.reset();
        log::trace!("frame allocator reset ({} byte capacity)", self.capacity);
    }

    /// Bytes handed out since the last reset (including chunk bookkeeping).
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    /// The fixed capacity this arena was created with.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for FrameAllocator {
    fn default() -> Self {
        Self::new()
    }
}
