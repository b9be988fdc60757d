//! Bump arena for limb temporaries.
//!
//! Recursive routines (Karatsuba) allocate many short-lived buffers whose
//! sizes are known up front; a bump arena hands them out in O(1) and frees
//! them all at once when the top-level call returns.

use bumpalo::Bump;

/// Bump arena handing out zeroed limb slices.
pub struct LimbArena {
    bump: Bump,
}

impl LimbArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Create an arena pre-sized for `limbs` limbs.
    #[must_use]
    pub fn with_limbs(limbs: usize) -> Self {
        Self {
            bump: Bump::with_capacity(limbs.saturating_mul(8)),
        }
    }

    /// Allocate a zero-filled limb slice.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_limbs(&self, len: usize) -> &mut [u64] {
        self.bump.alloc_slice_fill_default(len)
    }

    /// Allocate a copy of `src`.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_copy(&self, src: &[u64]) -> &mut [u64] {
        self.bump.alloc_slice_copy(src)
    }

    /// Release everything allocated so far.
    pub fn reset(&mut self) {
        self.bump.reset();
    }

    /// Bytes currently held by the arena.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl Default for LimbArena {
    fn default() -> Self {
        Self::new()
    }
}
