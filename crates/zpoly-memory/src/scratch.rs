//! Scoped scratch limb buffers.
//!
//! A `ScratchLimbs` guard owns a zeroed `Vec<u64>` taken from a per-thread
//! pool. Dropping the guard hands the vector back, so a function that
//! acquires scratch releases it on every exit path, `?` included.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};

use crate::stats::STATS;

/// Buffers kept per thread.
const MAX_POOLED_BUFFERS: usize = 32;

/// Buffers larger than this (in limbs) are never pooled.
const MAX_POOLED_LIMBS: usize = 1 << 22;

thread_local! {
    static POOL: RefCell<Vec<Vec<u64>>> = const { RefCell::new(Vec::new()) };
}

/// Pop a pooled buffer, cleared, or a fresh empty one.
fn take_buffer(pool: &RefCell<Vec<Vec<u64>>>) -> Vec<u64> {
    let popped = pool.borrow_mut().pop();
    popped.map_or_else(Vec::new, |mut buf| {
        buf.clear();
        buf
    })
}

/// Keep `buf` for reuse unless the pool is full; returns whether it was kept.
fn return_buffer(pool: &RefCell<Vec<Vec<u64>>>, buf: Vec<u64>) -> bool {
    let mut pool = pool.borrow_mut();
    if pool.len() >= MAX_POOLED_BUFFERS {
        return false;
    }
    pool.push(buf);
    true
}

/// A zeroed limb buffer borrowed from the thread-local pool.
#[derive(Debug)]
pub struct ScratchLimbs {
    buf: Vec<u64>,
}

/// Acquire `len` zeroed limbs of scratch.
#[must_use]
pub fn scratch_limbs(len: usize) -> ScratchLimbs {
    let mut buf = POOL.with(take_buffer);
    let reused = buf.capacity() > 0;
    buf.resize(len, 0);
    STATS.with(|s| s.record_acquire(reused));
    ScratchLimbs { buf }
}

impl ScratchLimbs {
    /// Number of limbs in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Grow (zero-filling) or shrink the buffer.
    pub fn resize(&mut self, len: usize) {
        self.buf.resize(len, 0);
    }
}

impl Deref for ScratchLimbs {
    type Target = [u64];

    fn deref(&self) -> &[u64] {
        &self.buf
    }
}

impl DerefMut for ScratchLimbs {
    fn deref_mut(&mut self) -> &mut [u64] {
        &mut self.buf
    }
}

impl Drop for ScratchLimbs {
    fn drop(&mut self) {
        let buf = std::mem::take(&mut self.buf);
        let _ = STATS.try_with(|s| s.record_release());
        if buf.capacity() <= MAX_POOLED_LIMBS {
            // A thread being torn down may no longer have its pool.
            let _ = POOL.try_with(|pool| return_buffer(pool, buf));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::scratch_stats;

    #[test]
    fn buffer_is_zeroed_even_when_reused() {
        {
            let mut s = scratch_limbs(8);
            s.iter_mut().for_each(|x| *x = u64::MAX);
        }
        let s = scratch_limbs(8);
        assert!(s.iter().all(|&x| x == 0));
    }

    #[test]
    fn release_on_drop_balances() {
        let before = scratch_stats();
        {
            let _a = scratch_limbs(4);
            let _b = scratch_limbs(100);
            assert_eq!(scratch_stats().outstanding(), before.outstanding() + 2);
        }
        assert_eq!(scratch_stats().outstanding(), before.outstanding());
    }

    #[test]
    fn release_on_early_return() {
        fn fails(len: usize) -> Result<(), ()> {
            let s = scratch_limbs(len);
            if s.len() > 2 {
                return Err(());
            }
            Ok(())
        }
        let before = scratch_stats();
        assert!(fails(10).is_err());
        assert!(fails(1).is_ok());
        let after = scratch_stats();
        assert_eq!(after.acquired - before.acquired, 2);
        assert_eq!(after.outstanding(), before.outstanding());
    }

    #[test]
    fn pool_is_bounded() {
        let pool = RefCell::new(Vec::new());
        for i in 0..MAX_POOLED_BUFFERS {
            assert!(return_buffer(&pool, vec![i as u64]));
        }
        assert!(!return_buffer(&pool, vec![0]));
        let buf = take_buffer(&pool);
        assert!(buf.is_empty() && buf.capacity() >= 1);
        assert_eq!(pool.borrow().len(), MAX_POOLED_BUFFERS - 1);
    }

    #[test]
    fn resize_zero_fills() {
        let mut s = scratch_limbs(2);
        s[0] = 3;
        s.resize(5);
        assert_eq!(&s[..], &[3, 0, 0, 0, 0]);
        assert!(!s.is_empty());
    }
}
