//! Atomic scratch statistics.
//!
//! Every scoped acquisition bumps `acquired`; every drop bumps `released`.
//! The two must balance once all guards are gone, whatever path the
//! acquiring function took.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of scratch usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScratchStats {
    /// Buffers handed out.
    pub acquired: u64,
    /// Buffers returned.
    pub released: u64,
    /// Buffers served from the pool instead of the allocator.
    pub reused: u64,
}

impl ScratchStats {
    /// Buffers currently held by live guards.
    #[must_use]
    pub fn outstanding(&self) -> u64 {
        self.acquired - self.released
    }
}

pub(crate) struct AtomicScratchStats {
    acquired: AtomicU64,
    released: AtomicU64,
    reused: AtomicU64,
}

impl AtomicScratchStats {
    pub(crate) const fn new() -> Self {
        Self {
            acquired: AtomicU64::new(0),
            released: AtomicU64::new(0),
            reused: AtomicU64::new(0),
        }
    }

    pub(crate) fn snapshot(&self) -> ScratchStats {
        ScratchStats {
            acquired: self.acquired.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn record_acquire(&self, reused: bool) {
        self.acquired.fetch_add(1, Ordering::Relaxed);
        if reused {
            self.reused.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_release(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }
}

thread_local! {
    pub(crate) static STATS: AtomicScratchStats = const { AtomicScratchStats::new() };
}

/// Scratch usage of the current thread.
#[must_use]
pub fn scratch_stats() -> ScratchStats {
    STATS.with(AtomicScratchStats::snapshot)
}
