//! # zpoly-memory
//!
//! Scratch memory for the zpoly workspace.
//!
//! Provides scoped limb buffers drawn from a thread-local pool (released on
//! drop, so every exit path gives the memory back), a bump arena for
//! recursive algorithms, and counters to check that acquisitions balance.
#![warn(missing_docs)]

pub mod arena;
pub mod scratch;
pub mod stats;

pub use arena::LimbArena;
pub use scratch::{scratch_limbs, ScratchLimbs};
pub use stats::{scratch_stats, ScratchStats};
