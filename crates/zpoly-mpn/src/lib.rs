//! # zpoly-mpn
//!
//! Limb-level arithmetic for the zpoly workspace: carries and borrows over
//! little-endian `u64` slices, schoolbook and Karatsuba multiplication,
//! division by a precomputed reciprocal, Knuth division, arbitrary-offset
//! bit fields, and word-size number theory.
//!
//! The crate also owns [`ErrorKind`], the error type shared by every layer.

pub mod arith;
pub mod bits;
pub mod div;
pub mod error;
pub mod mul;
pub mod preinv_cache;
pub mod ulong;

pub use div::PreInv;
pub use error::{ErrorKind, Result};
pub use preinv_cache::preinv_for;
