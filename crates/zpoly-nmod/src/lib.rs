//! # zpoly-nmod
//!
//! Dense polynomials over Z/pZ for a word-size modulus `p`.
//!
//! Coefficients are reduced `u64`s and every division uses a precomputed
//! reciprocal of `p` shared process-wide. Products switch from classical
//! multiplication with delayed reduction to Kronecker substitution over the
//! Fermat-ring integer multiplier; division switches from long division to
//! divide-and-conquer and then to Newton inversion. On top sit GCDs,
//! resultants, modular powering and factorisation over prime fields.

pub mod div;
pub mod factor;
pub mod gcd;
pub mod io;
pub mod mul;
pub mod poly;

pub use factor::FactorList;
pub use mul::MulPrecache;
pub use poly::ModPoly;
pub use zpoly_mpn::{ErrorKind, Result};
