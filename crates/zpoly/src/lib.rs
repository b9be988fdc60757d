//! # zpoly
//!
//! Dense polynomials with arbitrary-precision integer coefficients.
//!
//! Coefficients live in one contiguous limb block per polynomial. Products
//! dispatch between schoolbook, Karatsuba, Kronecker substitution and a
//! Schönhage–Strassen convolution over `Z/(2^(64n) + 1)`; division,
//! pseudo-division, GCDs and resultants build on them, and the modular
//! algorithms move through word primes with Chinese remaindering.

pub mod comb;
pub mod constants;
pub mod div;
pub mod gcd;
pub mod integer;
pub mod io;
pub mod modular;
pub mod mul;
pub mod ops;
pub mod options;
pub mod pack;
pub mod poly;
pub mod scalar;
pub mod tuning;
pub mod view;

// Re-exports
pub use comb::Comb;
pub use integer::ZInt;
pub use modular::PrimeStream;
pub use mul::Engine;
pub use options::MulOptions;
pub use poly::IntPoly;
pub use tuning::TuningProfile;
pub use view::IntPolyView;
pub use zpoly_mpn::{ErrorKind, Result};
pub use zpoly_nmod::ModPoly;

/// Multiply two polynomials given by `i64` coefficients, lowest degree
/// first.
///
/// # Example
/// ```
/// let p = zpoly::multiply_i64(&[7, -5, 0, 42], &[1, 0, 1]).unwrap();
/// assert_eq!(p.pretty("x"), "42*x^5+37*x^3+7*x^2-5*x+7");
/// ```
pub fn multiply_i64(a: &[i64], b: &[i64]) -> Result<IntPoly> {
    IntPoly::from_i64s(a)?.mul(&IntPoly::from_i64s(b)?)
}
