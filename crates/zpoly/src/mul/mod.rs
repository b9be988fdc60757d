//! Products of integer polynomials.
//!
//! [`mul_views`] picks an engine from the operand lengths and coefficient
//! sizes: schoolbook for tiny inputs, Kronecker substitution while the
//! coefficients are a few limbs wide, Karatsuba for short operands, and
//! otherwise Schönhage–Strassen when the coefficients are large relative
//! to the lengths, Kronecker substitution when they are not. Every engine
//! leaves its inputs untouched and returns a normalised product.

pub mod classical;
pub mod karatsuba;
pub mod kronecker;
pub mod ssmul;

use tracing::debug;
use zpoly_mpn::Result;

pub use classical::{mul_classical, mul_classical_trunc, mul_classical_trunc_left, sqr_classical};
pub use karatsuba::{mul_karatsuba, mul_karatsuba_trunc, mul_karatsuba_trunc_left, sqr_karatsuba};
pub use kronecker::{ks_field_bits, mul_ks, mul_ks_trunc, mul_ks_trunc_left, sqr_ks, KsPrecache};
pub use ssmul::{mul_ss, mul_ss_negacyclic, mul_ss_trunc, mul_ss_trunc_left, sqr_ss};

use crate::options::MulOptions;
use crate::poly::IntPoly;
use crate::view::IntPolyView;

/// Zero the coefficients below `x^n`.
pub(crate) fn clear_below(p: &mut IntPoly, n: usize) -> Result<()> {
    for i in 0..n.min(p.len()) {
        p.set_coeff_raw(i, false, &[])?;
    }
    Ok(())
}

/// The multiplication algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engine {
    Classical,
    Karatsuba,
    Kronecker,
    SchonhageStrassen,
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Classical => "classical",
            Self::Karatsuba => "karatsuba",
            Self::Kronecker => "kronecker",
            Self::SchonhageStrassen => "schonhage-strassen",
        };
        f.write_str(name)
    }
}

/// The engine [`mul_views`] uses for `a * b`.
#[must_use]
pub fn choose_engine(a: IntPolyView<'_>, b: IntPolyView<'_>, opts: &MulOptions) -> Engine {
    let opts = opts.normalize();
    let (len1, len2) = (a.len(), b.len());
    if len1.min(len2) <= 2 || len1 + len2 <= opts.classical_cutoff {
        return Engine::Classical;
    }
    if a.max_limbs() + b.max_limbs() <= opts.ks_max_limbs {
        return Engine::Kronecker;
    }
    if len1 + len2 <= opts.karatsuba_cutoff {
        return Engine::Karatsuba;
    }
    let bits = a.max_bits().1 + b.max_bits().1;
    if opts.ss_bits_factor * bits >= len1 + len2 {
        Engine::SchonhageStrassen
    } else {
        Engine::Kronecker
    }
}

/// `a * b` with the engine chosen under `opts`.
pub fn mul_views(a: IntPolyView<'_>, b: IntPolyView<'_>, opts: &MulOptions) -> Result<IntPoly> {
    let engine = choose_engine(a, b, opts);
    debug!(len1 = a.len(), len2 = b.len(), %engine, "polynomial product");
    match engine {
        Engine::Classical => mul_classical(a, b),
        Engine::Karatsuba => mul_karatsuba(a, b),
        Engine::Kronecker => mul_ks(a, b),
        Engine::SchonhageStrassen => mul_ss(a, b),
    }
}

/// `a^2` with the engine chosen under `opts`.
pub fn sqr_view(a: IntPolyView<'_>, opts: &MulOptions) -> Result<IntPoly> {
    let engine = choose_engine(a, a, opts);
    debug!(len = a.len(), %engine, "polynomial square");
    match engine {
        Engine::Classical => sqr_classical(a),
        Engine::Karatsuba => sqr_karatsuba(a),
        Engine::Kronecker => sqr_ks(a),
        Engine::SchonhageStrassen => sqr_ss(a),
    }
}

/// `a * b mod x^n`.
pub fn mul_trunc_views(a: IntPolyView<'_>, b: IntPolyView<'_>, n: usize, opts: &MulOptions) -> Result<IntPoly> {
    let (a, b) = (a.truncated(n), b.truncated(n));
    match choose_engine(a, b, opts) {
        Engine::Classical => mul_classical_trunc(a, b, n),
        Engine::Karatsuba => mul_karatsuba_trunc(a, b, n),
        Engine::Kronecker => mul_ks_trunc(a, b, n),
        Engine::SchonhageStrassen => mul_ss_trunc(a, b, n),
    }
}

/// `a * b` with the coefficients below `x^n` zero; only the rest is
/// guaranteed to be computed.
pub fn mul_trunc_left_views(
    a: IntPolyView<'_>,
    b: IntPolyView<'_>,
    n: usize,
    opts: &MulOptions,
) -> Result<IntPoly> {
    match choose_engine(a, b, opts) {
        Engine::Classical => mul_classical_trunc_left(a, b, n),
        Engine::Karatsuba => mul_karatsuba_trunc_left(a, b, n),
        Engine::Kronecker => mul_ks_trunc_left(a, b, n),
        Engine::SchonhageStrassen => mul_ss_trunc_left(a, b, n),
    }
}

impl IntPoly {
    /// `self * other`.
    pub fn mul(&self, other: &Self) -> Result<Self> {
        mul_views(self.view(), other.view(), &MulOptions::default())
    }

    /// `self * other` with explicit engine thresholds.
    pub fn mul_with(&self, other: &Self, opts: &MulOptions) -> Result<Self> {
        mul_views(self.view(), other.view(), opts)
    }

    /// `self^2`.
    pub fn sqr(&self) -> Result<Self> {
        sqr_view(self.view(), &MulOptions::default())
    }

    /// `self * other mod x^n`.
    pub fn mul_trunc(&self, other: &Self, n: usize) -> Result<Self> {
        mul_trunc_views(self.view(), other.view(), n, &MulOptions::default())
    }

    /// `self * other` with the coefficients below `x^n` zeroed.
    pub fn mul_trunc_left(&self, other: &Self, n: usize) -> Result<Self> {
        mul_trunc_left_views(self.view(), other.view(), n, &MulOptions::default())
    }

    /// `self *= other`. On error `self` is unchanged.
    pub fn mul_assign(&mut self, other: &Self) -> Result<()> {
        *self = self.mul(other)?;
        Ok(())
    }

    /// `self^e`; `x^0 = 1` for every `x`, zero included.
    pub fn pow(&self, e: u64) -> Result<Self> {
        let mut acc = Self::constant(&crate::ZInt::one())?;
        for i in (0..u64::BITS - e.leading_zeros()).rev() {
            acc = acc.sqr()?;
            if (e >> i) & 1 == 1 {
                acc = acc.mul(self)?;
            }
        }
        Ok(acc)
    }

    /// `self^e mod x^n`.
    pub fn pow_trunc(&self, e: u64, n: usize) -> Result<Self> {
        if n == 0 {
            return Ok(Self::new());
        }
        let base = self.view().truncated(n).to_poly()?;
        let mut acc = Self::constant(&crate::ZInt::one())?;
        for i in (0..u64::BITS - e.leading_zeros()).rev() {
            acc = acc.mul_trunc(&acc, n)?;
            if (e >> i) & 1 == 1 {
                acc = acc.mul_trunc(&base, n)?;
            }
        }
        Ok(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integer::ZInt;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn p(c: &[i64]) -> IntPoly {
        IntPoly::from_i64s(c).unwrap()
    }

    fn random_poly(rng: &mut ChaCha8Rng, len: usize, bits: usize) -> IntPoly {
        let coeffs: Vec<_> = (0..len).map(|_| ZInt::random_signed(rng, bits)).collect();
        IntPoly::from_zints(&coeffs).unwrap()
    }

    #[test]
    fn dispatch_by_size() {
        let opts = MulOptions::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let tiny = p(&[1, 2]);
        let small = random_poly(&mut rng, 10, 60);
        assert_eq!(choose_engine(tiny.view(), small.view(), &opts), Engine::Classical);
        assert_eq!(choose_engine(small.view(), small.view(), &opts), Engine::Kronecker);
        let wide = random_poly(&mut rng, 10, 400);
        assert_eq!(choose_engine(wide.view(), wide.view(), &opts), Engine::Karatsuba);
        let long_wide = random_poly(&mut rng, 100, 400);
        assert_eq!(choose_engine(long_wide.view(), long_wide.view(), &opts), Engine::SchonhageStrassen);
        let long_thin = random_poly(&mut rng, 5000, 400);
        assert_eq!(choose_engine(long_thin.view(), long_thin.view(), &opts), Engine::Kronecker);
    }

    #[test]
    fn every_engine_agrees() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let f = random_poly(&mut rng, 37, 150);
        let g = random_poly(&mut rng, 29, 90);
        let expected = mul_classical(f.view(), g.view()).unwrap();
        assert_eq!(mul_karatsuba(f.view(), g.view()).unwrap(), expected);
        assert_eq!(mul_ks(f.view(), g.view()).unwrap(), expected);
        assert_eq!(mul_ss(f.view(), g.view()).unwrap(), expected);
        assert_eq!(f.mul(&g).unwrap(), expected);
        assert_eq!(expected.len(), f.len() + g.len() - 1);
    }

    #[test]
    fn products_with_zero_and_one() {
        let f = p(&[3, -1, 4]);
        assert!(f.mul(&IntPoly::new()).unwrap().is_zero());
        assert_eq!(f.mul(&p(&[1])).unwrap(), f);
        assert_eq!(f.mul(&p(&[0, 1])).unwrap(), p(&[0, 3, -1, 4]));
    }

    #[test]
    fn assign_and_powers() {
        let mut f = p(&[1, 1]);
        f.mul_assign(&p(&[1, 1])).unwrap();
        assert_eq!(f, p(&[1, 2, 1]));
        assert_eq!(p(&[1, 1]).pow(4).unwrap(), p(&[1, 4, 6, 4, 1]));
        assert_eq!(IntPoly::new().pow(0).unwrap(), p(&[1]));
        assert!(IntPoly::new().pow(3).unwrap().is_zero());
        assert_eq!(p(&[1, -1]).pow_trunc(5, 3).unwrap(), p(&[1, -5, 10]));
        assert_eq!(p(&[2, 1]).sqr().unwrap(), p(&[4, 4, 1]));
    }

    #[test]
    fn truncated_dispatch() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let f = random_poly(&mut rng, 40, 70);
        let g = random_poly(&mut rng, 40, 70);
        let full = f.mul(&g).unwrap();
        let mut low = full.clone();
        low.truncate(33);
        assert_eq!(f.mul_trunc(&g, 33).unwrap(), low);
        let high = f.mul_trunc_left(&g, 33).unwrap();
        assert!((33..full.len()).all(|i| high.get_coeff(i) == full.get_coeff(i)));
        assert!(f.mul_trunc(&g, 0).unwrap().is_zero());
    }
}
