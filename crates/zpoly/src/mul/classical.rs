//! Schoolbook products.
//!
//! Each output coefficient sums its cross products into two magnitude
//! accumulators, one for positive and one for negative terms, and takes
//! the difference once at the end.

use std::cmp::Ordering;

use zpoly_memory::scratch_limbs;
use zpoly_mpn::arith::{add_assign, cmp, sub_assign};
use zpoly_mpn::mul::mul;
use zpoly_mpn::Result;

use crate::poly::IntPoly;
use crate::view::IntPolyView;

/// Accumulator width in limbs for a product of the two operands.
pub(crate) fn accumulator_limbs(a: IntPolyView<'_>, b: IntPolyView<'_>) -> usize {
    a.max_limbs() + b.max_limbs() + 1
}

/// Write coefficients `lo..hi` of `a * b` into `out`, which must be zero
/// there. `scratch` holds three accumulators of
/// [`accumulator_limbs`] limbs.
pub(crate) fn classical_into(
    out: &mut IntPoly,
    a: IntPolyView<'_>,
    b: IntPolyView<'_>,
    lo: usize,
    hi: usize,
    scratch: &mut [u64],
) -> Result<()> {
    if a.is_zero() || b.is_zero() {
        return Ok(());
    }
    let (la, lb) = (a.len(), b.len());
    let width = accumulator_limbs(a, b);
    let (pos, rest) = scratch[..3 * width].split_at_mut(width);
    let (neg, tmp) = rest.split_at_mut(width);
    for k in lo..hi.min(la + lb - 1) {
        pos.fill(0);
        neg.fill(0);
        for i in k.saturating_sub(lb - 1)..=k.min(la - 1) {
            let (x, y) = (a.coeff_limbs(i), b.coeff_limbs(k - i));
            if x.is_empty() || y.is_empty() {
                continue;
            }
            let t = &mut tmp[..x.len() + y.len()];
            mul(t, x, y);
            let acc = if a.is_negative(i) == b.is_negative(k - i) {
                &mut *pos
            } else {
                &mut *neg
            };
            let carry = add_assign(acc, t);
            debug_assert_eq!(carry, 0);
        }
        match cmp(pos, neg) {
            Ordering::Greater => {
                sub_assign(pos, neg);
                out.set_coeff_raw(k, false, pos)?;
            }
            Ordering::Less => {
                sub_assign(neg, pos);
                out.set_coeff_raw(k, true, neg)?;
            }
            Ordering::Equal => {}
        }
    }
    Ok(())
}

fn classical_range(a: IntPolyView<'_>, b: IntPolyView<'_>, lo: usize, hi: usize) -> Result<IntPoly> {
    let mut out = IntPoly::new();
    if a.is_zero() || b.is_zero() {
        return Ok(out);
    }
    let hi = hi.min(a.len() + b.len() - 1);
    let width = accumulator_limbs(a, b);
    out = IntPoly::with_capacity(hi, width)?;
    let mut scratch = scratch_limbs(3 * width);
    classical_into(&mut out, a, b, lo, hi, &mut scratch)?;
    Ok(out)
}

/// Schoolbook product `a * b`.
pub fn mul_classical(a: IntPolyView<'_>, b: IntPolyView<'_>) -> Result<IntPoly> {
    classical_range(a, b, 0, usize::MAX)
}

/// `a * b mod x^n`.
pub fn mul_classical_trunc(a: IntPolyView<'_>, b: IntPolyView<'_>, n: usize) -> Result<IntPoly> {
    classical_range(a.truncated(n), b.truncated(n), 0, n)
}

/// `a * b` with the coefficients below `x^n` left zero and never computed.
pub fn mul_classical_trunc_left(a: IntPolyView<'_>, b: IntPolyView<'_>, n: usize) -> Result<IntPoly> {
    classical_range(a, b, n, usize::MAX)
}

/// Schoolbook square.
pub fn sqr_classical(a: IntPolyView<'_>) -> Result<IntPoly> {
    classical_range(a, a, 0, usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integer::ZInt;

    fn p(c: &[i64]) -> IntPoly {
        IntPoly::from_i64s(c).unwrap()
    }

    #[test]
    fn small_signed_product() {
        // (1 - x)(1 + x) = 1 - x^2
        let r = mul_classical(p(&[1, -1]).view(), p(&[1, 1]).view()).unwrap();
        assert_eq!(r, p(&[1, 0, -1]));
        let r = mul_classical(p(&[2, 3]).view(), p(&[-4, 0, 5]).view()).unwrap();
        assert_eq!(r, p(&[-8, -12, 10, 15]));
    }

    #[test]
    fn multi_limb_cancellation() {
        let big: ZInt = "340282366920938463463374607431768211455".parse().unwrap();
        let mut f = IntPoly::new();
        f.set_coeff(0, &big).unwrap();
        f.set_coeff(1, &big).unwrap();
        let mut g = IntPoly::new();
        g.set_coeff(0, &big).unwrap();
        g.set_coeff(1, &-&big).unwrap();
        let r = mul_classical(f.view(), g.view()).unwrap();
        let sq = &big * &big;
        assert_eq!(r.get_coeff(0), sq);
        assert!(r.get_coeff(1).is_zero());
        assert_eq!(r.get_coeff(2), -sq);
    }

    #[test]
    fn truncated_forms() {
        let (f, g) = (p(&[1, 2, 3]), p(&[4, 5, 6]));
        let full = mul_classical(f.view(), g.view()).unwrap();
        assert_eq!(full, p(&[4, 13, 28, 27, 18]));
        assert_eq!(mul_classical_trunc(f.view(), g.view(), 2).unwrap(), p(&[4, 13]));
        assert_eq!(mul_classical_trunc_left(f.view(), g.view(), 3).unwrap(), p(&[0, 0, 0, 27, 18]));
        assert_eq!(sqr_classical(f.view()).unwrap(), p(&[1, 4, 10, 12, 9]));
        assert!(mul_classical(f.view(), IntPoly::new().view()).unwrap().is_zero());
    }
}
