//! Karatsuba multiplication on coefficient views.
//!
//! The longer operand is split at half its length; unbalanced operands are
//! first cut into blocks of the shorter one's length. Blocks at or below
//! the base length go to the schoolbook routine. Its accumulators and the
//! signed sums that recombine the subproducts come out of one bump arena
//! shared by the whole recursion.

use std::cmp::Ordering;

use zpoly_memory::LimbArena;
use zpoly_mpn::arith::{add_assign, cmp, sub_assign};
use zpoly_mpn::{ErrorKind, Result};

use super::classical::{accumulator_limbs, classical_into};
use super::clear_below;
use crate::constants::{KARATSUBA_BASE_TABLE, KARATSUBA_SQR_BASE_TABLE};
use crate::ops::add_views;
use crate::poly::IntPoly;
use crate::view::IntPolyView;

/// `out += src * x^shift`, each coefficient summed on its limbs in two
/// arena accumulators one limb wider than either operand.
fn add_into(out: &mut IntPoly, src: &IntPoly, shift: usize, arena: &mut LimbArena) -> Result<()> {
    if src.is_zero() {
        return Ok(());
    }
    let end = shift.checked_add(src.len()).ok_or(ErrorKind::LengthOverflow)?;
    out.fit_length(end)?;
    let width = out.limbs().max(src.limbs()) + 1;
    {
        let (acc, other) = arena.alloc_limbs(2 * width).split_at_mut(width);
        let src = src.view();
        for i in 0..src.len() {
            let y = src.coeff_limbs(i);
            if y.is_empty() {
                continue;
            }
            let k = i + shift;
            let y_neg = src.is_negative(i);
            let x_neg = out.view().is_negative(k);
            acc.fill(0);
            let x = out.view().coeff_limbs(k);
            acc[..x.len()].copy_from_slice(x);
            let (neg, sum) = if x_neg == y_neg {
                let carry = add_assign(acc, y);
                debug_assert_eq!(carry, 0);
                (x_neg, &*acc)
            } else {
                other.fill(0);
                other[..y.len()].copy_from_slice(y);
                if cmp(acc, other) == Ordering::Less {
                    sub_assign(other, acc);
                    (y_neg, &*other)
                } else {
                    sub_assign(acc, other);
                    (x_neg, &*acc)
                }
            };
            out.set_coeff_raw(k, neg, sum)?;
        }
    }
    arena.reset();
    Ok(())
}

fn base_case(a: IntPolyView<'_>, b: IntPolyView<'_>, arena: &mut LimbArena) -> Result<IntPoly> {
    let width = accumulator_limbs(a, b);
    let mut out = IntPoly::with_capacity(a.len() + b.len() - 1, width)?;
    {
        let scratch = arena.alloc_limbs(3 * width);
        classical_into(&mut out, a, b, 0, usize::MAX, scratch)?;
    }
    arena.reset();
    Ok(out)
}

fn recurse(
    a: IntPolyView<'_>,
    b: IntPolyView<'_>,
    squaring: bool,
    base: usize,
    arena: &mut LimbArena,
) -> Result<IntPoly> {
    let (a, b) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if b.is_zero() {
        return Ok(IntPoly::new());
    }
    if b.len() <= base {
        return base_case(a, b, arena);
    }
    if a.len() >= 2 * b.len() {
        let mut out = IntPoly::new();
        let mut start = 0;
        while start < a.len() {
            let block = recurse(a.range(start, b.len()), b, false, base, arena)?;
            add_into(&mut out, &block, start, arena)?;
            start += b.len();
        }
        return Ok(out);
    }

    let m = a.len().div_ceil(2);
    let (a0, a1) = (a.range(0, m), a.range(m, usize::MAX));
    let (b0, b1) = (b.range(0, m), b.range(m, usize::MAX));
    let z0 = recurse(a0, b0, squaring, base, arena)?;
    let z2 = recurse(a1, b1, squaring, base, arena)?;
    let sa = add_views(a0, a1)?;
    let mid = if squaring {
        recurse(sa.view(), sa.view(), true, base, arena)?
    } else {
        let sb = add_views(b0, b1)?;
        recurse(sa.view(), sb.view(), false, base, arena)?
    };
    let z1 = mid.sub(&z0)?.sub(&z2)?;

    let mut out = z0;
    add_into(&mut out, &z1, m, arena)?;
    add_into(&mut out, &z2, 2 * m, arena)?;
    Ok(out)
}

fn karatsuba(a: IntPolyView<'_>, b: IntPolyView<'_>, squaring: bool) -> Result<IntPoly> {
    if a.is_zero() || b.is_zero() {
        return Ok(IntPoly::new());
    }
    let limbs = a.max_limbs().max(b.max_limbs());
    let table = if squaring {
        &KARATSUBA_SQR_BASE_TABLE
    } else {
        &KARATSUBA_BASE_TABLE
    };
    let base = table.lookup(limbs).max(1);
    tracing::trace!(len1 = a.len(), len2 = b.len(), limbs, base, "karatsuba");
    let mut arena = LimbArena::with_limbs(3 * (2 * limbs + 2));
    recurse(a, b, squaring, base, &mut arena)
}

/// Karatsuba product `a * b`.
pub fn mul_karatsuba(a: IntPolyView<'_>, b: IntPolyView<'_>) -> Result<IntPoly> {
    karatsuba(a, b, false)
}

/// Karatsuba square.
pub fn sqr_karatsuba(a: IntPolyView<'_>) -> Result<IntPoly> {
    karatsuba(a, a, true)
}

/// `a * b mod x^n`.
pub fn mul_karatsuba_trunc(a: IntPolyView<'_>, b: IntPolyView<'_>, n: usize) -> Result<IntPoly> {
    let mut r = karatsuba(a.truncated(n), b.truncated(n), false)?;
    r.truncate(n);
    Ok(r)
}

/// `a * b` with the coefficients below `x^n` zeroed.
pub fn mul_karatsuba_trunc_left(a: IntPolyView<'_>, b: IntPolyView<'_>, n: usize) -> Result<IntPoly> {
    let mut r = karatsuba(a, b, false)?;
    clear_below(&mut r, n)?;
    Ok(r)
}
