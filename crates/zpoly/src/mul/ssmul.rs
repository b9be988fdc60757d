//! Schönhage–Strassen products through a Fermat-ring convolution.
//!
//! Coefficients are limb-packed, `bundle` at a time, into a polynomial over
//! Z/(B^n + 1) wide enough that no product coefficient wraps; the truncated
//! convolution runs there and the ring coefficients are summed back.

use zpoly_fermat::params::round_n;
use zpoly_fermat::{select_params, FermatPoly};
use zpoly_mpn::{ErrorKind, Result};

use super::clear_below;
use crate::pack::{limb_pack, limb_unpack, product_field_bits};
use crate::poly::IntPoly;
use crate::view::IntPolyView;

fn field_limbs(a: IntPolyView<'_>, b: IntPolyView<'_>) -> usize {
    product_field_bits(a.max_bits().1, b.max_bits().1, a.len().min(b.len())).div_ceil(64)
}

fn ss(a: IntPolyView<'_>, b: IntPolyView<'_>, out_len: usize, squaring: bool) -> Result<IntPoly> {
    if a.is_zero() || b.is_zero() {
        return Ok(IntPoly::new());
    }
    let out_len = out_len.min(a.len() + b.len() - 1);
    let limbs = field_limbs(a, b);
    let params = select_params(a.len(), b.len(), limbs, squaring);
    tracing::trace!(len1 = a.len(), len2 = b.len(), limbs, ?params, "schonhage-strassen");
    let ring_out = out_len.div_ceil(params.bundle);

    let mut x = FermatPoly::new(params.depth, params.n)?;
    limb_pack(&mut x, a, params.bundle, limbs)?;
    if squaring {
        x.convolve_sqr(ring_out)?;
    } else {
        let mut y = FermatPoly::new(params.depth, params.n)?;
        limb_pack(&mut y, b, params.bundle, limbs)?;
        x.convolve(&mut y, ring_out)?;
    }
    let mut out = IntPoly::with_capacity(out_len, limbs)?;
    limb_unpack(&mut out, &x, out_len, params.bundle, limbs)?;
    Ok(out)
}

/// Schönhage–Strassen product `a * b`.
pub fn mul_ss(a: IntPolyView<'_>, b: IntPolyView<'_>) -> Result<IntPoly> {
    ss(a, b, usize::MAX, false)
}

/// Schönhage–Strassen square.
pub fn sqr_ss(a: IntPolyView<'_>) -> Result<IntPoly> {
    ss(a, a, usize::MAX, true)
}

/// `a * b mod x^n`.
pub fn mul_ss_trunc(a: IntPolyView<'_>, b: IntPolyView<'_>, n: usize) -> Result<IntPoly> {
    ss(a.truncated(n), b.truncated(n), n, false)
}

/// `a * b` with the coefficients below `x^n` zeroed.
pub fn mul_ss_trunc_left(a: IntPolyView<'_>, b: IntPolyView<'_>, n: usize) -> Result<IntPoly> {
    let mut r = ss(a, b, usize::MAX, false)?;
    clear_below(&mut r, n)?;
    Ok(r)
}

/// `a * b mod (x^(2^depth) + 1)`: the negacyclic half product.
///
/// Both operands must have at most `2^depth` coefficients.
pub fn mul_ss_negacyclic(a: IntPolyView<'_>, b: IntPolyView<'_>, depth: u32) -> Result<IntPoly> {
    if depth >= usize::BITS - 1 {
        return Err(ErrorKind::LengthOverflow);
    }
    let size = 1usize << depth;
    if a.len() > size || b.len() > size {
        return Err(ErrorKind::LengthOverflow);
    }
    if a.is_zero() || b.is_zero() {
        return Ok(IntPoly::new());
    }
    let limbs = field_limbs(a, b);
    let n = round_n(limbs, depth, true);
    let mut x = FermatPoly::new(depth, n)?;
    let mut y = FermatPoly::new(depth, n)?;
    limb_pack(&mut x, a, 1, limbs)?;
    limb_pack(&mut y, b, 1, limbs)?;
    x.convolve_negacyclic(&mut y, size)?;
    let mut out = IntPoly::with_capacity(size, limbs)?;
    limb_unpack(&mut out, &x, size, 1, limbs)?;
    Ok(out)
}
