//! Packing integer polynomials into bit fields.
//!
//! A polynomial `sum c_i x^i` is packed by evaluating it at `x = 2^field`:
//! coefficients are added into (or, when negative, subtracted from) a limb
//! array at offsets `i * field`, giving the two's complement image of the
//! value. Unpacking reads the fields back as balanced digits, carrying a
//! borrow upwards whenever a digit is read as negative.
//!
//! The Fermat-ring forms bundle `bundle` source coefficients into each ring
//! coefficient; unpacking a convolution output adds every ring coefficient
//! back at offset `j * bundle * field`, so the overlapping fields of a
//! product are summed before the digits are read.

use zpoly_fermat::ring::to_signed;
use zpoly_fermat::FermatPoly;
use zpoly_mpn::arith::{add_1, bit_length, negate, normalized_len};
use zpoly_mpn::bits::{add_shifted, read_field, sub_shifted};
use zpoly_mpn::ulong::clog2;
use zpoly_mpn::{ErrorKind, Result};

use crate::integer::ZInt;
use crate::poly::IntPoly;
use crate::view::IntPolyView;

/// Field width able to hold every coefficient of a product of polynomials
/// with `bits1`- and `bits2`-bit coefficients, `min_len` terms overlapping,
/// including a sign bit and one bit of slack.
#[must_use]
pub fn product_field_bits(bits1: usize, bits2: usize, min_len: usize) -> usize {
    bits1 + bits2 + clog2(min_len.max(1)) as usize + 2
}

fn check_fits(src: IntPolyView<'_>, field: usize) -> Result<()> {
    for i in 0..src.len() {
        let bits = bit_length(src.coeff_limbs(i));
        let limit = if src.is_negative(i) { field.saturating_sub(1) } else { field };
        if bits > limit {
            return Err(ErrorKind::PackDoesNotFit);
        }
    }
    Ok(())
}

fn accumulate(dst: &mut [u64], src: IntPolyView<'_>, start: usize, count: usize, field: usize, negate_all: bool) {
    for k in 0..count {
        let i = start + k;
        if i >= src.len() {
            break;
        }
        let mag = src.coeff_limbs(i);
        if mag.is_empty() {
            continue;
        }
        if src.is_negative(i) != negate_all {
            sub_shifted(dst, mag, k * field);
        } else {
            add_shifted(dst, mag, k * field);
        }
    }
}

/// Limbs needed for the packed image of `len` fields of `field` bits.
#[must_use]
pub fn packed_limbs(len: usize, field: usize) -> usize {
    (len * field).div_ceil(64) + 1
}

/// Write `src(2^field)` (negated if `negate_all`) into `dst` as a two's
/// complement value. `dst` is overwritten.
///
/// Fails with [`ErrorKind::PackDoesNotFit`] if a coefficient needs more than
/// `field` bits, sign included.
pub fn pack_integer(dst: &mut [u64], src: IntPolyView<'_>, field: usize, negate_all: bool) -> Result<()> {
    check_fits(src, field)?;
    dst.fill(0);
    accumulate(dst, src, 0, src.len(), field, negate_all);
    Ok(())
}

/// Read `len` digits of `field` bits out of the two's complement value
/// `src` and add them (negated if `negate_all`) into coefficients
/// `0..len` of `out`.
///
/// With `signed`, digits are balanced: a field whose top bit is set is read
/// as negative and borrows one from the next field.
pub fn unpack_integer(
    out: &mut IntPoly,
    src: &[u64],
    len: usize,
    field: usize,
    signed: bool,
    negate_all: bool,
) -> Result<()> {
    if field == 0 {
        return Err(ErrorKind::PackDoesNotFit);
    }
    let width = field.div_ceil(64) + 1;
    let mut digit = vec![0u64; width];
    let mut borrow = 0u64;
    for i in 0..len {
        digit.fill(0);
        read_field(&mut digit, src, i * field, field);
        add_1(&mut digit, borrow);
        let negative = signed && (bit(&digit, field - 1) || bit(&digit, field));
        if negative {
            negate(&mut digit);
            mask(&mut digit, field);
            borrow = 1;
        } else {
            borrow = 0;
        }
        let size = normalized_len(&digit);
        if size == 0 {
            continue;
        }
        let neg = negative != negate_all;
        if out.header(i) == 0 {
            out.set_coeff_raw(i, neg, &digit[..size])?;
        } else {
            out.add_to_coeff(i, &ZInt::from_parts(neg, digit[..size].to_vec()))?;
        }
    }
    Ok(())
}

fn bit(x: &[u64], k: usize) -> bool {
    x.get(k / 64).is_some_and(|w| (w >> (k % 64)) & 1 == 1)
}

fn mask(x: &mut [u64], bits: usize) {
    for (k, w) in x.iter_mut().enumerate() {
        let lo = 64 * k;
        if lo >= bits {
            *w = 0;
        } else if bits - lo < 64 {
            *w &= (1u64 << (bits - lo)) - 1;
        }
    }
}

fn pack_frp(frp: &mut FermatPoly, src: IntPolyView<'_>, bundle: usize, field: usize) -> Result<()> {
    let bundle = bundle.max(1);
    let fits = bundle.checked_mul(field).is_some_and(|w| w <= 64 * frp.n());
    let len = src.len().div_ceil(bundle);
    if field == 0 || !fits || len > frp.size() {
        return Err(ErrorKind::PackDoesNotFit);
    }
    check_fits(src, field)?;
    frp.set_length(0);
    frp.set_length(len);
    for j in 0..len {
        let dst = frp.coeff_mut(j);
        dst.fill(0);
        accumulate(dst, src, j * bundle, bundle, field, false);
    }
    Ok(())
}

/// Add the coefficients of `frp`, read as signed ring elements, into a long
/// two's complement integer at offsets `j * bundle * field`, then unpack
/// `len` digits into `out`.
fn unpack_frp(out: &mut IntPoly, frp: &FermatPoly, len: usize, bundle: usize, field: usize) -> Result<()> {
    let bundle = bundle.max(1);
    if field == 0 {
        return Err(ErrorKind::PackDoesNotFit);
    }
    let mut buf = vec![0u64; packed_limbs(len, field)];
    let end = 64 * buf.len();
    let mut c = vec![0u64; frp.n() + 1];
    for j in 0..frp.len() {
        let offset = j * bundle * field;
        if offset >= end {
            break;
        }
        c.copy_from_slice(frp.coeff(j));
        if to_signed(&mut c) {
            negate(&mut c);
            sub_shifted(&mut buf, &c[..normalized_len(&c)], offset);
        } else {
            add_shifted(&mut buf, &c[..normalized_len(&c)], offset);
        }
    }
    unpack_integer(out, &buf, len, field, true, false)
}

/// Pack `src` into `frp`, `bundle` coefficients per ring coefficient, each
/// in a field of `limbs_per_coeff` whole limbs.
pub fn limb_pack(frp: &mut FermatPoly, src: IntPolyView<'_>, bundle: usize, limbs_per_coeff: usize) -> Result<()> {
    pack_frp(frp, src, bundle, 64 * limbs_per_coeff)
}

/// Inverse of [`limb_pack`], adding `len` coefficients into `out`.
pub fn limb_unpack(
    out: &mut IntPoly,
    frp: &FermatPoly,
    len: usize,
    bundle: usize,
    limbs_per_coeff: usize,
) -> Result<()> {
    unpack_frp(out, frp, len, bundle, 64 * limbs_per_coeff)
}

/// Pack `src` into `frp` with `bits`-bit fields (`0 < bits < 64`, sign
/// included).
pub fn bit_pack(frp: &mut FermatPoly, src: IntPolyView<'_>, bundle: usize, bits: usize) -> Result<()> {
    if bits >= 64 {
        return Err(ErrorKind::PackDoesNotFit);
    }
    pack_frp(frp, src, bundle, bits)
}

/// Inverse of [`bit_pack`], adding `len` coefficients into `out`.
pub fn bit_unpack(out: &mut IntPoly, frp: &FermatPoly, len: usize, bundle: usize, bits: usize) -> Result<()> {
    if bits >= 64 {
        return Err(ErrorKind::PackDoesNotFit);
    }
    unpack_frp(out, frp, len, bundle, bits)
}

/// Pack `src` into `frp` with fields of `coeff_bytes` bytes.
pub fn byte_pack(frp: &mut FermatPoly, src: IntPolyView<'_>, bundle: usize, coeff_bytes: usize) -> Result<()> {
    pack_frp(frp, src, bundle, 8 * coeff_bytes)
}

/// Inverse of [`byte_pack`], adding `len` coefficients into `out`.
pub fn byte_unpack(
    out: &mut IntPoly,
    frp: &FermatPoly,
    len: usize,
    bundle: usize,
    coeff_bytes: usize,
) -> Result<()> {
    unpack_frp(out, frp, len, bundle, 8 * coeff_bytes)
}
