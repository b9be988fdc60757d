//! Element arithmetic in Z/(B^n + 1), B = 2^64.
//!
//! An element occupies `n + 1` limbs: `n` low limbs and a signed top limb,
//! representing `low + top * B^n`. Every operation leaves `top` in
//! `{-1, 0, 1}`; [`normalise`] maps to the canonical residue in `[0, B^n]`.
//!
//! Multiplication by `2^k` is a shift followed by a wrap-around subtraction,
//! since `B^n = -1`. With `w = 64n` the element `2^(3w/4) - 2^(w/4)` squares
//! to 2, so `sqrt(2)` is a root of unity of order `4w` and half-integer powers
//! of two are two shifts and a subtraction.

use zpoly_mpn::arith::{self, add_1, is_zero, lshift, negate, sub_1};
use zpoly_mpn::Result;

/// Limbs of work space the element operations need for width `n`.
#[must_use]
pub const fn scratch_len(n: usize) -> usize {
    5 * n + 3
}

/// Bring the top limb back into `{-1, 0, 1}`.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn fold(x: &mut [u64]) {
    let n = x.len() - 1;
    let hi = x[n] as i64;
    x[n] = 0;
    if hi > 0 {
        let borrow = sub_1(&mut x[..n], hi as u64);
        x[n] = 0u64.wrapping_sub(borrow);
    } else if hi < 0 {
        x[n] = add_1(&mut x[..n], hi.unsigned_abs());
    }
}

/// Reduce to the canonical residue: top limb zero, or exactly `B^n`.
pub fn normalise(x: &mut [u64]) {
    fold(x);
    let n = x.len() - 1;
    if x[n] == u64::MAX {
        x[n] = add_1(&mut x[..n], 1);
    } else if x[n] == 1 && !is_zero(&x[..n]) {
        sub_1(&mut x[..n], 1);
        x[n] = 0;
    }
}

/// Whether `x` is congruent to zero.
#[must_use]
pub fn is_zero_mod(x: &[u64]) -> bool {
    let n = x.len() - 1;
    match x[n] {
        0 => is_zero(&x[..n]),
        1 => x[0] == 1 && is_zero(&x[1..n]),
        u64::MAX => false,
        _ => {
            let mut c = x.to_vec();
            normalise(&mut c);
            is_zero(&c)
        }
    }
}

/// `r = a + b`.
pub fn add(r: &mut [u64], a: &[u64], b: &[u64]) {
    let n = r.len() - 1;
    let c = arith::add(&mut r[..n], &a[..n], &b[..n]);
    r[n] = a[n].wrapping_add(b[n]).wrapping_add(c);
    fold(r);
}

/// `r = a - b`.
pub fn sub(r: &mut [u64], a: &[u64], b: &[u64]) {
    let n = r.len() - 1;
    let borrow = arith::sub(&mut r[..n], &a[..n], &b[..n]);
    r[n] = a[n].wrapping_sub(b[n]).wrapping_sub(borrow);
    fold(r);
}

/// `r += b`.
pub fn add_assign(r: &mut [u64], b: &[u64]) {
    let n = r.len() - 1;
    let c = arith::add_assign(&mut r[..n], &b[..n]);
    r[n] = r[n].wrapping_add(b[n]).wrapping_add(c);
    fold(r);
}

/// `r -= b`.
pub fn sub_assign(r: &mut [u64], b: &[u64]) {
    let n = r.len() - 1;
    let borrow = arith::sub_assign(&mut r[..n], &b[..n]);
    r[n] = r[n].wrapping_sub(b[n]).wrapping_sub(borrow);
    fold(r);
}

/// `r = -a`.
pub fn neg(r: &mut [u64], a: &[u64]) {
    r.copy_from_slice(a);
    negate(r);
    fold(r);
}

/// `r = lo - hi` for a `2n`-limb product `lo + hi * B^n`.
fn reduce_product(r: &mut [u64], prod: &[u64]) {
    let n = r.len() - 1;
    let (lo, hi) = prod.split_at(n);
    r[..n].copy_from_slice(lo);
    let borrow = arith::sub_assign(&mut r[..n], &hi[..n]);
    r[n] = 0u64.wrapping_sub(borrow);
    fold(r);
}

/// `r = a * 2^k`, any `k`. `tmp` holds at least `3n + 1` limbs.
#[allow(clippy::cast_possible_truncation)]
pub fn mul_2exp(r: &mut [u64], a: &[u64], k: usize, tmp: &mut [u64]) {
    let n = r.len() - 1;
    let w = 64 * n;
    let mut k = k % (2 * w);
    let mut flip = false;
    if k >= w {
        flip = true;
        k -= w;
    }
    let (c, rest) = tmp.split_at_mut(n + 1);
    c.copy_from_slice(a);
    normalise(c);
    if c[n] == 1 {
        // a = -1
        r.fill(0);
        r[k / 64] = 1u64 << (k % 64);
        flip = !flip;
    } else {
        let wide = &mut rest[..2 * n];
        wide.fill(0);
        let limbs = k / 64;
        let out = lshift(&mut wide[limbs..limbs + n], &c[..n], (k % 64) as u32);
        wide[limbs + n] = out;
        reduce_product(r, wide);
    }
    if flip {
        negate(r);
        fold(r);
    }
}

/// `r = a / 2^k`, any `k`.
pub fn div_2exp(r: &mut [u64], a: &[u64], k: usize, tmp: &mut [u64]) {
    let w2 = 128 * (r.len() - 1);
    mul_2exp(r, a, w2 - k % w2, tmp);
}

/// `r = a * sqrt(2)^e`, any `e`. `tmp` holds [`scratch_len`] limbs.
pub fn mul_sqrt2exp(r: &mut [u64], a: &[u64], e: usize, tmp: &mut [u64]) {
    let n = r.len() - 1;
    let w = 64 * n;
    let e = e % (4 * w);
    if e % 2 == 0 {
        mul_2exp(r, a, e / 2, tmp);
        return;
    }
    let (t, rest) = tmp.split_at_mut(n + 1);
    let (u, work) = rest.split_at_mut(n + 1);
    mul_2exp(t, a, (e - 1) / 2, work);
    mul_2exp(u, t, w / 4, work);
    mul_2exp(r, t, 3 * w / 4, work);
    sub_assign(r, u);
}

/// In-place `x /= 2^k`.
pub fn div_2exp_assign(x: &mut [u64], k: usize, tmp: &mut [u64]) {
    let (c, work) = tmp.split_at_mut(x.len());
    c.copy_from_slice(x);
    div_2exp(x, c, k, work);
}

/// Canonicalise and convert to a signed `n + 1`-limb two's complement value
/// in `(-(B^n + 1) / 2, (B^n + 1) / 2]`. Returns whether it is negative.
pub fn to_signed(x: &mut [u64]) -> bool {
    normalise(x);
    let n = x.len() - 1;
    if x[n] == 1 {
        x.fill(u64::MAX);
        true
    } else if x[n - 1] >> 63 == 1 {
        sub_1(&mut x[..n], 1);
        x[n] = u64::MAX;
        true
    } else {
        false
    }
}

/// `r = a * b`. `tmp` holds [`scratch_len`] limbs.
pub fn mul(r: &mut [u64], a: &[u64], b: &[u64], tmp: &mut [u64]) -> Result<()> {
    let n = r.len() - 1;
    let (x, rest) = tmp.split_at_mut(n + 1);
    let (y, rest) = rest.split_at_mut(n + 1);
    x.copy_from_slice(a);
    normalise(x);
    y.copy_from_slice(b);
    normalise(y);
    if x[n] == 1 {
        neg(r, y);
    } else if y[n] == 1 {
        neg(r, x);
    } else {
        let prod = &mut rest[..2 * n];
        crate::intmul::mul_limbs(prod, &x[..n], &y[..n])?;
        reduce_product(r, prod);
    }
    Ok(())
}

/// `r = a^2`. `tmp` holds [`scratch_len`] limbs.
pub fn sqr(r: &mut [u64], a: &[u64], tmp: &mut [u64]) -> Result<()> {
    let n = r.len() - 1;
    let (x, rest) = tmp.split_at_mut(n + 1);
    x.copy_from_slice(a);
    normalise(x);
    if x[n] == 1 {
        r.fill(0);
        r[0] = 1;
    } else {
        let prod = &mut rest[..2 * n];
        crate::intmul::sqr_limbs(prod, &x[..n])?;
        reduce_product(r, prod);
    }
    Ok(())
}

/// In-place `r *= b`.
pub fn mul_assign(r: &mut [u64], b: &[u64], tmp: &mut [u64]) -> Result<()> {
    let (c, work) = tmp.split_at_mut(r.len());
    c.copy_from_slice(r);
    mul(r, c, b, work)
}

/// In-place `r = r^2`.
pub fn sqr_assign(r: &mut [u64], tmp: &mut [u64]) -> Result<()> {
    let (c, work) = tmp.split_at_mut(r.len());
    c.copy_from_slice(r);
    sqr(r, c, work)
}
