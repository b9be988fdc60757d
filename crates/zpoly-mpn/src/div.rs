//! Division: by a single limb through a precomputed reciprocal, and
//! multi-limb schoolbook division (Knuth algorithm D).

use zpoly_memory::scratch_limbs;

use crate::arith::{add_assign, lshift, normalized_len, rshift, submul_1};
use crate::error::{ErrorKind, Result};

/// Precomputed reciprocal of a single-limb divisor.
///
/// Uses the Möller–Granlund "2/1" division: the divisor is normalised so its
/// top bit is set, and `v = floor((B^2 - 1) / d') - B` is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreInv {
    d: u64,
    shift: u32,
    dnorm: u64,
    v: u64,
}

impl PreInv {
    /// Precompute the reciprocal of `d`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(d: u64) -> Result<Self> {
        if d == 0 {
            return Err(ErrorKind::DivisionByZero);
        }
        let shift = d.leading_zeros();
        let dnorm = d << shift;
        let v = (((u128::from(!dnorm)) << 64) | u128::from(u64::MAX)) / u128::from(dnorm);
        Ok(Self {
            d,
            shift,
            dnorm,
            v: v as u64,
        })
    }

    /// The divisor.
    #[inline]
    #[must_use]
    pub fn divisor(&self) -> u64 {
        self.d
    }

    /// Normalised 2/1 step: requires `u1 < dnorm`.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn step(&self, u1: u64, u0: u64) -> (u64, u64) {
        let q = u128::from(self.v) * u128::from(u1) + ((u128::from(u1) << 64) | u128::from(u0));
        let mut q1 = ((q >> 64) as u64).wrapping_add(1);
        let q0 = q as u64;
        let mut r = u0.wrapping_sub(q1.wrapping_mul(self.dnorm));
        if r > q0 {
            q1 = q1.wrapping_sub(1);
            r = r.wrapping_add(self.dnorm);
        }
        if r >= self.dnorm {
            q1 = q1.wrapping_add(1);
            r -= self.dnorm;
        }
        (q1, r)
    }

    /// Divide `hi * B + lo` by `d`; requires `hi < d`.
    #[inline]
    #[must_use]
    pub fn divrem(&self, hi: u64, lo: u64) -> (u64, u64) {
        debug_assert!(hi < self.d);
        let s = self.shift;
        let (u1, u0) = if s == 0 {
            (hi, lo)
        } else {
            ((hi << s) | (lo >> (64 - s)), lo << s)
        };
        let (q, r) = self.step(u1, u0);
        (q, r >> s)
    }

    /// `x mod d`.
    #[inline]
    #[must_use]
    pub fn reduce(&self, x: u64) -> u64 {
        if x < self.d {
            x
        } else {
            self.divrem(0, x).1
        }
    }

    /// `(hi * B + lo) mod d` for any `hi`.
    #[inline]
    #[must_use]
    pub fn reduce_wide(&self, hi: u64, lo: u64) -> u64 {
        self.divrem(self.reduce(hi), lo).1
    }

    /// `a * b mod d` for reduced `a`, `b`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn mulmod(&self, a: u64, b: u64) -> u64 {
        let p = u128::from(a) * u128::from(b);
        self.reduce_wide((p >> 64) as u64, p as u64)
    }
}

/// `q = a / d`, returning `a mod d`. `q` must hold `a.len()` limbs.
pub fn divrem_1(q: &mut [u64], a: &[u64], pre: &PreInv) -> u64 {
    let mut r = 0;
    for (qi, &ai) in q[..a.len()].iter_mut().zip(a).rev() {
        let (qq, rr) = pre.divrem(r, ai);
        *qi = qq;
        r = rr;
    }
    r
}

/// In-place `a /= d`, returning the remainder.
pub fn divrem_1_assign(a: &mut [u64], pre: &PreInv) -> u64 {
    let mut r = 0;
    for ai in a.iter_mut().rev() {
        let (qq, rr) = pre.divrem(r, *ai);
        *ai = qq;
        r = rr;
    }
    r
}

/// `a mod d`.
#[must_use]
pub fn mod_1(a: &[u64], pre: &PreInv) -> u64 {
    a.iter().rev().fold(0, |r, &ai| pre.divrem(r, ai).1)
}

/// Exact in-place division by a limb; the remainder must be zero.
pub fn divexact_1_assign(a: &mut [u64], pre: &PreInv) {
    let r = divrem_1_assign(a, pre);
    debug_assert_eq!(r, 0, "inexact division");
}

/// Truncating division of `a` by `b` (Knuth algorithm D).
///
/// `b` must have a non-zero top limb and `a.len() >= b.len()`. Writes
/// `a.len() - b.len() + 1` quotient limbs to `q` and `b.len()` remainder limbs
/// to `r`.
#[allow(clippy::cast_possible_truncation)]
pub fn tdiv_qr(q: &mut [u64], r: &mut [u64], a: &[u64], b: &[u64]) -> Result<()> {
    let n = b.len();
    if n == 0 || b[n - 1] == 0 {
        return Err(ErrorKind::DivisionByZero);
    }
    debug_assert!(a.len() >= n);
    let m = a.len() - n;
    if n == 1 {
        let pre = PreInv::new(b[0])?;
        r[0] = divrem_1(&mut q[..=m], a, &pre);
        return Ok(());
    }

    let s = b[n - 1].leading_zeros();
    let mut bn = scratch_limbs(n);
    lshift(&mut bn, b, s);
    let mut an = scratch_limbs(a.len() + 1);
    let top = lshift(&mut an[..a.len()], a, s);
    an[a.len()] = top;

    let d1 = u128::from(bn[n - 1]);
    let d2 = u128::from(bn[n - 2]);
    let base = 1u128 << 64;
    for j in (0..=m).rev() {
        let num = (u128::from(an[j + n]) << 64) | u128::from(an[j + n - 1]);
        let mut qhat = num / d1;
        let mut rhat = num % d1;
        while qhat >= base || qhat * d2 > ((rhat << 64) | u128::from(an[j + n - 2])) {
            qhat -= 1;
            rhat += d1;
            if rhat >= base {
                break;
            }
        }
        let borrow = submul_1(&mut an[j..j + n], &bn, qhat as u64);
        let (t, under) = an[j + n].overflowing_sub(borrow);
        an[j + n] = t;
        if under {
            qhat -= 1;
            let c = add_assign(&mut an[j..j + n], &bn);
            an[j + n] = an[j + n].wrapping_add(c);
        }
        q[j] = qhat as u64;
    }
    rshift(&mut r[..n], &an[..n], s);
    Ok(())
}

/// Quotient and remainder of limb spans as freshly allocated, normalised vectors.
pub fn divrem(a: &[u64], b: &[u64]) -> Result<(Vec<u64>, Vec<u64>)> {
    let lb = normalized_len(b);
    if lb == 0 {
        return Err(ErrorKind::DivisionByZero);
    }
    let la = normalized_len(a);
    if la < lb {
        return Ok((Vec::new(), a[..la].to_vec()));
    }
    let mut q = vec![0u64; la - lb + 1];
    let mut r = vec![0u64; lb];
    tdiv_qr(&mut q, &mut r, &a[..la], &b[..lb])?;
    q.truncate(normalized_len(&q));
    r.truncate(normalized_len(&r));
    Ok((q, r))
}
