//! Euclidean division, series inversion and modular powering.
//!
//! Every divisor needs an invertible leading coefficient, which always holds
//! for a prime modulus. A composite modulus whose divisor lead is not a unit
//! fails with [`ErrorKind::NotCoprime`].

use zpoly_mpn::ulong::{addmod, invmod, negmod, submod};
use zpoly_mpn::{ErrorKind, Result};

use crate::gcd;
use crate::mul::{mul, mul_trunc, MulPrecache, KS_CUTOFF};
use crate::poly::ModPoly;

/// Divisor length from which divide-and-conquer division is used.
pub const DIVCONQUER_CUTOFF: usize = 48;

/// Divisor length from which division goes through a Newton inverse.
pub const NEWTON_CUTOFF: usize = 384;

/// Shared checks; returns the inverse of the divisor's leading coefficient.
fn lead_inverse(a: &ModPoly, b: &ModPoly) -> Result<u64> {
    a.check_same_modulus(b)?;
    if b.is_zero() {
        return Err(ErrorKind::DivisionByZero);
    }
    invmod(b.lead(), b.modulus())
}

/// Long division, one quotient coefficient per step.
pub fn divrem_classical(a: &ModPoly, b: &ModPoly) -> Result<(ModPoly, ModPoly)> {
    let inv = lead_inverse(a, b)?;
    if a.len() < b.len() {
        return Ok((a.zero_like(), a.clone()));
    }
    let (p, pre) = (a.modulus(), *a.preinv());
    let lb = b.len();
    let mut r = a.coeffs().to_vec();
    let mut q = vec![0u64; a.len() - lb + 1];
    for k in (0..q.len()).rev() {
        let top = r[k + lb - 1];
        if top == 0 {
            continue;
        }
        let qk = pre.mulmod(top, inv);
        q[k] = qk;
        let m = negmod(qk, p);
        for (x, &y) in r[k..k + lb].iter_mut().zip(b.coeffs()) {
            *x = addmod(*x, pre.mulmod(m, y), p);
        }
    }
    r.truncate(lb - 1);
    Ok((a.from_raw(q), a.from_raw(r)))
}

/// Divide-and-conquer division.
///
/// Each round fixes the top `h <= len(B)` quotient coefficients from the top
/// `2h - 1` coefficients of the running remainder and the top `h` of `B`,
/// then subtracts `Qh * B` shifted into place. A long quotient is consumed
/// in chunks of `len(B)`; a balanced one halves each round.
pub fn divrem_divconquer(a: &ModPoly, b: &ModPoly) -> Result<(ModPoly, ModPoly)> {
    lead_inverse(a, b)?;
    let lb = b.len();
    if a.len() < lb {
        return Ok((a.zero_like(), a.clone()));
    }
    if lb < DIVCONQUER_CUTOFF {
        return divrem_classical(a, b);
    }
    let mut q = vec![0u64; a.len() - lb + 1];
    let mut rem = a.clone();
    while rem.len() >= lb {
        let m = rem.len() - lb + 1;
        let h = if m > lb { lb } else { m - m / 2 };
        let k = m - h;
        let s = lb - h;
        let top_a = rem.from_raw(rem.coeffs()[k + s..].to_vec());
        let top_b = b.from_raw(b.coeffs()[s..].to_vec());
        let (qh, _) = divrem_divconquer(&top_a, &top_b)?;
        for (slot, &c) in q[k..].iter_mut().zip(qh.coeffs()) {
            *slot = c;
        }
        let mut low = rem.coeffs()[..k + lb - 1].to_vec();
        let prod = mul_trunc(&qh, b, lb - 1)?;
        let p = a.modulus();
        for (x, &y) in low[k..].iter_mut().zip(prod.coeffs()) {
            *x = submod(*x, y, p);
        }
        rem = rem.from_raw(low);
    }
    Ok((a.from_raw(q), rem))
}

/// Quotient of `a` by `b` through a Newton inverse of the reversed divisor.
pub fn div_newton(a: &ModPoly, b: &ModPoly) -> Result<ModPoly> {
    lead_inverse(a, b)?;
    if a.len() < b.len() {
        return Ok(a.zero_like());
    }
    let m = a.len() - b.len() + 1;
    let inv = inv_series(&b.reverse(b.len())?, m)?;
    let mut ra = a.reverse(a.len())?;
    ra.truncate(m);
    let q = mul_trunc(&ra, &inv, m)?;
    q.reverse(m)
}

/// Newton division with remainder; `R = A - Q B` is formed from the low
/// `len(B) - 1` coefficients only.
pub fn divrem_newton(a: &ModPoly, b: &ModPoly) -> Result<(ModPoly, ModPoly)> {
    let q = div_newton(a, b)?;
    let r = low_remainder(a, b, &q)?;
    Ok((q, r))
}

fn low_remainder(a: &ModPoly, b: &ModPoly, q: &ModPoly) -> Result<ModPoly> {
    let lb = b.len();
    let mut r = a.clone();
    r.truncate(lb - 1);
    r.sub_assign(&mul_trunc(q, b, lb - 1)?);
    Ok(r)
}

/// `(Q, R)` with `A = Q B + R` and `deg R < deg B`.
pub fn divrem(a: &ModPoly, b: &ModPoly) -> Result<(ModPoly, ModPoly)> {
    lead_inverse(a, b)?;
    let lb = b.len();
    let m = (a.len() + 1).saturating_sub(lb);
    if lb < DIVCONQUER_CUTOFF || m < DIVCONQUER_CUTOFF {
        divrem_classical(a, b)
    } else if lb >= NEWTON_CUTOFF {
        divrem_newton(a, b)
    } else {
        divrem_divconquer(a, b)
    }
}

/// Quotient only.
pub fn div(a: &ModPoly, b: &ModPoly) -> Result<ModPoly> {
    lead_inverse(a, b)?;
    if b.len() >= NEWTON_CUTOFF && a.len() + 1 >= b.len() + DIVCONQUER_CUTOFF {
        div_newton(a, b)
    } else {
        Ok(divrem(a, b)?.0)
    }
}

/// Remainder only.
pub fn rem(a: &ModPoly, b: &ModPoly) -> Result<ModPoly> {
    Ok(divrem(a, b)?.1)
}

/// The inverse of `b` modulo `x^n`.
///
/// Starts from `b(0)^-1` and runs `y <- y + y (1 - b y)`, doubling the
/// precision each step. Fails with [`ErrorKind::NotCoprime`] if `b(0)` is
/// not a unit.
pub fn inv_series(b: &ModPoly, n: usize) -> Result<ModPoly> {
    if b.is_zero() {
        return Err(ErrorKind::DivisionByZero);
    }
    let c0 = invmod(b.coeff(0), b.modulus())?;
    if n == 0 {
        return Ok(b.zero_like());
    }
    let mut y = b.monomial_like(c0, 0)?;
    let mut prec = 1;
    while prec < n {
        prec = (2 * prec).min(n);
        let mut bt = b.clone();
        bt.truncate(prec);
        // e = 1 - b y vanishes below the old precision
        let mut e = mul_trunc(&bt, &y, prec)?;
        e.neg_assign();
        e.set_coeff(0, addmod(e.coeff(0), 1, b.modulus()))?;
        y.add_assign(&mul_trunc(&y, &e, prec)?);
    }
    tracing::trace!(n, "series inverse");
    Ok(y)
}

/// `a / b` modulo `x^n`, for `b(0)` a unit.
pub fn div_series(a: &ModPoly, b: &ModPoly, n: usize) -> Result<ModPoly> {
    a.check_same_modulus(b)?;
    let inv = inv_series(b, n)?;
    mul_trunc(a, &inv, n)
}

/// `a * b mod f`.
pub fn mulmod(a: &ModPoly, b: &ModPoly, f: &ModPoly) -> Result<ModPoly> {
    rem(&mul(a, b)?, f)
}

/// `a^e mod f`. A negative exponent inverts `a` modulo `f` first.
pub fn powmod(a: &ModPoly, e: i64, f: &ModPoly) -> Result<ModPoly> {
    let base = if e < 0 { gcd::invmod(a, f)? } else { rem(a, f)? };
    powmod_unsigned(&base, e.unsigned_abs(), f)
}

/// `a^e mod f` for an unsigned exponent, left to right.
pub fn powmod_unsigned(a: &ModPoly, e: u64, f: &ModPoly) -> Result<ModPoly> {
    lead_inverse(a, f)?;
    if f.len() == 1 {
        return Ok(a.zero_like());
    }
    let base = rem(a, f)?;
    if e == 0 {
        return a.monomial_like(1, 0);
    }
    // the base is packed once when its products go through Kronecker
    // substitution; every accumulator is reduced below `len(f)`
    let cache = if base.len() >= KS_CUTOFF {
        Some(MulPrecache::new(&base, f.len())?)
    } else {
        None
    };
    let mut acc = base.clone();
    for i in (0..63 - e.leading_zeros()).rev() {
        acc = mulmod(&acc, &acc, f)?;
        if (e >> i) & 1 == 1 {
            acc = match &cache {
                Some(c) => rem(&c.mul(&acc)?, f)?,
                None => mulmod(&acc, &base, f)?,
            };
        }
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mul::mul_classical;

    fn seq(p: u64, len: usize, seed: u64) -> ModPoly {
        let mut x = seed;
        let mut c: Vec<u64> = (0..len)
            .map(|_| {
                x = x.wrapping_mul(2_862_933_555_777_941_757).wrapping_add(3_037_000_493);
                x >> 3
            })
            .collect();
        if let Some(top) = c.last_mut() {
            *top = *top % (p - 1) + 1;
        }
        ModPoly::from_coeffs(p, &c).unwrap()
    }

    fn check_identity(a: &ModPoly, b: &ModPoly, q: &ModPoly, r: &ModPoly) {
        assert!(r.len() < b.len(), "remainder too long");
        let mut back = mul_classical(q, b);
        back.add_assign(r);
        assert_eq!(&back, a);
    }

    #[test]
    fn small_division_mod_17() {
        let a = ModPoly::from_coeffs(17, &[2, 0, 5, 0, 1]).unwrap();
        let b = ModPoly::from_coeffs(17, &[1, 0, 1]).unwrap();
        let (q, r) = divrem(&a, &b).unwrap();
        assert_eq!(q.coeffs(), &[4, 0, 1]);
        assert_eq!(r.coeffs(), &[15]);
    }

    #[test]
    fn all_algorithms_agree() {
        let p = 1_000_000_007;
        for &(la, lb) in &[(10usize, 3usize), (200, 60), (500, 100), (900, 450), (1000, 999)] {
            let a = seq(p, la, la as u64);
            let b = seq(p, lb, lb as u64 + 1);
            let expected = divrem_classical(&a, &b).unwrap();
            check_identity(&a, &b, &expected.0, &expected.1);
            assert_eq!(divrem_divconquer(&a, &b).unwrap(), expected, "dc {la}/{lb}");
            assert_eq!(divrem_newton(&a, &b).unwrap(), expected, "newton {la}/{lb}");
            assert_eq!(divrem(&a, &b).unwrap(), expected);
            assert_eq!(div(&a, &b).unwrap(), expected.0);
        }
    }

    #[test]
    fn short_dividend_is_its_own_remainder() {
        let a = ModPoly::from_coeffs(5, &[1, 2]).unwrap();
        let b = ModPoly::from_coeffs(5, &[1, 2, 3]).unwrap();
        let (q, r) = divrem(&a, &b).unwrap();
        assert!(q.is_zero());
        assert_eq!(r, a);
    }

    #[test]
    fn zero_divisor() {
        let a = ModPoly::from_coeffs(5, &[1]).unwrap();
        let z = ModPoly::new(5).unwrap();
        assert_eq!(divrem(&a, &z), Err(ErrorKind::DivisionByZero));
        assert_eq!(div_newton(&a, &z), Err(ErrorKind::DivisionByZero));
        assert_eq!(inv_series(&z, 4), Err(ErrorKind::DivisionByZero));
    }

    #[test]
    fn series_inverse() {
        let p = 65_537;
        let b = seq(p, 40, 9);
        let mut b = b.clone();
        b.set_coeff(0, 3).unwrap();
        for n in [1usize, 2, 7, 64, 100] {
            let y = inv_series(&b, n).unwrap();
            assert!(y.len() <= n);
            assert!(mul_trunc(&b, &y, n).unwrap().is_one(), "n = {n}");
        }
        let mut c = b.clone();
        c.set_coeff(0, 0).unwrap();
        assert_eq!(inv_series(&c, 5), Err(ErrorKind::NotCoprime));
    }

    #[test]
    fn series_division() {
        let p = 101;
        let a = seq(p, 12, 1);
        let mut b = seq(p, 9, 2);
        b.set_coeff(0, 1).unwrap();
        let q = div_series(&a, &b, 10).unwrap();
        let mut a10 = a.clone();
        a10.truncate(10);
        assert_eq!(mul_trunc(&q, &b, 10).unwrap(), a10);
    }

    #[test]
    fn power_of_x_plus_one_mod_x2_plus_1() {
        let a = ModPoly::from_coeffs(7, &[1, 1]).unwrap();
        let f = ModPoly::from_coeffs(7, &[1, 0, 1]).unwrap();
        // (x + 1)^2 = 2x, so the tenth power is 32x = 4x
        assert_eq!(powmod(&a, 10, &f).unwrap().coeffs(), &[0, 4]);
        assert!(powmod(&a, 0, &f).unwrap().is_one());
    }

    #[test]
    fn long_base_powers_match_repeated_products() {
        let p = 0xffff_ffff_ffff_ffc5;
        let f = seq(p, 3 * KS_CUTOFF, 21);
        let a = seq(p, 2 * KS_CUTOFF, 22);
        let base = rem(&a, &f).unwrap();
        assert!(base.len() >= KS_CUTOFF);
        let mut expected = base.clone();
        for e in 2..=13u64 {
            expected = mulmod(&expected, &base, &f).unwrap();
            assert_eq!(powmod_unsigned(&a, e, &f).unwrap(), expected, "e = {e}");
        }
    }

    #[test]
    fn negative_exponent_inverts_first() {
        let p = 13;
        let f = ModPoly::from_coeffs(p, &[2, 0, 0, 1]).unwrap();
        let a = ModPoly::from_coeffs(p, &[3, 1]).unwrap();
        let inv3 = powmod(&a, -3, &f).unwrap();
        let pos3 = powmod(&a, 3, &f).unwrap();
        assert!(mulmod(&inv3, &pos3, &f).unwrap().is_one());

        let g = ModPoly::from_coeffs(p, &[1, 1]).unwrap();
        let h = ModPoly::from_coeffs(p, &[12, 0, 1]).unwrap();
        assert_eq!(powmod(&g, -1, &h), Err(ErrorKind::NotCoprime));
    }
}
