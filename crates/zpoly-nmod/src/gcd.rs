//! Euclidean GCD, extended GCD, inversion modulo a polynomial and the
//! resultant.

use zpoly_mpn::ulong::{invmod as invmod_ui, negmod, powmod};
use zpoly_mpn::{ErrorKind, Result};

use crate::div::{divrem, rem};
use crate::mul::mul;
use crate::poly::ModPoly;

/// Monic greatest common divisor. `gcd(0, 0) = 0` and `gcd(0, b)` is the
/// monic associate of `b`.
pub fn gcd(a: &ModPoly, b: &ModPoly) -> Result<ModPoly> {
    a.check_same_modulus(b)?;
    let (mut u, mut v) = if a.len() >= b.len() { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) };
    while !v.is_zero() {
        if v.len() == 1 {
            return a.monomial_like(1, 0);
        }
        let r = rem(&u, &v)?;
        u = v;
        v = r;
    }
    u.make_monic()?;
    Ok(u)
}

/// `(g, s, t)` with `g` the monic GCD and `s a + t b = g`.
pub fn xgcd(a: &ModPoly, b: &ModPoly) -> Result<(ModPoly, ModPoly, ModPoly)> {
    a.check_same_modulus(b)?;
    let (mut r0, mut r1) = (a.clone(), b.clone());
    let (mut s0, mut s1) = (a.monomial_like(1, 0)?, a.zero_like());
    let (mut t0, mut t1) = (a.zero_like(), a.monomial_like(1, 0)?);
    while !r1.is_zero() {
        let (q, r) = divrem(&r0, &r1)?;
        r0 = std::mem::replace(&mut r1, r);
        let s = s0.sub(&mul(&q, &s1)?);
        s0 = std::mem::replace(&mut s1, s);
        let t = t0.sub(&mul(&q, &t1)?);
        t0 = std::mem::replace(&mut t1, t);
    }
    if r0.is_zero() {
        return Ok((r0, a.zero_like(), a.zero_like()));
    }
    let inv = invmod_ui(r0.lead(), a.modulus())?;
    r0.scalar_mul_assign(inv);
    s0.scalar_mul_assign(inv);
    t0.scalar_mul_assign(inv);
    Ok((r0, s0, t0))
}

/// `h` with `h a = 1 mod f`.
pub fn invmod(a: &ModPoly, f: &ModPoly) -> Result<ModPoly> {
    a.check_same_modulus(f)?;
    if f.is_zero() {
        return Err(ErrorKind::DivisionByZero);
    }
    let a = rem(a, f)?;
    let (g, s, _) = xgcd(&a, f)?;
    if !g.is_one() {
        return Err(ErrorKind::NotCoprime);
    }
    rem(&s, f)
}

/// Resultant by the Euclidean remainder sequence.
///
/// Uses `res(u, v) = (-1)^(du dv) lc(v)^(du - dr) res(v, u mod v)` and
/// `res(u, c) = c^du` for a constant `c`.
pub fn resultant(a: &ModPoly, b: &ModPoly) -> Result<u64> {
    a.check_same_modulus(b)?;
    if a.is_zero() || b.is_zero() {
        return Ok(0);
    }
    let (p, pre) = (a.modulus(), *a.preinv());
    let (mut u, mut v) = (a.clone(), b.clone());
    let mut acc = pre.reduce(1);
    loop {
        let (du, dv) = (u.len() - 1, v.len() - 1);
        if dv == 0 {
            return Ok(pre.mulmod(acc, powmod(v.lead(), du as u64, &pre)));
        }
        if du == 0 {
            return Ok(pre.mulmod(acc, powmod(u.lead(), dv as u64, &pre)));
        }
        let r = rem(&u, &v)?;
        if r.is_zero() {
            return Ok(0);
        }
        let dr = r.len() - 1;
        if du % 2 == 1 && dv % 2 == 1 {
            acc = negmod(acc, p);
        }
        acc = pre.mulmod(acc, powmod(v.lead(), (du - dr) as u64, &pre));
        u = v;
        v = r;
    }
}
