//! Division of integer polynomials.
//!
//! Long division over Z is exact only while the divisor's leading
//! coefficient divides the running remainder's; each routine here performs
//! steps while that holds and stops at the first step that does not, so
//! `A = Q B + R` always holds and `deg R < deg B` is guaranteed when the
//! leading coefficient of `B` is `±1`. Pseudo-division handles a general
//! divisor by scaling the dividend by a power of the leading coefficient.
//!
//! Divide-and-conquer and Newton division need a unit leading coefficient
//! and otherwise fall back to long division.

use tracing::trace;
use zpoly_mpn::{ErrorKind, Result};

use crate::integer::ZInt;
use crate::mul::mul_trunc_views;
use crate::options::MulOptions;
use crate::poly::IntPoly;

fn trim(v: &mut Vec<ZInt>) {
    while v.last().is_some_and(ZInt::is_zero) {
        v.pop();
    }
}

fn check_divisor(b: &IntPoly) -> Result<()> {
    if b.is_zero() {
        Err(ErrorKind::DivisionByZero)
    } else {
        Ok(())
    }
}

fn lead(p: &IntPoly) -> ZInt {
    p.get_coeff(p.len().saturating_sub(1))
}

fn is_unit(c: &ZInt) -> bool {
    c.magnitude() == [1]
}

/// Long division, stopping at the first inexact step.
pub fn divrem_classical(a: &IntPoly, b: &IntPoly) -> Result<(IntPoly, IntPoly)> {
    check_divisor(b)?;
    let lb = b.len();
    let bc = b.to_zints();
    let lead_b = &bc[lb - 1];
    let mut r = a.to_zints();
    let mut q = vec![ZInt::zero(); (r.len() + 1).saturating_sub(lb)];
    while r.len() >= lb {
        let top = r.len() - 1;
        let (qc, rem) = r[top].tdiv_qr(lead_b)?;
        if !rem.is_zero() {
            break;
        }
        let k = top + 1 - lb;
        for (j, c) in bc.iter().enumerate() {
            r[k + j] -= &(&qc * c);
        }
        q[k] = qc;
        trim(&mut r);
    }
    trim(&mut q);
    Ok((IntPoly::from_zints(&q)?, IntPoly::from_zints(&r)?))
}

/// Quotient of `a` by `b` when only the quotient's `len` coefficients are
/// wanted: the low coefficients of both operands that cannot reach it are
/// dropped first.
fn top_quotient(a: &IntPoly, b: &IntPoly, opts: &MulOptions) -> Result<IntPoly> {
    let m = (a.len() + 1).saturating_sub(b.len());
    let s = b.len().saturating_sub(m);
    let a = a.shift_right(s)?;
    let b = b.shift_right(s)?;
    Ok(divconquer(&a, &b, opts)?.0)
}

fn divconquer(a: &IntPoly, b: &IntPoly, opts: &MulOptions) -> Result<(IntPoly, IntPoly)> {
    let (la, lb) = (a.len(), b.len());
    if la < lb {
        return Ok((IntPoly::new(), a.clone()));
    }
    let m = la - lb + 1;
    let cutoff = opts.divconquer_cutoff.max(1);
    if m <= cutoff || lb <= cutoff {
        return divrem_classical(a, b);
    }
    let k = m / 2;
    let q_high = top_quotient(&a.shift_right(k)?, b, opts)?;
    // q_high is the exact quotient of a >> k, so every coefficient of
    // a - q_high b x^k from degree k + lb - 1 up cancels.
    let cross = mul_trunc_views(q_high.view(), b.view(), lb - 1, opts)?.shift_left(k)?;
    let r1 = a.view().truncated(k + lb - 1).to_poly()?.sub(&cross)?;
    let (q_low, r) = divconquer(&r1, b, opts)?;
    let q = q_high.shift_left(k)?.add(&q_low)?;
    Ok((q, r))
}

/// Divide-and-conquer division: the quotient is found in two halves, the
/// high half from the top coefficients alone, with the cross products on
/// the multiplication engine.
pub fn divrem_divconquer(a: &IntPoly, b: &IntPoly) -> Result<(IntPoly, IntPoly)> {
    divrem_divconquer_with(a, b, &MulOptions::default())
}

/// [`divrem_divconquer`] under explicit thresholds.
pub fn divrem_divconquer_with(a: &IntPoly, b: &IntPoly, opts: &MulOptions) -> Result<(IntPoly, IntPoly)> {
    check_divisor(b)?;
    if !is_unit(&lead(b)) {
        return divrem_classical(a, b);
    }
    divconquer(a, b, &opts.normalize())
}

/// Power series inverse of `b` modulo `x^n`; `b(0)` must be `±1`.
///
/// Newton iteration `g <- g + g (1 - b g)` doubles the precision per step.
pub fn newton_inverse(b: &IntPoly, n: usize) -> Result<IntPoly> {
    newton_inverse_with(b, n, &MulOptions::default())
}

fn newton_inverse_with(b: &IntPoly, n: usize, opts: &MulOptions) -> Result<IntPoly> {
    let b0 = b.get_coeff(0);
    if b0.is_zero() {
        return Err(ErrorKind::DivisionByZero);
    }
    if !is_unit(&b0) {
        return Err(ErrorKind::NotCoprime);
    }
    if n == 0 {
        return Ok(IntPoly::new());
    }
    let one = IntPoly::constant(&ZInt::one())?;
    let mut g = IntPoly::constant(&b0)?;
    let mut k = 1;
    while k < n {
        k = (2 * k).min(n);
        let bg = mul_trunc_views(b.view(), g.view(), k, opts)?;
        let e = one.sub(&bg)?;
        let step = mul_trunc_views(g.view(), e.view(), k, opts)?;
        g = g.add(&step)?;
        trace!(precision = k, "newton step");
    }
    Ok(g)
}

/// Quotient by reversal and a power series inverse of the reversed
/// divisor. Falls back to long division for a non-unit leading coefficient.
pub fn div_newton(a: &IntPoly, b: &IntPoly) -> Result<IntPoly> {
    div_newton_with(a, b, &MulOptions::default())
}

fn div_newton_with(a: &IntPoly, b: &IntPoly, opts: &MulOptions) -> Result<IntPoly> {
    check_divisor(b)?;
    let (la, lb) = (a.len(), b.len());
    if la < lb {
        return Ok(IntPoly::new());
    }
    if !is_unit(&lead(b)) {
        return Ok(divrem_classical(a, b)?.0);
    }
    let m = la - lb + 1;
    let a_rev = a.reverse(la)?.view().truncated(m).to_poly()?;
    let b_rev = b.reverse(lb)?;
    let inv = newton_inverse_with(&b_rev, m, opts)?;
    let q_rev = mul_trunc_views(a_rev.view(), inv.view(), m, opts)?;
    q_rev.reverse(m)
}

/// `(Q, R)` with `A = Q B + R`, choosing the algorithm by size.
pub fn divrem(a: &IntPoly, b: &IntPoly) -> Result<(IntPoly, IntPoly)> {
    divrem_with(a, b, &MulOptions::default())
}

/// [`divrem`] under explicit thresholds.
pub fn divrem_with(a: &IntPoly, b: &IntPoly, opts: &MulOptions) -> Result<(IntPoly, IntPoly)> {
    check_divisor(b)?;
    let opts = opts.normalize();
    if a.len() < b.len() {
        return Ok((IntPoly::new(), a.clone()));
    }
    if is_unit(&lead(b)) && b.len() > opts.divconquer_cutoff {
        trace!(len1 = a.len(), len2 = b.len(), "divide and conquer division");
        divconquer(a, b, &opts)
    } else {
        divrem_classical(a, b)
    }
}

/// Quotient only.
pub fn div(a: &IntPoly, b: &IntPoly) -> Result<IntPoly> {
    check_divisor(b)?;
    let opts = MulOptions::default();
    let m = (a.len() + 1).saturating_sub(b.len());
    if is_unit(&lead(b)) && m > opts.newton_cutoff {
        div_newton_with(a, b, &opts)
    } else {
        Ok(divrem_with(a, b, &opts)?.0)
    }
}

/// `Some(a / b)` if `b` divides `a` exactly, else `None`.
pub fn divides(a: &IntPoly, b: &IntPoly) -> Result<Option<IntPoly>> {
    check_divisor(b)?;
    if a.is_zero() {
        return Ok(Some(IntPoly::new()));
    }
    if a.len() < b.len() {
        return Ok(None);
    }
    let (q, r) = divrem_classical(a, b)?;
    Ok(r.is_zero().then_some(q))
}

/// `(Q, R, d)` with `lead(B)^d A = Q B + R` and `deg R < deg B`.
pub fn pseudo_divrem(a: &IntPoly, b: &IntPoly) -> Result<(IntPoly, IntPoly, usize)> {
    check_divisor(b)?;
    let lb = b.len();
    let bc = b.to_zints();
    let l = &bc[lb - 1];
    let mut r = a.to_zints();
    let mut q = vec![ZInt::zero(); (r.len() + 1).saturating_sub(lb)];
    let mut d = 0;
    while r.len() >= lb {
        let top = r.len() - 1;
        let lr = r[top].clone();
        let k = top + 1 - lb;
        for c in &mut q {
            *c *= l;
        }
        q[k] += &lr;
        for c in &mut r {
            *c *= l;
        }
        for (j, c) in bc.iter().enumerate() {
            r[k + j] -= &(&lr * c);
        }
        trim(&mut r);
        d += 1;
    }
    trim(&mut q);
    Ok((IntPoly::from_zints(&q)?, IntPoly::from_zints(&r)?, d))
}

/// Pseudo-quotient and the power `d`.
pub fn pseudo_div(a: &IntPoly, b: &IntPoly) -> Result<(IntPoly, usize)> {
    let (q, _, d) = pseudo_divrem(a, b)?;
    Ok((q, d))
}

/// Pseudo-remainder and the power `d`.
pub fn pseudo_rem(a: &IntPoly, b: &IntPoly) -> Result<(IntPoly, usize)> {
    let (_, r, d) = pseudo_divrem(a, b)?;
    Ok((r, d))
}

impl IntPoly {
    /// See [`divrem`].
    pub fn divrem(&self, b: &Self) -> Result<(Self, Self)> {
        divrem(self, b)
    }

    /// See [`div`].
    pub fn div(&self, b: &Self) -> Result<Self> {
        div(self, b)
    }

    /// See [`divides`].
    pub fn divides(&self, b: &Self) -> Result<Option<Self>> {
        divides(self, b)
    }
}
