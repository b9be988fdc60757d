//! Multiplication and division of every coefficient by one integer.
//!
//! Word divisors get one precomputed reciprocal per call.

use zpoly_mpn::{ErrorKind, PreInv, Result};

use crate::integer::ZInt;
use crate::poly::IntPoly;

impl IntPoly {
    fn map_coeffs(&self, extra_limbs: usize, mut f: impl FnMut(&ZInt) -> Result<ZInt>) -> Result<Self> {
        let mut r = Self::with_capacity(self.len(), self.limbs() + extra_limbs)?;
        for i in 0..self.len() {
            r.set_coeff(i, &f(&self.get_coeff(i))?)?;
        }
        Ok(r)
    }

    /// `c * self` for an unsigned word.
    pub fn scalar_mul_u64(&self, c: u64) -> Result<Self> {
        if c == 0 {
            return Ok(Self::new());
        }
        self.map_coeffs(1, |x| Ok(x.mul_u64(c)))
    }

    /// `c * self` for a signed word.
    pub fn scalar_mul_i64(&self, c: i64) -> Result<Self> {
        let mut r = self.scalar_mul_u64(c.unsigned_abs())?;
        if c < 0 {
            r.neg_in_place();
        }
        Ok(r)
    }

    /// `c * self`.
    pub fn scalar_mul(&self, c: &ZInt) -> Result<Self> {
        if c.is_zero() {
            return Ok(Self::new());
        }
        self.map_coeffs(c.magnitude().len(), |x| Ok(x * c))
    }

    /// Coefficients divided by `d`, rounding towards zero.
    pub fn scalar_tdiv_u64(&self, d: u64) -> Result<Self> {
        let pre = PreInv::new(d)?;
        self.map_coeffs(0, |x| Ok(x.tdiv_u64_preinv(&pre).0))
    }

    /// Coefficients divided by `d`, rounding towards zero.
    pub fn scalar_tdiv_i64(&self, d: i64) -> Result<Self> {
        let mut r = self.scalar_tdiv_u64(d.unsigned_abs())?;
        if d < 0 {
            r.neg_in_place();
        }
        Ok(r)
    }

    /// Coefficients divided by `d`, rounding towards zero.
    pub fn scalar_tdiv(&self, d: &ZInt) -> Result<Self> {
        if d.is_zero() {
            return Err(ErrorKind::DivisionByZero);
        }
        self.map_coeffs(0, |x| Ok(x.tdiv_qr(d)?.0))
    }

    /// Exact division of every coefficient by `d`.
    pub fn scalar_divexact_u64(&self, d: u64) -> Result<Self> {
        let pre = PreInv::new(d)?;
        self.map_coeffs(0, |x| {
            let (q, r) = x.tdiv_u64_preinv(&pre);
            debug_assert_eq!(r, 0, "inexact division");
            Ok(q)
        })
    }

    /// Exact division of every coefficient by `d`.
    pub fn scalar_divexact_i64(&self, d: i64) -> Result<Self> {
        let mut r = self.scalar_divexact_u64(d.unsigned_abs())?;
        if d < 0 {
            r.neg_in_place();
        }
        Ok(r)
    }

    /// Exact division of every coefficient by `d`.
    pub fn scalar_divexact(&self, d: &ZInt) -> Result<Self> {
        if d.is_zero() {
            return Err(ErrorKind::DivisionByZero);
        }
        if let Some(w) = d.to_u64() {
            return self.scalar_divexact_u64(w);
        }
        self.map_coeffs(0, |x| x.divexact(d))
    }

    /// `self * 2^k`.
    pub fn scalar_mul_2exp(&self, k: usize) -> Result<Self> {
        self.map_coeffs(k.div_ceil(64), |x| Ok(x.mul_2exp(k)))
    }

    /// Coefficients divided by `2^k`, rounding towards zero.
    pub fn scalar_div_2exp(&self, k: usize) -> Result<Self> {
        self.map_coeffs(0, |x| Ok(x.tdiv_2exp(k)))
    }
}
