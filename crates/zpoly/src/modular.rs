//! Reduction to word-prime polynomials and Chinese remaindering back.

use zpoly_mpn::div::mod_1;
use zpoly_mpn::ulong::{invmod, prev_prime, submod};
use zpoly_mpn::{preinv_for, ErrorKind, Result};
use zpoly_nmod::ModPoly;

use crate::constants::MODULAR_PRIME_BITS;
use crate::integer::ZInt;
use crate::poly::IntPoly;

/// Descending primes just below `2^MODULAR_PRIME_BITS`.
#[derive(Debug, Clone)]
pub struct PrimeStream {
    last: u64,
}

impl PrimeStream {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: 1u64 << MODULAR_PRIME_BITS,
        }
    }

    /// The next smaller prime.
    pub fn next_prime(&mut self) -> Result<u64> {
        self.last = prev_prime(self.last)?;
        Ok(self.last)
    }
}

impl Default for PrimeStream {
    fn default() -> Self {
        Self::new()
    }
}

impl IntPoly {
    /// Coefficients reduced into `[0, p)`.
    pub fn reduce_mod(&self, p: u64) -> Result<ModPoly> {
        if p < 2 {
            return Err(ErrorKind::ModulusInvalid);
        }
        let pre = preinv_for(p)?;
        let v = self.view();
        let coeffs: Vec<u64> = (0..v.len())
            .map(|i| {
                let r = mod_1(v.coeff_limbs(i), &pre);
                if v.is_negative(i) {
                    submod(0, r, p)
                } else {
                    r
                }
            })
            .collect();
        ModPoly::from_coeffs(p, &coeffs)
    }

    /// Lift residues to `[0, p)`, or to `[-p/2, p/2)` if `balanced`.
    pub fn lift(r: &ModPoly, balanced: bool) -> Result<Self> {
        Ok(Self::new().crt_with(&ZInt::one(), r, balanced)?.0)
    }

    /// Combine `self`, known modulo `m`, with `r` modulo the prime
    /// `p = r.modulus()` into the polynomial modulo `p m` whose
    /// coefficients lie in `[-p m / 2, p m / 2)`. Also returns whether the
    /// lift left `self` unchanged.
    pub fn crt(&self, m: &ZInt, r: &ModPoly) -> Result<(Self, bool)> {
        self.crt_with(m, r, true)
    }

    /// [`IntPoly::crt`] with coefficients in `[0, p m)`.
    pub fn crt_unsigned(&self, m: &ZInt, r: &ModPoly) -> Result<(Self, bool)> {
        self.crt_with(m, r, false)
    }

    fn crt_with(&self, m: &ZInt, r: &ModPoly, balanced: bool) -> Result<(Self, bool)> {
        if m.is_zero() || m.is_negative() {
            return Err(ErrorKind::ModulusInvalid);
        }
        let p = r.modulus();
        let pre = preinv_for(p)?;
        let m_inv = invmod(m.mod_preinv(&pre), p)?;
        let pm = m.mul_u64(p);
        let len = self.len().max(r.len());
        let mut out = Self::with_capacity(len, pm.magnitude().len())?;
        for i in 0..len {
            let c = self.get_coeff(i).crt_step(m, r.coeff(i), &pre, m_inv, &pm, balanced);
            out.set_coeff(i, &c)?;
        }
        let stable = out == *self;
        Ok((out, stable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(c: &[i64]) -> IntPoly {
        IntPoly::from_i64s(c).unwrap()
    }

    #[test]
    fn primes_descend_from_the_top() {
        let mut s = PrimeStream::new();
        let a = s.next_prime().unwrap();
        let b = s.next_prime().unwrap();
        assert!(a > b);
        assert!(a < 1 << 62 && a > 1 << 61);
        assert!(zpoly_mpn::ulong::is_prime(a) && zpoly_mpn::ulong::is_prime(b));
    }

    #[test]
    fn reduction_handles_signs() {
        let f = p(&[-1, 12, 5, -7]);
        let r = f.reduce_mod(7).unwrap();
        assert_eq!(r.coeffs(), &[6, 5, 5]);
        assert!(p(&[14, -7]).reduce_mod(7).unwrap().is_zero());
        assert_eq!(f.reduce_mod(1), Err(ErrorKind::ModulusInvalid));
    }

    #[test]
    fn crt_stabilises() {
        // 7x + 3 over 5, 7, 11
        let target = p(&[3, 7]);
        let mut h = IntPoly::new();
        let mut m = ZInt::one();
        let mut stable = Vec::new();
        for q in [5u64, 7, 11] {
            let (next, s) = h.crt(&m, &target.reduce_mod(q).unwrap()).unwrap();
            h = next;
            m = m.mul_u64(q);
            stable.push(s);
        }
        assert_eq!(h, target);
        assert_eq!(stable, vec![false, false, true]);
    }

    #[test]
    fn balanced_and_unsigned_lifts() {
        let r = ModPoly::from_coeffs(11, &[10, 1, 6]).unwrap();
        assert_eq!(IntPoly::lift(&r, true).unwrap(), p(&[-1, 1, -5]));
        assert_eq!(IntPoly::lift(&r, false).unwrap(), p(&[10, 1, 6]));
        let f = p(&[-40, 17]);
        let (u, _) = IntPoly::new().crt_unsigned(&ZInt::one(), &f.reduce_mod(101).unwrap()).unwrap();
        assert_eq!(u, p(&[61, 17]));
    }

    #[test]
    fn crt_rejects_common_factor() {
        let r = ModPoly::from_coeffs(5, &[1]).unwrap();
        assert_eq!(p(&[1]).crt(&ZInt::from(10i64), &r), Err(ErrorKind::NotCoprime));
    }
}
