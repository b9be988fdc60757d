//! Dense polynomials over Z/pZ for a word-size modulus.

use zpoly_mpn::ulong::{addmod, invmod, negmod, submod};
use zpoly_mpn::{preinv_for, ErrorKind, PreInv, Result};

/// A polynomial with coefficients in `[0, p)`.
///
/// Coefficients are stored low degree first and the vector is kept
/// normalised: it never ends in a zero coefficient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModPoly {
    pub(crate) coeffs: Vec<u64>,
    p: u64,
    pre: PreInv,
}

impl ModPoly {
    /// The zero polynomial modulo `p`.
    pub fn new(p: u64) -> Result<Self> {
        if p < 2 {
            return Err(ErrorKind::ModulusInvalid);
        }
        Ok(Self {
            coeffs: Vec::new(),
            p,
            pre: preinv_for(p)?,
        })
    }

    /// The zero polynomial with room for `alloc` coefficients.
    pub fn with_capacity(p: u64, alloc: usize) -> Result<Self> {
        let mut poly = Self::new(p)?;
        poly.coeffs.try_reserve(alloc)?;
        Ok(poly)
    }

    /// Build from coefficients (low degree first), reducing each.
    pub fn from_coeffs(p: u64, coeffs: &[u64]) -> Result<Self> {
        let mut poly = Self::new(p)?;
        poly.coeffs.try_reserve(coeffs.len())?;
        poly.coeffs.extend(coeffs.iter().map(|&c| poly.pre.reduce(c)));
        poly.normalise();
        Ok(poly)
    }

    /// Build from signed coefficients, reducing each.
    pub fn from_signed(p: u64, coeffs: &[i64]) -> Result<Self> {
        let mut poly = Self::new(p)?;
        poly.coeffs.try_reserve(coeffs.len())?;
        for &c in coeffs {
            let r = poly.pre.reduce(c.unsigned_abs());
            poly.coeffs.push(if c < 0 { negmod(r, p) } else { r });
        }
        poly.normalise();
        Ok(poly)
    }

    /// Zero polynomial with the same modulus.
    #[must_use]
    pub fn zero_like(&self) -> Self {
        Self {
            coeffs: Vec::new(),
            p: self.p,
            pre: self.pre,
        }
    }

    /// `c * x^k` with the same modulus.
    pub fn monomial_like(&self, c: u64, k: usize) -> Result<Self> {
        let mut m = self.zero_like();
        m.set_coeff(k, c)?;
        Ok(m)
    }

    /// Wrap already reduced coefficients.
    pub(crate) fn from_raw(&self, coeffs: Vec<u64>) -> Self {
        let mut poly = Self {
            coeffs,
            p: self.p,
            pre: self.pre,
        };
        poly.normalise();
        poly
    }

    #[must_use]
    pub fn modulus(&self) -> u64 {
        self.p
    }

    #[must_use]
    pub fn preinv(&self) -> &PreInv {
        &self.pre
    }

    /// Number of coefficients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    #[must_use]
    pub fn is_one(&self) -> bool {
        self.coeffs == [1]
    }

    /// Degree, `None` for the zero polynomial.
    #[must_use]
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    /// Leading coefficient, zero for the zero polynomial.
    #[must_use]
    pub fn lead(&self) -> u64 {
        self.coeffs.last().copied().unwrap_or(0)
    }

    /// Coefficient `i`; zero past the length.
    #[must_use]
    pub fn coeff(&self, i: usize) -> u64 {
        self.coeffs.get(i).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn coeffs(&self) -> &[u64] {
        &self.coeffs
    }

    /// Set coefficient `i` to `c mod p`, extending with zeros if needed.
    pub fn set_coeff(&mut self, i: usize, c: u64) -> Result<()> {
        let c = self.pre.reduce(c);
        if i >= self.coeffs.len() {
            if c == 0 {
                return Ok(());
            }
            let end = i.checked_add(1).ok_or(ErrorKind::LengthOverflow)?;
            self.fit_length(end)?;
            self.coeffs.resize(end, 0);
        }
        self.coeffs[i] = c;
        self.normalise();
        Ok(())
    }

    /// Make room for `len` coefficients.
    pub fn fit_length(&mut self, len: usize) -> Result<()> {
        let extra = len.saturating_sub(self.coeffs.len());
        self.coeffs.try_reserve(extra)?;
        Ok(())
    }

    /// Drop trailing zero coefficients.
    pub fn normalise(&mut self) {
        let len = self.coeffs.iter().rposition(|&c| c != 0).map_or(0, |i| i + 1);
        self.coeffs.truncate(len);
    }

    /// Keep only the first `n` coefficients.
    pub fn truncate(&mut self, n: usize) {
        if n < self.coeffs.len() {
            self.coeffs.truncate(n);
            self.normalise();
        }
    }

    pub fn set_zero(&mut self) {
        self.coeffs.clear();
    }

    /// Coefficients reversed over a window of `m`: coefficient `i` of the
    /// result is coefficient `m - 1 - i` of `self`.
    pub fn reverse(&self, m: usize) -> Result<Self> {
        let mut coeffs = Vec::new();
        coeffs.try_reserve_exact(m)?;
        coeffs.extend((0..m).map(|i| self.coeff(m - 1 - i)));
        Ok(self.from_raw(coeffs))
    }

    /// In-place form of [`ModPoly::reverse`].
    pub fn reverse_in_place(&mut self, m: usize) -> Result<()> {
        self.fit_length(m)?;
        self.coeffs.resize(m.max(self.coeffs.len()), 0);
        self.coeffs.truncate(m);
        self.coeffs.reverse();
        self.normalise();
        Ok(())
    }

    /// Multiply by `x^k`.
    pub fn shift_left(&mut self, k: usize) -> Result<()> {
        if self.is_zero() || k == 0 {
            return Ok(());
        }
        let len = self.coeffs.len().checked_add(k).ok_or(ErrorKind::LengthOverflow)?;
        self.fit_length(len)?;
        self.coeffs.splice(0..0, std::iter::repeat(0).take(k));
        Ok(())
    }

    /// Divide by `x^k`, discarding the low coefficients.
    pub fn shift_right(&mut self, k: usize) {
        let k = k.min(self.coeffs.len());
        self.coeffs.drain(..k);
    }

    /// `self + other`.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let mut r = self.clone();
        r.add_assign(other);
        r
    }

    /// `self - other`.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        let mut r = self.clone();
        r.sub_assign(other);
        r
    }

    /// `-self`.
    #[must_use]
    pub fn neg(&self) -> Self {
        let mut r = self.clone();
        r.neg_assign();
        r
    }

    pub fn add_assign(&mut self, other: &Self) {
        debug_assert_eq!(self.p, other.p);
        if other.len() > self.len() {
            self.coeffs.resize(other.len(), 0);
        }
        for (x, &y) in self.coeffs.iter_mut().zip(&other.coeffs) {
            *x = addmod(*x, y, self.p);
        }
        self.normalise();
    }

    pub fn sub_assign(&mut self, other: &Self) {
        debug_assert_eq!(self.p, other.p);
        if other.len() > self.len() {
            self.coeffs.resize(other.len(), 0);
        }
        for (x, &y) in self.coeffs.iter_mut().zip(&other.coeffs) {
            *x = submod(*x, y, self.p);
        }
        self.normalise();
    }

    pub fn neg_assign(&mut self) {
        let p = self.p;
        for x in &mut self.coeffs {
            *x = negmod(*x, p);
        }
    }

    /// `c * self`.
    #[must_use]
    pub fn scalar_mul(&self, c: u64) -> Self {
        let mut r = self.clone();
        r.scalar_mul_assign(c);
        r
    }

    pub fn scalar_mul_assign(&mut self, c: u64) {
        let c = self.pre.reduce(c);
        let pre = self.pre;
        for x in &mut self.coeffs {
            *x = pre.mulmod(*x, c);
        }
        self.normalise();
    }

    /// Scale so the leading coefficient is one. The zero polynomial stays zero.
    pub fn make_monic(&mut self) -> Result<()> {
        let lead = self.lead();
        if lead > 1 {
            let inv = invmod(lead, self.p)?;
            self.scalar_mul_assign(inv);
        }
        Ok(())
    }

    /// Monic associate.
    pub fn monic(&self) -> Result<Self> {
        let mut r = self.clone();
        r.make_monic()?;
        Ok(r)
    }

    /// Value at `x` by Horner's rule.
    #[must_use]
    pub fn evaluate(&self, x: u64) -> u64 {
        let x = self.pre.reduce(x);
        self.coeffs
            .iter()
            .rev()
            .fold(0, |acc, &c| addmod(self.pre.mulmod(acc, x), c, self.p))
    }

    /// Whether both operands share a modulus.
    pub(crate) fn check_same_modulus(&self, other: &Self) -> Result<()> {
        if self.p == other.p {
            Ok(())
        } else {
            Err(ErrorKind::ModulusInvalid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulus_must_be_at_least_two() {
        assert_eq!(ModPoly::new(1), Err(ErrorKind::ModulusInvalid));
        assert_eq!(ModPoly::new(0), Err(ErrorKind::ModulusInvalid));
        assert!(ModPoly::new(2).is_ok());
    }

    #[test]
    fn coefficients_are_reduced_and_normalised() {
        let f = ModPoly::from_coeffs(7, &[9, 14, 3, 7]).unwrap();
        assert_eq!(f.coeffs(), &[2, 0, 3]);
        assert_eq!(f.degree(), Some(2));
        let g = ModPoly::from_signed(7, &[-1, 0, -7]).unwrap();
        assert_eq!(g.coeffs(), &[6]);
    }

    #[test]
    fn set_coeff_extends_and_normalises() {
        let mut f = ModPoly::new(5).unwrap();
        f.set_coeff(3, 2).unwrap();
        assert_eq!(f.coeffs(), &[0, 0, 0, 2]);
        f.set_coeff(3, 5).unwrap();
        assert!(f.is_zero());
        f.set_coeff(10, 0).unwrap();
        assert!(f.is_zero());
        f.set_coeff(usize::MAX, 0).unwrap();
        assert_eq!(f.set_coeff(usize::MAX, 3), Err(ErrorKind::LengthOverflow));
        assert!(f.is_zero());
        assert_eq!(f.monomial_like(1, usize::MAX), Err(ErrorKind::LengthOverflow));
    }

    #[test]
    fn arithmetic_wraps() {
        let f = ModPoly::from_coeffs(17, &[16, 1, 5]).unwrap();
        let g = ModPoly::from_coeffs(17, &[2, 16, 12]).unwrap();
        assert_eq!(f.add(&g).coeffs(), &[1]);
        assert_eq!(f.sub(&f).len(), 0);
        assert_eq!(f.neg().add(&f).len(), 0);
        assert_eq!(f.scalar_mul(2).coeffs(), &[15, 2, 10]);
        assert_eq!(f.evaluate(1), 5);
    }

    #[test]
    fn reverse_reads_zeros_past_length() {
        let f = ModPoly::from_coeffs(11, &[1, 2, 3]).unwrap();
        assert_eq!(f.reverse(5).unwrap().coeffs(), &[0, 0, 3, 2, 1]);
        assert_eq!(f.reverse(2).unwrap().coeffs(), &[2, 1]);
        let mut g = f.clone();
        g.reverse_in_place(5).unwrap();
        assert_eq!(g, f.reverse(5).unwrap());
        g.reverse_in_place(5).unwrap();
        assert_eq!(g, f);
        assert_eq!(f.reverse(usize::MAX), Err(ErrorKind::AllocFailed));
        assert_eq!(g.reverse_in_place(usize::MAX), Err(ErrorKind::AllocFailed));
        assert_eq!(g, f);
    }

    #[test]
    fn shifts() {
        let mut f = ModPoly::from_coeffs(11, &[1, 2]).unwrap();
        f.shift_left(2).unwrap();
        assert_eq!(f.coeffs(), &[0, 0, 1, 2]);
        assert_eq!(f.shift_left(usize::MAX), Err(ErrorKind::LengthOverflow));
        assert_eq!(f.coeffs(), &[0, 0, 1, 2]);
        f.shift_right(3);
        assert_eq!(f.coeffs(), &[2]);
        f.shift_right(4);
        assert!(f.is_zero());
    }

    #[test]
    fn monic() {
        let mut f = ModPoly::from_coeffs(7, &[1, 3]).unwrap();
        f.make_monic().unwrap();
        assert_eq!(f.coeffs(), &[5, 1]);
        let mut z = ModPoly::new(7).unwrap();
        z.make_monic().unwrap();
        assert!(z.is_zero());
    }
}
