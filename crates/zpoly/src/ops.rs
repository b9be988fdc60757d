//! Coefficient-wise arithmetic and whole-polynomial scans.

use zpoly_mpn::{ErrorKind, Result};

use crate::integer::ZInt;
use crate::poly::IntPoly;
use crate::view::IntPolyView;

fn combine(a: IntPolyView<'_>, b: IntPolyView<'_>, negate_b: bool) -> Result<IntPoly> {
    let len = a.len().max(b.len());
    let mut r = IntPoly::with_capacity(len, a.max_limbs().max(b.max_limbs()) + 1)?;
    for i in 0..len {
        let (x, y) = (a.get_coeff(i), b.get_coeff(i));
        let c = if negate_b { &x - &y } else { &x + &y };
        r.set_coeff(i, &c)?;
    }
    Ok(r)
}

/// `a + b` on views.
pub fn add_views(a: IntPolyView<'_>, b: IntPolyView<'_>) -> Result<IntPoly> {
    combine(a, b, false)
}

/// `a - b` on views.
pub fn sub_views(a: IntPolyView<'_>, b: IntPolyView<'_>) -> Result<IntPoly> {
    combine(a, b, true)
}

impl IntPoly {
    /// `self + other`.
    pub fn add(&self, other: &Self) -> Result<Self> {
        add_views(self.view(), other.view())
    }

    /// `self - other`.
    pub fn sub(&self, other: &Self) -> Result<Self> {
        sub_views(self.view(), other.view())
    }

    /// `-self`.
    pub fn neg(&self) -> Result<Self> {
        let mut r = self.clone();
        r.neg_in_place();
        Ok(r)
    }

    /// Negate every coefficient.
    pub fn neg_in_place(&mut self) {
        for i in 0..self.len() {
            self.flip_sign(i);
        }
    }

    /// Non-negative GCD of the coefficients; zero for the zero polynomial.
    #[must_use]
    pub fn content(&self) -> ZInt {
        let mut g = ZInt::zero();
        for i in (0..self.len()).rev() {
            g = g.gcd(&self.get_coeff(i));
            if g.is_one() {
                break;
            }
        }
        g
    }

    /// `self / content(self)`, with the sign of the leading coefficient kept.
    pub fn primitive_part(&self) -> Result<Self> {
        let g = self.content();
        if g.is_zero() || g.is_one() {
            return Ok(self.clone());
        }
        self.scalar_divexact(&g)
    }

    /// Floor of the Euclidean norm `sqrt(sum c_i^2)`.
    pub fn norm2(&self) -> Result<ZInt> {
        let mut acc = ZInt::zero();
        for c in self.to_zints() {
            acc += &(&c * &c);
        }
        acc.sqrt()
    }

    /// Largest coefficient magnitude.
    #[must_use]
    pub fn height(&self) -> ZInt {
        self.to_zints().iter().map(ZInt::abs).max().unwrap_or_default()
    }

    /// `self(x)` by Horner's rule.
    #[must_use]
    pub fn evaluate(&self, x: &ZInt) -> ZInt {
        let mut acc = ZInt::zero();
        for i in (0..self.len()).rev() {
            acc = &(&acc * x) + &self.get_coeff(i);
        }
        acc
    }

    /// Formal derivative.
    pub fn derivative(&self) -> Result<Self> {
        if self.len() <= 1 {
            return Ok(Self::new());
        }
        let mut r = Self::with_capacity(self.len() - 1, self.limbs() + 1)?;
        for i in 1..self.len() {
            let k = u64::try_from(i).map_err(|_| ErrorKind::LengthOverflow)?;
            r.set_coeff(i - 1, &self.get_coeff(i).mul_u64(k))?;
        }
        Ok(r)
    }
}
