//! Read-only views onto a run of coefficients.

use num_bigint::BigInt;

use zpoly_mpn::arith::bit_length;
use zpoly_mpn::Result;

use crate::integer::ZInt;
use crate::poly::IntPoly;

/// A borrowed, normalised window of an [`IntPoly`].
///
/// The view shares the owner's limb store, so it cannot outlive it or
/// observe a later mutation.
#[derive(Debug, Clone, Copy)]
pub struct IntPolyView<'a> {
    store: &'a [u64],
    length: usize,
    limbs: usize,
}

#[allow(clippy::cast_possible_wrap)]
fn header_of(slot: &[u64]) -> i64 {
    slot[0] as i64
}

impl<'a> IntPolyView<'a> {
    /// `store` holds at least `length` slots of `limbs + 1` limbs; the
    /// length is trimmed to drop high zero coefficients.
    pub(crate) fn new(store: &'a [u64], length: usize, limbs: usize) -> Self {
        let stride = limbs + 1;
        let mut length = length.min(store.len() / stride);
        while length > 0 && store[(length - 1) * stride] == 0 {
            length -= 1;
        }
        Self { store, length, limbs }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.length == 0
    }

    /// Coefficient width in limbs.
    #[must_use]
    pub fn limbs(&self) -> usize {
        self.limbs
    }

    fn slot(&self, i: usize) -> &'a [u64] {
        let stride = self.limbs + 1;
        &self.store[i * stride..(i + 1) * stride]
    }

    /// Signed header of coefficient `i`; zero past the end.
    #[must_use]
    pub fn header(&self, i: usize) -> i64 {
        if i < self.length {
            header_of(self.slot(i))
        } else {
            0
        }
    }

    /// Magnitude limbs of coefficient `i`.
    #[must_use]
    pub fn coeff_limbs(&self, i: usize) -> &'a [u64] {
        if i >= self.length {
            return &[];
        }
        let slot = self.slot(i);
        let size = usize::try_from(header_of(slot).unsigned_abs()).unwrap_or(self.limbs);
        &slot[1..=size.min(self.limbs)]
    }

    /// Whether coefficient `i` is negative.
    #[must_use]
    pub fn is_negative(&self, i: usize) -> bool {
        self.header(i) < 0
    }

    /// Coefficient `i` as a [`ZInt`].
    #[must_use]
    pub fn get_coeff(&self, i: usize) -> ZInt {
        ZInt::from_raw(self.header(i), self.coeff_limbs(i))
    }

    /// Coefficient `i` as a [`BigInt`].
    #[must_use]
    pub fn get_coeff_bigint(&self, i: usize) -> BigInt {
        self.get_coeff(i).to_bigint()
    }

    /// `(sign, bits)`: the largest coefficient bit size, with `sign = -1`
    /// iff some coefficient is negative.
    #[must_use]
    pub fn max_bits(&self) -> (i32, usize) {
        let mut sign = 1;
        let mut bits = 0;
        for i in 0..self.length {
            if self.is_negative(i) {
                sign = -1;
            }
            bits = bits.max(bit_length(self.coeff_limbs(i)));
        }
        (sign, bits)
    }

    /// The largest coefficient size in limbs.
    #[must_use]
    pub fn max_limbs(&self) -> usize {
        (0..self.length).map(|i| self.coeff_limbs(i).len()).max().unwrap_or(0)
    }

    /// Coefficients `start..start + len` as a new view (clipped to the end).
    #[must_use]
    pub fn range(&self, start: usize, len: usize) -> Self {
        let stride = self.limbs + 1;
        let start = start.min(self.length);
        let end = start.saturating_add(len).min(self.length);
        Self::new(&self.store[start * stride..end * stride], end - start, self.limbs)
    }

    /// The first `n` coefficients.
    #[must_use]
    pub fn truncated(&self, n: usize) -> Self {
        self.range(0, n)
    }

    /// Copy into an owned polynomial.
    pub fn to_poly(&self) -> Result<IntPoly> {
        let mut p = IntPoly::with_capacity(self.length, self.limbs)?;
        for i in 0..self.length {
            p.set_coeff_raw(i, self.is_negative(i), self.coeff_limbs(i))?;
        }
        Ok(p)
    }
}

impl IntPoly {
    /// Borrow the whole polynomial.
    #[must_use]
    pub fn view(&self) -> IntPolyView<'_> {
        IntPolyView::new(self.store(), self.len(), self.limbs())
    }

    /// Borrow coefficients `start..start + len`: the result represents
    /// `(self >> start) mod x^len`.
    #[must_use]
    pub fn view_range(&self, start: usize, len: usize) -> IntPolyView<'_> {
        self.view().range(start, len)
    }
}
