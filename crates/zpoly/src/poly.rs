//! Integer polynomials stored as one contiguous limb block.
//!
//! Coefficient `i` occupies limbs `i * (limbs + 1) .. (i + 1) * (limbs + 1)`:
//! a signed header whose magnitude is the number of used limbs, then the
//! magnitude limbs, least significant first. A zero coefficient has header
//! zero and its limbs are never read.

use num_bigint::BigInt;

use zpoly_mpn::arith::normalized_len;
use zpoly_mpn::{ErrorKind, Result};

use crate::integer::ZInt;

/// A polynomial with arbitrary-precision integer coefficients.
#[derive(Debug, Clone, Default)]
pub struct IntPoly {
    store: Vec<u64>,
    length: usize,
    limbs: usize,
}

/// Largest coefficient count a store may address.
fn check_slots(slots: usize, stride: usize) -> Result<usize> {
    slots
        .checked_mul(stride)
        .filter(|&n| n <= isize::MAX.unsigned_abs() / 8)
        .ok_or(ErrorKind::LengthOverflow)
}

#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn encode_header(negative: bool, size: usize) -> u64 {
    let h = size as i64;
    (if negative { -h } else { h }) as u64
}

impl IntPoly {
    /// The zero polynomial with no storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero polynomial with room for `alloc` coefficients of `limbs` limbs.
    pub fn with_capacity(alloc: usize, limbs: usize) -> Result<Self> {
        let total = check_slots(alloc, limbs + 1)?;
        let mut store = Vec::new();
        store.try_reserve_exact(total)?;
        store.resize(total, 0);
        Ok(Self { store, length: 0, limbs })
    }

    /// Polynomial with the given word coefficients, constant term first.
    pub fn from_i64s(coeffs: &[i64]) -> Result<Self> {
        let mut p = Self::with_capacity(coeffs.len(), 1)?;
        for (i, &c) in coeffs.iter().enumerate() {
            p.set_coeff_i64(i, c)?;
        }
        Ok(p)
    }

    /// Polynomial with the given coefficients, constant term first.
    pub fn from_zints(coeffs: &[ZInt]) -> Result<Self> {
        let limbs = coeffs.iter().map(|c| c.magnitude().len()).max().unwrap_or(0);
        let mut p = Self::with_capacity(coeffs.len(), limbs)?;
        for (i, c) in coeffs.iter().enumerate() {
            p.set_coeff(i, c)?;
        }
        Ok(p)
    }

    /// Polynomial with the given [`BigInt`] coefficients.
    pub fn from_bigints(coeffs: &[BigInt]) -> Result<Self> {
        let z: Vec<ZInt> = coeffs.iter().map(ZInt::from).collect();
        Self::from_zints(&z)
    }

    /// The constant polynomial `c`.
    pub fn constant(c: &ZInt) -> Result<Self> {
        Self::from_zints(std::slice::from_ref(c))
    }

    /// The monomial `c x^k`.
    pub fn monomial(c: &ZInt, k: usize) -> Result<Self> {
        let mut p = Self::with_capacity(k + 1, c.magnitude().len())?;
        p.set_coeff(k, c)?;
        Ok(p)
    }

    pub(crate) fn store(&self) -> &[u64] {
        &self.store
    }

    /// Number of coefficients; the top one is non-zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.length == 0
    }

    /// Whether this is the constant one.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.length == 1 && self.get_coeff(0).is_one()
    }

    /// Coefficient width in limbs.
    #[must_use]
    pub fn limbs(&self) -> usize {
        self.limbs
    }

    /// Coefficient slots allocated.
    #[must_use]
    pub fn alloc(&self) -> usize {
        self.store.len() / (self.limbs + 1)
    }

    fn stride(&self) -> usize {
        self.limbs + 1
    }

    fn slot(&self, i: usize) -> &[u64] {
        let s = self.stride();
        &self.store[i * s..(i + 1) * s]
    }

    fn slot_mut(&mut self, i: usize) -> &mut [u64] {
        let s = self.stride();
        &mut self.store[i * s..(i + 1) * s]
    }

    /// Guarantee room for `m` coefficients, at least doubling on growth.
    /// Existing coefficients are preserved bit for bit.
    pub fn fit_length(&mut self, m: usize) -> Result<()> {
        let alloc = self.alloc();
        if m <= alloc {
            return Ok(());
        }
        let slots = m.max(alloc.saturating_mul(2));
        let total = check_slots(slots, self.stride())
            .or_else(|_| check_slots(m, self.stride()))?;
        self.store.try_reserve_exact(total - self.store.len())?;
        self.store.resize(total, 0);
        Ok(())
    }

    /// Change the coefficient width to `w` limbs.
    ///
    /// Widening moves every coefficient to the wider stride and zeroes the
    /// new limbs. Narrowing fails with [`ErrorKind::TruncationLoses`] if a
    /// coefficient needs more than `w` limbs; the polynomial is then
    /// unchanged.
    pub fn fit_limbs(&mut self, w: usize) -> Result<()> {
        if w == self.limbs {
            return Ok(());
        }
        let (old, new) = (self.stride(), w + 1);
        let alloc = self.alloc();
        if w > self.limbs {
            let total = check_slots(alloc, new)?;
            self.store.try_reserve_exact(total - self.store.len())?;
            self.store.resize(total, 0);
            for i in (0..alloc).rev() {
                self.store.copy_within(i * old..(i + 1) * old, i * new);
                self.store[i * new + old..(i + 1) * new].fill(0);
            }
        } else {
            if (0..self.length).any(|i| self.header(i).unsigned_abs() > w as u64) {
                return Err(ErrorKind::TruncationLoses);
            }
            for i in 0..alloc {
                self.store.copy_within(i * old..i * old + new, i * new);
            }
            self.store.truncate(alloc * new);
        }
        self.limbs = w;
        Ok(())
    }

    /// Widen to at least `w` limbs.
    pub(crate) fn ensure_limbs(&mut self, w: usize) -> Result<()> {
        if w > self.limbs {
            self.fit_limbs(w)?;
        }
        Ok(())
    }

    /// Drop high zero coefficients.
    pub fn normalise(&mut self) {
        while self.length > 0 && self.slot(self.length - 1)[0] == 0 {
            self.length -= 1;
        }
    }

    /// Keep at most the first `m` coefficients.
    pub fn truncate(&mut self, m: usize) {
        self.length = self.length.min(m);
        self.normalise();
    }

    /// Set every coefficient to zero.
    pub fn zero(&mut self) {
        self.length = 0;
    }

    /// Signed header of coefficient `i`; zero past the end.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn header(&self, i: usize) -> i64 {
        if i < self.length {
            self.slot(i)[0] as i64
        } else {
            0
        }
    }

    /// Coefficient `i`.
    #[must_use]
    pub fn get_coeff(&self, i: usize) -> ZInt {
        self.view().get_coeff(i)
    }

    /// Coefficient `i` copied out to a [`BigInt`].
    #[must_use]
    pub fn get_coeff_bigint(&self, i: usize) -> BigInt {
        self.get_coeff(i).to_bigint()
    }

    /// Low limb of `|c_i|`.
    #[must_use]
    pub fn get_coeff_u64(&self, i: usize) -> u64 {
        self.view().coeff_limbs(i).first().copied().unwrap_or(0)
    }

    /// Low limb of `c_i` with its sign, wrapping.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn get_coeff_i64(&self, i: usize) -> i64 {
        let lo = self.get_coeff_u64(i) as i64;
        if self.header(i) < 0 {
            lo.wrapping_neg()
        } else {
            lo
        }
    }

    /// Set coefficient `i` from a sign and magnitude limbs.
    ///
    /// Writing past the end zero-fills the gap and extends the length;
    /// writing zero to the top coefficient normalises. The width grows if
    /// the value needs it.
    pub fn set_coeff_raw(&mut self, i: usize, negative: bool, mag: &[u64]) -> Result<()> {
        let mag = &mag[..normalized_len(mag)];
        if i >= self.length {
            if mag.is_empty() {
                return Ok(());
            }
            let end = i.checked_add(1).ok_or(ErrorKind::LengthOverflow)?;
            self.ensure_limbs(mag.len())?;
            self.fit_length(end)?;
            for j in self.length..i {
                self.slot_mut(j)[0] = 0;
            }
            self.length = end;
        } else {
            self.ensure_limbs(mag.len())?;
        }
        let slot = self.slot_mut(i);
        slot[0] = encode_header(negative && !mag.is_empty(), mag.len());
        slot[1..=mag.len()].copy_from_slice(mag);
        if mag.is_empty() && i + 1 == self.length {
            self.normalise();
        }
        Ok(())
    }

    /// Set coefficient `i`.
    pub fn set_coeff(&mut self, i: usize, c: &ZInt) -> Result<()> {
        self.set_coeff_raw(i, c.is_negative(), c.magnitude())
    }

    /// Set coefficient `i` from a [`BigInt`].
    pub fn set_coeff_bigint(&mut self, i: usize, c: &BigInt) -> Result<()> {
        self.set_coeff(i, &ZInt::from(c))
    }

    /// Set coefficient `i` to an unsigned word.
    pub fn set_coeff_u64(&mut self, i: usize, c: u64) -> Result<()> {
        self.set_coeff_raw(i, false, &[c])
    }

    /// Set coefficient `i` to a signed word.
    pub fn set_coeff_i64(&mut self, i: usize, c: i64) -> Result<()> {
        self.set_coeff_raw(i, c < 0, &[c.unsigned_abs()])
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub(crate) fn flip_sign(&mut self, i: usize) {
        let h = &mut self.slot_mut(i)[0];
        *h = (*h as i64).wrapping_neg() as u64;
    }

    /// `c_i += v`.
    pub(crate) fn add_to_coeff(&mut self, i: usize, v: &ZInt) -> Result<()> {
        if v.is_zero() {
            return Ok(());
        }
        let sum = &self.get_coeff(i) + v;
        self.set_coeff(i, &sum)
    }

    /// `self * x^k`.
    pub fn shift_left(&self, k: usize) -> Result<Self> {
        let mut r = self.clone();
        r.shift_left_in_place(k)?;
        Ok(r)
    }

    /// In-place `self * x^k`.
    pub fn shift_left_in_place(&mut self, k: usize) -> Result<()> {
        if self.length == 0 || k == 0 {
            return Ok(());
        }
        let len = self.length.checked_add(k).ok_or(ErrorKind::LengthOverflow)?;
        self.fit_length(len)?;
        let s = self.stride();
        self.store.copy_within(0..self.length * s, k * s);
        for j in 0..k {
            self.slot_mut(j)[0] = 0;
        }
        self.length = len;
        Ok(())
    }

    /// `self` without its low `k` coefficients.
    pub fn shift_right(&self, k: usize) -> Result<Self> {
        self.view_range(k, self.length.saturating_sub(k)).to_poly()
    }

    /// In-place version of [`IntPoly::shift_right`].
    pub fn shift_right_in_place(&mut self, k: usize) {
        if k >= self.length {
            self.length = 0;
            return;
        }
        let s = self.stride();
        self.store.copy_within(k * s..self.length * s, 0);
        self.length -= k;
    }

    /// The first `m` coefficients in reverse order, reading zeros past the
    /// end.
    pub fn reverse(&self, m: usize) -> Result<Self> {
        let mut r = Self::with_capacity(m.min(self.length), self.limbs)?;
        let v = self.view();
        for i in 0..m.min(self.length) {
            r.set_coeff_raw(m - 1 - i, v.is_negative(i), v.coeff_limbs(i))?;
        }
        Ok(r)
    }

    /// In-place version of [`IntPoly::reverse`].
    pub fn reverse_in_place(&mut self, m: usize) -> Result<()> {
        if m > self.length {
            self.fit_length(m)?;
            for j in self.length..m {
                self.slot_mut(j)[0] = 0;
            }
        }
        let s = self.stride();
        for i in 0..m / 2 {
            let (lo, hi) = self.store.split_at_mut((m - 1 - i) * s);
            lo[i * s..(i + 1) * s].swap_with_slice(&mut hi[..s]);
        }
        self.length = m;
        self.normalise();
        Ok(())
    }

    /// See [`crate::IntPolyView::max_bits`].
    #[must_use]
    pub fn max_bits(&self) -> (i32, usize) {
        self.view().max_bits()
    }

    /// The largest coefficient size in limbs.
    #[must_use]
    pub fn max_limbs(&self) -> usize {
        self.view().max_limbs()
    }

    /// Coefficients as [`ZInt`]s, constant term first.
    #[must_use]
    pub fn to_zints(&self) -> Vec<ZInt> {
        (0..self.length).map(|i| self.get_coeff(i)).collect()
    }

    /// Sign of the leading coefficient.
    #[must_use]
    pub fn lead_is_negative(&self) -> bool {
        self.length > 0 && self.header(self.length - 1) < 0
    }
}

impl PartialEq for IntPoly {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.view(), other.view());
        a.len() == b.len() && (0..a.len()).all(|i| a.header(i) == b.header(i) && a.coeff_limbs(i) == b.coeff_limbs(i))
    }
}

impl Eq for IntPoly {}
