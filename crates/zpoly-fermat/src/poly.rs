//! Polynomials with coefficients in Z/(B^n + 1).
//!
//! Coefficients live in one contiguous buffer of fixed-size slots. The
//! polynomial keeps a table mapping each position to its slot, plus a few
//! spare slots: a butterfly writes its outputs into spare slots and then
//! swaps table entries, so transforms move offsets rather than limbs.

use zpoly_mpn::arith::is_zero;
use zpoly_mpn::{ErrorKind, Result};

use crate::ring;

/// Spare slots reserved for butterfly outputs.
pub(crate) const SPARE_SLOTS: usize = 2;

/// A polynomial of length up to `2^depth` over Z/(B^n + 1).
#[derive(Debug, Clone)]
pub struct FermatPoly {
    pub(crate) depth: u32,
    pub(crate) n: usize,
    pub(crate) stride: usize,
    pub(crate) length: usize,
    pub(crate) data: Vec<u64>,
    pub(crate) coeffs: Vec<usize>,
    pub(crate) spare: Vec<usize>,
    pub(crate) tmp: Vec<u64>,
}

impl FermatPoly {
    /// Allocate a zero polynomial with room for `2^depth` coefficients of
    /// `n + 1` limbs each.
    pub fn new(depth: u32, n: usize) -> Result<Self> {
        if n == 0 || depth >= usize::BITS - 1 {
            return Err(ErrorKind::RingTooSmall { n, depth });
        }
        let size = 1usize << depth;
        let stride = n + 1;
        let slots = size + SPARE_SLOTS;
        let total = slots.checked_mul(stride).ok_or(ErrorKind::LengthOverflow)?;
        let mut data = Vec::new();
        data.try_reserve_exact(total)?;
        data.resize(total, 0);
        Ok(Self {
            depth,
            n,
            stride,
            length: 0,
            data,
            coeffs: (0..size).collect(),
            spare: (size..slots).collect(),
            tmp: vec![0; ring::scratch_len(n)],
        })
    }

    /// Log2 of the coefficient capacity.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Current limb width: coefficients are taken modulo `B^n + 1`.
    #[must_use]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Coefficient capacity, `2^depth`.
    #[must_use]
    pub fn size(&self) -> usize {
        1 << self.depth
    }

    /// Number of meaningful coefficients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Set the length; coefficients exposed by growing are zeroed.
    pub fn set_length(&mut self, len: usize) {
        assert!(len <= self.size(), "length {len} exceeds capacity");
        for i in self.length..len {
            self.coeff_mut(i).fill(0);
        }
        self.length = len;
    }

    /// Set every coefficient to zero and the length to zero.
    pub fn zero(&mut self) {
        self.data.fill(0);
        self.length = 0;
    }

    /// Coefficient `i` as `n + 1` limbs.
    #[must_use]
    pub fn coeff(&self, i: usize) -> &[u64] {
        let o = self.coeffs[i] * self.stride;
        &self.data[o..=o + self.n]
    }

    /// Mutable coefficient `i` as `n + 1` limbs.
    pub fn coeff_mut(&mut self, i: usize) -> &mut [u64] {
        let o = self.coeffs[i] * self.stride;
        &mut self.data[o..=o + self.n]
    }

    /// Overwrite coefficient `i` with the non-negative value `limbs`
    /// (at most `n` limbs).
    pub fn set_coeff(&mut self, i: usize, limbs: &[u64]) {
        let c = self.coeff_mut(i);
        c.fill(0);
        c[..limbs.len()].copy_from_slice(limbs);
    }

    /// Canonicalise the first `len()` coefficients.
    pub fn normalise(&mut self) {
        for i in 0..self.length {
            ring::normalise(self.coeff_mut(i));
        }
    }

    /// Coefficient-wise `self += other`; the length becomes the larger one.
    pub fn add_assign(&mut self, other: &Self) {
        debug_assert_eq!(self.n, other.n);
        let len = self.length.max(other.length);
        self.set_length(len);
        for i in 0..other.length {
            ring::add_assign(self.coeff_mut(i), other.coeff(i));
        }
    }

    /// Coefficient-wise `self -= other`; the length becomes the larger one.
    pub fn sub_assign(&mut self, other: &Self) {
        debug_assert_eq!(self.n, other.n);
        let len = self.length.max(other.length);
        self.set_length(len);
        for i in 0..other.length {
            ring::sub_assign(self.coeff_mut(i), other.coeff(i));
        }
    }

    /// Pointwise product of the first `count` coefficients, normalised.
    pub fn pointwise_mul(&mut self, other: &Self, count: usize) -> Result<()> {
        debug_assert_eq!(self.n, other.n);
        let Self {
            data,
            coeffs,
            stride,
            n,
            tmp,
            ..
        } = self;
        for i in 0..count {
            let o = coeffs[i] * *stride;
            let r = &mut data[o..=o + *n];
            ring::mul_assign(r, other.coeff(i), tmp)?;
            ring::normalise(r);
        }
        self.length = count;
        Ok(())
    }

    /// Pointwise square of the first `count` coefficients, normalised.
    pub fn pointwise_sqr(&mut self, count: usize) -> Result<()> {
        let Self {
            data,
            coeffs,
            stride,
            n,
            tmp,
            ..
        } = self;
        for i in 0..count {
            let o = coeffs[i] * *stride;
            let r = &mut data[o..=o + *n];
            ring::sqr_assign(r, tmp)?;
            ring::normalise(r);
        }
        self.length = count;
        Ok(())
    }

    /// Divide the first `len()` coefficients by `2^depth`, undoing the
    /// scaling left by an inverse transform.
    pub fn rescale(&mut self) {
        let depth = self.depth as usize;
        let Self {
            data,
            coeffs,
            stride,
            n,
            tmp,
            length,
            ..
        } = self;
        for &slot in &coeffs[..*length] {
            let o = slot * *stride;
            let r = &mut data[o..=o + *n];
            ring::div_2exp_assign(r, depth, tmp);
            ring::normalise(r);
        }
    }

    /// Shrink the working width to `new_n` limbs. Every current coefficient
    /// must already fit below `B^new_n`.
    pub fn decrease_n(&mut self, new_n: usize) -> Result<()> {
        if new_n == 0 || new_n > self.n {
            return Err(ErrorKind::RingTooSmall {
                n: new_n,
                depth: self.depth,
            });
        }
        for i in 0..self.length {
            let c = self.coeff_mut(i);
            ring::normalise(c);
            if !is_zero(&c[new_n..]) {
                return Err(ErrorKind::TruncationLoses);
            }
        }
        self.n = new_n;
        Ok(())
    }
}

/// Two read views and one write view into distinct slots of `data`.
///
/// `a` and `b` may coincide; neither may equal `out`.
pub(crate) fn split3(
    data: &mut [u64],
    stride: usize,
    width: usize,
    a: usize,
    b: usize,
    out: usize,
) -> (&[u64], &[u64], &mut [u64]) {
    debug_assert!(a != out && b != out);
    let (lo, rest) = data.split_at_mut(out * stride);
    let (o, hi) = rest.split_at_mut(stride);
    let (lo, hi) = (&*lo, &*hi);
    (
        pick(lo, hi, stride, width, out, a),
        pick(lo, hi, stride, width, out, b),
        &mut o[..width],
    )
}

fn pick<'a>(lo: &'a [u64], hi: &'a [u64], stride: usize, width: usize, out: usize, s: usize) -> &'a [u64] {
    if s < out {
        &lo[s * stride..s * stride + width]
    } else {
        let off = (s - out - 1) * stride;
        &hi[off..off + width]
    }
}
