//! Truncated FFT over Z/(B^n + 1).
//!
//! With `w = 64n`, `sqrt(2)` has order `4w`, so a transform of length
//! `2^depth` needs `2^depth | 4w` (and `2^(depth+1) | 4w` for the
//! negacyclic twist). Twiddles are powers of `sqrt(2)` and cost only shifts.
//!
//! Outputs are in bit-reversed order. The truncated forward transform
//! computes only the first `len` outputs from the first `nonzero` inputs; the
//! truncated inverse recovers `n` coefficients (scaled by `2^depth`) from `n`
//! outputs plus known coefficients, and can also emit output `n`. Small full
//! transforms run iteratively; everything else recurses depth-first.

use zpoly_mpn::{ErrorKind, Result};

use crate::poly::{split3, FermatPoly};
use crate::ring;

/// Transforms of at most `2^FFT_ITERATIVE_DEPTH` points run as one
/// breadth-first pass.
pub const FFT_ITERATIVE_DEPTH: u32 = 6;

/// Multiply `e` by `k` modulo `m` without overflow.
#[allow(clippy::cast_possible_truncation)]
fn mulmod(e: usize, k: usize, m: usize) -> usize {
    ((e as u128 * k as u128) % m as u128) as usize
}

/// Reverse the low `bits` bits of `j`.
fn rev(j: usize, bits: u32) -> usize {
    if bits == 0 {
        0
    } else {
        j.reverse_bits() >> (usize::BITS - bits)
    }
}

/// Whether a length-`2^depth` transform exists over width `n`.
pub fn check_ring(n: usize, depth: u32, negacyclic: bool) -> Result<()> {
    let order = 256 * n;
    let need = depth + u32::from(negacyclic);
    if n == 0 || need >= usize::BITS || order % (1usize << need) != 0 {
        return Err(ErrorKind::RingTooSmall { n, depth });
    }
    Ok(())
}

/// Borrowed working state of one transform.
struct Transform<'a> {
    data: &'a mut [u64],
    coeffs: &'a mut [usize],
    spare: &'a mut [usize],
    tmp: &'a mut [u64],
    stride: usize,
    width: usize,
    order: usize,
}

impl<'a> Transform<'a> {
    fn new(p: &'a mut FermatPoly) -> Self {
        let width = p.n + 1;
        let order = 256 * p.n;
        Self {
            data: &mut p.data,
            coeffs: &mut p.coeffs,
            spare: &mut p.spare,
            tmp: &mut p.tmp,
            stride: p.stride,
            width,
            order,
        }
    }

    /// Slot `out` gets `f(slot a, slot b)`.
    fn apply(&mut self, a: usize, b: usize, out: usize, f: impl FnOnce(&mut [u64], &[u64], &[u64], &mut [u64])) {
        let (x, y, o) = split3(self.data, self.stride, self.width, a, b, out);
        f(o, x, y, self.tmp);
    }

    /// Spare slot 0 gets `sqrt(2)^e * x[j]`.
    fn twist_into_spare(&mut self, j: usize, e: usize) {
        let (sj, t0) = (self.coeffs[j], self.spare[0]);
        self.apply(sj, sj, t0, |o, x, _, tmp| ring::mul_sqrt2exp(o, x, e, tmp));
    }

    /// Make spare slot 1 the new home of position `i`.
    fn promote_spare(&mut self, i: usize) {
        std::mem::swap(&mut self.coeffs[i], &mut self.spare[1]);
    }

    /// `(x[i], x[j]) = (x[i] + s x[j], x[i] - s x[j])`, `s = sqrt(2)^e`.
    fn butterfly(&mut self, i: usize, j: usize, e: usize) {
        let (si, sj) = (self.coeffs[i], self.coeffs[j]);
        let (t0, t1) = (self.spare[0], self.spare[1]);
        if e == 0 {
            self.apply(si, sj, t0, |o, a, b, _| ring::sub(o, a, b));
            self.apply(si, sj, t1, |o, a, b, _| ring::add(o, a, b));
            self.coeffs[i] = t1;
            self.coeffs[j] = t0;
            self.spare[0] = sj;
            self.spare[1] = si;
            return;
        }
        self.twist_into_spare(j, e);
        self.apply(si, t0, t1, |o, a, t, _| ring::add(o, a, t));
        self.apply(si, t0, sj, |o, a, t, _| ring::sub(o, a, t));
        self.promote_spare(i);
    }

    /// `(x[i], x[j]) = (x[i] + x[j], (x[i] - x[j]) / s)`, `s = sqrt(2)^e`.
    fn ibutterfly(&mut self, i: usize, j: usize, e: usize) {
        let (si, sj) = (self.coeffs[i], self.coeffs[j]);
        let (t0, t1) = (self.spare[0], self.spare[1]);
        self.apply(si, sj, t0, |o, a, b, _| ring::sub(o, a, b));
        self.apply(si, sj, t1, |o, a, b, _| ring::add(o, a, b));
        if e == 0 {
            self.coeffs[i] = t1;
            self.coeffs[j] = t0;
            self.spare[0] = sj;
            self.spare[1] = si;
            return;
        }
        let inv = self.order - e;
        self.apply(t0, t0, sj, |o, d, _, tmp| ring::mul_sqrt2exp(o, d, inv, tmp));
        self.promote_spare(i);
    }

    /// `x[i] += s x[j]`, leaving `x[j]` alone.
    fn twist_add(&mut self, i: usize, j: usize, e: usize) {
        let (si, t0, t1) = (self.coeffs[i], self.spare[0], self.spare[1]);
        self.twist_into_spare(j, e);
        self.apply(si, t0, t1, |o, a, t, _| ring::add(o, a, t));
        self.promote_spare(i);
    }

    /// `x[to] = x[from]`.
    fn copy(&mut self, from: usize, to: usize) {
        let (sf, st) = (self.coeffs[from], self.coeffs[to]);
        self.apply(sf, sf, st, |o, a, _, _| o.copy_from_slice(a));
    }

    fn zero(&mut self, i: usize) {
        let o = self.coeffs[i] * self.stride;
        self.data[o..o + self.width].fill(0);
    }

    /// Full forward transform of `2^depth` points at `start` by levels.
    fn fft_iterative(&mut self, start: usize, depth: u32, e: usize) {
        let size = 1usize << depth;
        let root = self.order >> depth;
        for k in 0..depth {
            let m = size >> k;
            let half = m / 2;
            for j in 0..(1usize << k) {
                let ej = (e + root * rev(j, k)) % self.order;
                let s = mulmod(ej, half, self.order);
                let base = start + j * m;
                for i in 0..half {
                    self.butterfly(base + i, base + half + i, s);
                }
            }
        }
    }

    /// Full inverse of [`Transform::fft_iterative`], scaled by `2^depth`.
    fn ifft_iterative(&mut self, start: usize, depth: u32, e: usize) {
        let size = 1usize << depth;
        let root = self.order >> depth;
        for k in (0..depth).rev() {
            let m = size >> k;
            let half = m / 2;
            for j in 0..(1usize << k) {
                let ej = (e + root * rev(j, k)) % self.order;
                let s = mulmod(ej, half, self.order);
                let base = start + j * m;
                for i in 0..half {
                    self.ibutterfly(base + i, base + half + i, s);
                }
            }
        }
    }

    /// First `len` outputs of the twisted transform of the `2^depth` points
    /// at `start`, of which only the first `nonzero` may be non-zero.
    fn fft_truncated(&mut self, start: usize, depth: u32, len: usize, nonzero: usize, e: usize) {
        if depth == 0 || len == 0 {
            return;
        }
        let size = 1usize << depth;
        if len == size && nonzero == size && depth <= FFT_ITERATIVE_DEPTH {
            self.fft_iterative(start, depth, e);
            return;
        }
        let half = size / 2;
        let s = mulmod(e, half, self.order);
        let e2 = (e + (self.order >> depth)) % self.order;
        let upper = len > half;
        let inner = if nonzero <= half {
            if upper {
                for i in 0..nonzero {
                    self.copy(start + i, start + half + i);
                }
            }
            nonzero
        } else {
            let over = nonzero - half;
            for i in 0..over {
                if upper {
                    self.butterfly(start + i, start + half + i, s);
                } else {
                    self.twist_add(start + i, start + half + i, s);
                }
            }
            if upper {
                for i in over..half {
                    self.copy(start + i, start + half + i);
                }
            }
            half
        };
        self.fft_truncated(start, depth - 1, len.min(half), inner, e);
        if upper {
            self.fft_truncated(start + half, depth - 1, len - half, inner, e2);
        }
    }

    /// Truncated inverse of the `2^depth` points at `start`.
    ///
    /// On entry positions `< n` hold outputs, positions in `[n, z)` hold
    /// coefficients scaled by `2^depth`, and positions `>= z` are zero
    /// coefficients. On exit positions `< n` hold scaled coefficients and,
    /// if `extra`, position `n` holds output `n`.
    fn ifft_truncated(&mut self, start: usize, depth: u32, n: usize, z: usize, extra: bool, e: usize) {
        if depth == 0 {
            if n == 0 && extra && z == 0 {
                self.zero(start);
            }
            return;
        }
        let size = 1usize << depth;
        if n == size && depth <= FFT_ITERATIVE_DEPTH {
            self.ifft_iterative(start, depth, e);
            return;
        }
        let half = size / 2;
        let s = mulmod(e, half, self.order);
        let e2 = (e + (self.order >> depth)) % self.order;

        if n >= half {
            self.ifft_truncated(start, depth - 1, half, half, false, e);
            for i in (n - half)..half {
                let (a, b) = (start + i, start + half + i);
                if half + i < z {
                    // x[b] = x[a] - s x[b]; x[a] += x[b]
                    self.twist_into_spare(b, s);
                    let (sa, sb, t0, t1) = (self.coeffs[a], self.coeffs[b], self.spare[0], self.spare[1]);
                    self.apply(sa, t0, sb, |o, u, t, _| ring::sub(o, u, t));
                    self.apply(sa, sb, t1, |o, u, v, _| ring::add(o, u, v));
                } else {
                    self.copy(a, b);
                    let (sa, t1) = (self.coeffs[a], self.spare[1]);
                    self.apply(sa, sa, t1, |o, u, v, _| ring::add(o, u, v));
                }
                self.promote_spare(a);
            }
            self.ifft_truncated(start + half, depth - 1, n - half, half, extra, e2);
            for i in 0..(n - half) {
                self.ibutterfly(start + i, start + half + i, s);
            }
        } else {
            let zz = z.min(half);
            for i in n..zz {
                let (a, b) = (start + i, start + half + i);
                let sa = self.coeffs[a];
                let t1 = self.spare[1];
                if half + i < z {
                    // x[a] = (x[a] + s x[b]) / 2
                    self.twist_into_spare(b, s);
                    let t0 = self.spare[0];
                    self.apply(sa, t0, t1, |o, u, t, _| ring::add(o, u, t));
                    self.apply(t1, t1, sa, |o, u, _, tmp| ring::div_2exp(o, u, 1, tmp));
                } else {
                    self.apply(sa, sa, t1, |o, u, _, tmp| ring::div_2exp(o, u, 1, tmp));
                    self.promote_spare(a);
                }
            }
            self.ifft_truncated(start, depth - 1, n, zz, extra, e);
            for i in 0..n {
                let (a, b) = (start + i, start + half + i);
                let sa = self.coeffs[a];
                let t1 = self.spare[1];
                // x[a] = 2 x[a] - s x[b]
                self.apply(sa, sa, t1, |o, u, v, _| ring::add(o, u, v));
                if half + i < z {
                    self.twist_into_spare(b, s);
                    let t0 = self.spare[0];
                    self.apply(t1, t0, sa, |o, u, t, _| ring::sub(o, u, t));
                } else {
                    self.promote_spare(a);
                }
            }
        }
    }
}

impl FermatPoly {
    fn twist(&self, negacyclic: bool) -> usize {
        if negacyclic {
            (256 * self.n) >> (self.depth + 1)
        } else {
            0
        }
    }

    /// Forward transform producing the first `len` outputs, treating
    /// coefficients at and past `len()` as zero. The length becomes `len`.
    pub fn fft_truncated(&mut self, len: usize, negacyclic: bool) -> Result<()> {
        check_ring(self.n, self.depth, negacyclic)?;
        let len = len.min(self.size());
        let nonzero = self.length;
        if nonzero == 0 {
            for i in 0..len {
                self.coeff_mut(i).fill(0);
            }
            self.length = len;
            return Ok(());
        }
        let e = self.twist(negacyclic);
        let depth = self.depth;
        Transform::new(self).fft_truncated(0, depth, len, nonzero, e);
        self.length = len;
        Ok(())
    }

    /// Inverse transform from `n` outputs; coefficients in `[n, nonzero)`
    /// must already be in place scaled by `2^depth`, and coefficients past
    /// `nonzero` are zero. With `extra`, output `n` is also produced.
    ///
    /// Leaves the first `n` coefficients scaled by `2^depth`; see
    /// [`FermatPoly::rescale`].
    pub fn ifft_truncated(&mut self, n: usize, nonzero: usize, extra: bool, negacyclic: bool) -> Result<()> {
        check_ring(self.n, self.depth, negacyclic)?;
        let size = self.size();
        if n > size || (extra && n == size) || nonzero < n {
            return Err(ErrorKind::LengthOverflow);
        }
        let e = self.twist(negacyclic);
        let depth = self.depth;
        Transform::new(self).ifft_truncated(0, depth, n, nonzero.min(size), extra, e);
        self.length = n + usize::from(extra);
        Ok(())
    }

    /// Full forward transform.
    pub fn fft(&mut self) -> Result<()> {
        self.fft_truncated(self.size(), false)
    }

    /// Full inverse transform followed by rescaling.
    pub fn ifft(&mut self) -> Result<()> {
        let size = self.size();
        self.ifft_truncated(size, size, false, false)?;
        self.rescale();
        Ok(())
    }

    /// Replace `self` with the first `out_len` coefficients of its cyclic
    /// convolution with `other` (lengths taken modulo `2^depth`). `other`
    /// is left transformed.
    pub fn convolve(&mut self, other: &mut Self, out_len: usize) -> Result<()> {
        self.convolve_with(Some(other), out_len, false)
    }

    /// Like [`FermatPoly::convolve`] with the negacyclic wrap `x^(2^depth) = -1`.
    pub fn convolve_negacyclic(&mut self, other: &mut Self, out_len: usize) -> Result<()> {
        self.convolve_with(Some(other), out_len, true)
    }

    /// Cyclic self-convolution with a single forward transform.
    pub fn convolve_sqr(&mut self, out_len: usize) -> Result<()> {
        self.convolve_with(None, out_len, false)
    }

    fn convolve_with(&mut self, other: Option<&mut Self>, out_len: usize, negacyclic: bool) -> Result<()> {
        let size = self.size();
        let (len1, len2) = (self.length, other.as_ref().map_or(self.length, |o| o.length));
        if len1 == 0 || len2 == 0 {
            self.length = 0;
            return Ok(());
        }
        let full = (len1 + len2 - 1).min(size);
        // Negacyclic wrap-around needs every output.
        let len = if negacyclic && len1 + len2 - 1 > size { size } else { full };
        self.fft_truncated(len, negacyclic)?;
        match other {
            Some(o) => {
                o.fft_truncated(len, negacyclic)?;
                self.pointwise_mul(o, len)?;
            }
            None => self.pointwise_sqr(len)?,
        }
        self.ifft_truncated(len, len, false, negacyclic)?;
        self.rescale();
        let keep = out_len.min(len);
        self.set_length(keep);
        tracing::trace!(depth = self.depth, n = self.n, len, "fermat convolution");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(depth: u32, n: usize, vals: &[u64]) -> FermatPoly {
        let mut p = FermatPoly::new(depth, n).unwrap();
        p.set_length(vals.len());
        for (i, &v) in vals.iter().enumerate() {
            p.set_coeff(i, &[v]);
        }
        p
    }

    fn low(p: &FermatPoly, i: usize) -> u64 {
        let mut c = p.coeff(i).to_vec();
        ring::normalise(&mut c);
        assert!(c[1..].iter().all(|&x| x == 0), "coefficient {i} too large");
        c[0]
    }

    fn schoolbook(a: &[u64], b: &[u64], size: usize, sign: i128) -> Vec<i128> {
        let mut out = vec![0i128; size];
        for (i, &x) in a.iter().enumerate() {
            for (j, &y) in b.iter().enumerate() {
                let k = i + j;
                let v = i128::from(x) * i128::from(y);
                if k < size {
                    out[k] += v;
                } else {
                    out[k - size] += sign * v;
                }
            }
        }
        out
    }

    #[test]
    fn ring_size_limits() {
        assert!(check_ring(1, 8, false).is_ok());
        assert!(check_ring(1, 9, false).is_err());
        assert!(check_ring(1, 8, true).is_err());
        assert!(check_ring(2, 9, false).is_ok());
        assert_eq!(
            FermatPoly::new(9, 1).unwrap().fft(),
            Err(ErrorKind::RingTooSmall { n: 1, depth: 9 })
        );
    }

    #[test]
    fn full_round_trip() {
        for depth in [1u32, 3, 6, 7] {
            let size = 1usize << depth;
            let vals: Vec<u64> = (0..size as u64).map(|i| i * i + 3).collect();
            let mut p = poly(depth, 2, &vals);
            p.fft().unwrap();
            p.ifft().unwrap();
            for (i, &v) in vals.iter().enumerate() {
                assert_eq!(low(&p, i), v, "depth {depth} index {i}");
            }
        }
    }

    #[test]
    fn truncated_matches_full() {
        let depth = 7;
        let vals: Vec<u64> = (0..50u64).map(|i| 7 * i + 1).collect();
        let mut full = poly(depth, 2, &vals);
        full.fft().unwrap();
        for len in [1usize, 33, 64, 65, 100, 128] {
            let mut t = poly(depth, 2, &vals);
            t.fft_truncated(len, false).unwrap();
            for i in 0..len {
                let (mut x, mut y) = (t.coeff(i).to_vec(), full.coeff(i).to_vec());
                ring::normalise(&mut x);
                ring::normalise(&mut y);
                assert_eq!(x, y, "len {len} output {i}");
            }
        }
    }

    #[test]
    fn truncated_inverse_recovers_and_extends() {
        let depth = 7;
        for n in [1usize, 20, 64, 90, 127] {
            let vals: Vec<u64> = (0..n as u64).map(|i| 3 * i + 2).collect();
            let mut full = poly(depth, 2, &vals);
            full.fft().unwrap();
            let mut t = poly(depth, 2, &vals);
            t.fft_truncated(n, false).unwrap();
            t.ifft_truncated(n, n, true, false).unwrap();
            let mut extra = t.coeff(n).to_vec();
            let mut expected = full.coeff(n).to_vec();
            ring::normalise(&mut extra);
            ring::normalise(&mut expected);
            assert_eq!(extra, expected, "extra output for n = {n}");
            t.set_length(n);
            t.rescale();
            for (i, &v) in vals.iter().enumerate() {
                assert_eq!(low(&t, i), v, "n {n} index {i}");
            }
        }
    }

    #[test]
    fn cyclic_convolution() {
        let a: Vec<u64> = (1..=40).collect();
        let b: Vec<u64> = (5..=50).map(|x| x * 3).collect();
        let mut p = poly(7, 1, &a);
        let mut q = poly(7, 1, &b);
        p.convolve(&mut q, 85).unwrap();
        let expected = schoolbook(&a, &b, 128, 1);
        assert_eq!(p.len(), 85);
        for (i, &v) in expected.iter().take(85).enumerate() {
            assert_eq!(i128::from(low(&p, i)), v, "coefficient {i}");
        }
    }

    #[test]
    fn negacyclic_wraps_with_sign() {
        let a: Vec<u64> = (1..=10).collect();
        let b: Vec<u64> = (1..=10).rev().collect();
        let mut p = poly(3, 1, &a[..8]);
        let mut q = poly(3, 1, &b[..8]);
        p.convolve_negacyclic(&mut q, 8).unwrap();
        let expected = schoolbook(&a[..8], &b[..8], 8, -1);
        for (i, &v) in expected.iter().enumerate() {
            let mut c = p.coeff(i).to_vec();
            let neg = ring::to_signed(&mut c);
            let got = if neg { -i128::from(c[0].wrapping_neg()) } else { i128::from(c[0]) };
            assert_eq!(got, v, "coefficient {i}");
        }
    }

    #[test]
    fn squaring_matches_product() {
        let a: Vec<u64> = (0..30).map(|i| 1000 + i).collect();
        let mut p = poly(6, 1, &a);
        p.convolve_sqr(59).unwrap();
        let expected = schoolbook(&a, &a, 64, 1);
        for i in 0..59 {
            assert_eq!(i128::from(low(&p, i)), expected[i]);
        }
    }
}
