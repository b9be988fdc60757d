//! Large integer multiplication through a Fermat-ring convolution.
//!
//! Operands are cut into pieces of `k` limbs, treated as polynomials, and
//! convolved; carries are resolved when the coefficients are added back at
//! offsets of `k` limbs. Below [`SS_INT_THRESHOLD`] the limb multiplier's
//! Karatsuba is faster.

use zpoly_mpn::arith::normalized_len;
use zpoly_mpn::bits::add_shifted;
use zpoly_mpn::ulong::clog2;
use zpoly_mpn::{mul, Result};

use crate::params::round_n;
use crate::poly::FermatPoly;

/// Shorter-operand size in limbs from which the convolution is used.
pub const SS_INT_THRESHOLD: usize = 1500;

/// `r = a * b`. `r` must hold `a.len() + b.len()` limbs; all are written.
///
/// Errors from the convolution path (allocation, ring shape) are returned
/// rather than retried with Karatsuba.
pub fn mul_limbs(r: &mut [u64], a: &[u64], b: &[u64]) -> Result<()> {
    if a.len().min(b.len()) < SS_INT_THRESHOLD {
        mul::mul(r, a, b);
        Ok(())
    } else {
        mul_fft(r, a, b)
    }
}

/// `r = a^2`. `r` must hold `2 * a.len()` limbs.
pub fn sqr_limbs(r: &mut [u64], a: &[u64]) -> Result<()> {
    if a.len() < SS_INT_THRESHOLD {
        mul::sqr(r, a);
        Ok(())
    } else {
        sqr_fft(r, a)
    }
}

/// Piece size, depth and ring width for operands of `la >= lb` limbs.
fn shape(la: usize, lb: usize) -> (usize, u32, usize) {
    let depth = ((clog2(la + lb) + 3) / 2).max(2);
    let k = la.div_ceil(1 << (depth - 1)).max(1);
    let pieces_b = lb.div_ceil(k).max(1);
    let coeff_bits = 128 * k + clog2(pieces_b) as usize + 1;
    (k, depth, round_n(coeff_bits.div_ceil(64), depth, false))
}

fn split(p: &mut FermatPoly, a: &[u64], k: usize) {
    let chunks = a.chunks(k);
    p.set_length(chunks.len());
    for (i, c) in chunks.enumerate() {
        p.set_coeff(i, c);
    }
}

fn reassemble(r: &mut [u64], p: &FermatPoly, k: usize) {
    r.fill(0);
    let n = p.n();
    for i in 0..p.len() {
        let c = &p.coeff(i)[..n];
        let spill = add_shifted(r, &c[..normalized_len(c)], 64 * k * i);
        debug_assert_eq!(spill, 0);
    }
}

/// Convolution product regardless of size.
pub fn mul_fft(r: &mut [u64], a: &[u64], b: &[u64]) -> Result<()> {
    let (a, b) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let r = &mut r[..a.len() + b.len()];
    if b.is_empty() {
        r.fill(0);
        return Ok(());
    }
    let (k, depth, n) = shape(a.len(), b.len());
    let mut p = FermatPoly::new(depth, n)?;
    let mut q = FermatPoly::new(depth, n)?;
    split(&mut p, a, k);
    split(&mut q, b, k);
    let out = p.len() + q.len() - 1;
    p.convolve(&mut q, out)?;
    reassemble(r, &p, k);
    Ok(())
}

/// Convolution square regardless of size.
pub fn sqr_fft(r: &mut [u64], a: &[u64]) -> Result<()> {
    let r = &mut r[..2 * a.len()];
    if a.is_empty() {
        return Ok(());
    }
    let (k, depth, n) = shape(a.len(), a.len());
    let mut p = FermatPoly::new(depth, n)?;
    split(&mut p, a, k);
    let out = 2 * p.len() - 1;
    p.convolve_sqr(out)?;
    reassemble(r, &p, k);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operand(len: usize, seed: u64) -> Vec<u64> {
        let mut x = seed;
        (0..len)
            .map(|_| {
                x = x.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
                x
            })
            .collect()
    }

    #[test]
    fn fft_product_matches_karatsuba() {
        for &(la, lb) in &[(1usize, 1usize), (7, 3), (100, 100), (257, 31), (600, 599)] {
            let a = operand(la, la as u64);
            let b = operand(lb, 3 * lb as u64 + 1);
            let mut expected = vec![0; la + lb];
            mul::mul(&mut expected, &a, &b);
            let mut got = vec![0; la + lb];
            mul_fft(&mut got, &a, &b).unwrap();
            assert_eq!(got, expected, "{la} x {lb}");
            let mut swapped = vec![0; la + lb];
            mul_fft(&mut swapped, &b, &a).unwrap();
            assert_eq!(swapped, expected);
        }
    }

    #[test]
    fn fft_square_matches_karatsuba() {
        let a = operand(333, 9);
        let mut expected = vec![0; 666];
        mul::sqr(&mut expected, &a);
        let mut got = vec![0; 666];
        sqr_fft(&mut got, &a).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn all_ones_carry_through() {
        let a = vec![u64::MAX; 200];
        let mut expected = vec![0; 400];
        mul::mul(&mut expected, &a, &a);
        let mut got = vec![0; 400];
        mul_fft(&mut got, &a, &a).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn dispatch_below_threshold() {
        let a = operand(10, 1);
        let b = operand(12, 2);
        let mut x = vec![0; 22];
        let mut y = vec![0; 22];
        mul_limbs(&mut x, &a, &b).unwrap();
        mul::mul(&mut y, &a, &b);
        assert_eq!(x, y);
        sqr_limbs(&mut x[..20], &a).unwrap();
        mul::sqr(&mut y[..20], &a);
        assert_eq!(x[..20], y[..20]);
    }

    #[test]
    fn dispatch_above_threshold_returns_result() {
        let a = operand(SS_INT_THRESHOLD, 5);
        let b = operand(SS_INT_THRESHOLD + 17, 6);
        let mut expected = vec![0; a.len() + b.len()];
        mul::mul(&mut expected, &a, &b);
        let mut got = vec![0; a.len() + b.len()];
        assert_eq!(mul_limbs(&mut got, &a, &b), Ok(()));
        assert_eq!(got, expected);
        let mut sq = vec![0; 2 * a.len()];
        mul::sqr(&mut expected[..2 * a.len()], &a);
        assert_eq!(sqr_limbs(&mut sq, &a), Ok(()));
        assert_eq!(sq, expected[..2 * a.len()]);
    }
}
