//! Limb multiplication: schoolbook below a crossover, Karatsuba above.
//!
//! Temporaries come from the scoped scratch pool, so nothing leaks when a
//! caller unwinds.

use zpoly_memory::scratch_limbs;

use crate::arith::{add, add_assign, addmul_1, mul_1, normalized_len, sub_assign};

/// Operand length (in limbs) from which Karatsuba is used.
pub const KARATSUBA_THRESHOLD: usize = 32;

/// Schoolbook product. `r` must hold `a.len() + b.len()` limbs.
pub fn mul_basecase(r: &mut [u64], a: &[u64], b: &[u64]) {
    let n = a.len() + b.len();
    let r = &mut r[..n];
    if a.is_empty() || b.is_empty() {
        r.fill(0);
        return;
    }
    r[a.len()] = mul_1(&mut r[..a.len()], a, b[0]);
    r[a.len() + 1..].fill(0);
    for (j, &bj) in b.iter().enumerate().skip(1) {
        r[a.len() + j] = addmul_1(&mut r[j..j + a.len()], a, bj);
    }
}

/// `r = a * b`. `r` must hold `a.len() + b.len()` limbs; all of them are written.
pub fn mul(r: &mut [u64], a: &[u64], b: &[u64]) {
    let (a, b) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let n = a.len() + b.len();
    debug_assert!(r.len() >= n);
    let r = &mut r[..n];
    if b.len() < KARATSUBA_THRESHOLD {
        mul_basecase(r, a, b);
    } else if a.len() >= 2 * b.len() {
        mul_unbalanced(r, a, b);
    } else {
        mul_karatsuba(r, a, b);
    }
}

/// `r = a * a`.
pub fn sqr(r: &mut [u64], a: &[u64]) {
    mul(r, a, a);
}

/// Cut the long operand into pieces of the short one's length.
fn mul_unbalanced(r: &mut [u64], a: &[u64], b: &[u64]) {
    r.fill(0);
    let m = b.len();
    let mut tmp = scratch_limbs(2 * m);
    for (k, chunk) in a.chunks(m).enumerate() {
        let len = chunk.len() + m;
        mul(&mut tmp[..len], chunk, b);
        let carry = add_assign(&mut r[k * m..], &tmp[..len]);
        debug_assert_eq!(carry, 0);
    }
}

/// One Karatsuba level; `a.len() >= b.len() > a.len() / 2`.
fn mul_karatsuba(r: &mut [u64], a: &[u64], b: &[u64]) {
    let (n, m) = (a.len(), b.len());
    let h = m / 2;
    let (a0, a1) = a.split_at(h);
    let (b0, b1) = b.split_at(h);

    {
        let (lo, hi) = r.split_at_mut(2 * h);
        mul(lo, a0, b0);
        mul(hi, a1, b1);
    }

    // (a0 + a1)(b0 + b1); the high parts are the longer halves.
    let mut sa = scratch_limbs(n - h + 1);
    let ca = add(&mut sa[..n - h], a1, a0);
    sa[n - h] = ca;
    let mut sb = scratch_limbs(m - h + 1);
    let cb = add(&mut sb[..m - h], b1, b0);
    sb[m - h] = cb;
    let la = normalized_len(&sa);
    let lb = normalized_len(&sb);
    let mut mid = scratch_limbs(la + lb);
    mul(&mut mid, &sa[..la], &sb[..lb]);

    // The subtractions cannot underflow.
    let (z0, z2) = r.split_at(2 * h);
    let borrow = sub_assign(&mut mid, &z0[..normalized_len(z0)])
        + sub_assign(&mut mid, &z2[..normalized_len(z2)]);
    debug_assert_eq!(borrow, 0);
    let ml = normalized_len(&mid);
    let carry = add_assign(&mut r[h..], &mid[..ml]);
    debug_assert_eq!(carry, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn to_big(a: &[u64]) -> BigUint {
        let mut digits: Vec<u32> = Vec::with_capacity(a.len() * 2);
        for &x in a {
            digits.push((x & 0xffff_ffff) as u32);
            digits.push((x >> 32) as u32);
        }
        BigUint::new(digits)
    }

    fn pattern(len: usize, seed: u64) -> Vec<u64> {
        let mut x = seed;
        (0..len)
            .map(|_| {
                x = x.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
                x
            })
            .collect()
    }

    #[test]
    fn basecase_small() {
        let mut r = [0u64; 2];
        mul_basecase(&mut r, &[u64::MAX], &[u64::MAX]);
        assert_eq!(r, [1, u64::MAX - 1]);
    }

    #[test]
    fn empty_operand_gives_zero() {
        let mut r = [9u64; 3];
        mul(&mut r, &[1, 2, 3], &[]);
        assert_eq!(r, [0, 0, 0]);
    }

    #[test]
    fn karatsuba_matches_biguint() {
        for &(la, lb) in &[(40, 40), (64, 33), (100, 70), (257, 129), (300, 32)] {
            let a = pattern(la, la as u64);
            let b = pattern(lb, 7 * lb as u64 + 1);
            let mut r = vec![0u64; la + lb];
            mul(&mut r, &a, &b);
            assert_eq!(to_big(&r), to_big(&a) * to_big(&b), "{la}x{lb}");
        }
    }

    #[test]
    fn unbalanced_matches_biguint() {
        let a = pattern(500, 3);
        let b = pattern(40, 5);
        let mut r = vec![0u64; 540];
        mul(&mut r, &b, &a);
        assert_eq!(to_big(&r), to_big(&a) * to_big(&b));
    }

    #[test]
    fn all_ones_square() {
        let a = vec![u64::MAX; 80];
        let mut r = vec![0u64; 160];
        sqr(&mut r, &a);
        assert_eq!(to_big(&r), to_big(&a) * to_big(&a));
    }
}
