//! Portable limb arithmetic.
//!
//! All slices are little-endian `u64` limbs. Functions that write a result
//! into `r` while reading `a`/`b` need `r` distinct from the inputs; the
//! `_assign` forms cover the in-place cases.

use std::cmp::Ordering;

/// Add with carry: a + b + carry -> (sum, `new_carry`)
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn add_with_carry(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let sum = u128::from(a) + u128::from(b) + u128::from(carry);
    (sum as u64, (sum >> 64) as u64)
}

/// Subtract with borrow: a - b - borrow -> (diff, `new_borrow`)
#[inline]
#[must_use]
pub fn sub_with_borrow(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let (d1, b1) = a.overflowing_sub(b);
    let (d2, b2) = d1.overflowing_sub(borrow);
    (d2, u64::from(b1 | b2))
}

/// Multiply: a * b -> (low, high)
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn mul_wide(a: u64, b: u64) -> (u64, u64) {
    let prod = u128::from(a) * u128::from(b);
    (prod as u64, (prod >> 64) as u64)
}

/// Add a single limb into `data`, returning the carry out of the top.
pub fn add_1(data: &mut [u64], x: u64) -> u64 {
    let mut carry = x;
    for limb in data.iter_mut() {
        if carry == 0 {
            break;
        }
        let (sum, c) = limb.overflowing_add(carry);
        *limb = sum;
        carry = u64::from(c);
    }
    carry
}

/// Subtract a single limb from `data`, returning the borrow out of the top.
pub fn sub_1(data: &mut [u64], x: u64) -> u64 {
    let mut borrow = x;
    for limb in data.iter_mut() {
        if borrow == 0 {
            break;
        }
        let (diff, b) = limb.overflowing_sub(borrow);
        *limb = diff;
        borrow = u64::from(b);
    }
    borrow
}

/// `r = a + b` where `a.len() >= b.len()` and `r.len() == a.len()`.
pub fn add(r: &mut [u64], a: &[u64], b: &[u64]) -> u64 {
    debug_assert!(a.len() >= b.len() && r.len() == a.len());
    let mut carry = 0;
    for i in 0..b.len() {
        (r[i], carry) = add_with_carry(a[i], b[i], carry);
    }
    r[b.len()..].copy_from_slice(&a[b.len()..]);
    add_1(&mut r[b.len()..], carry)
}

/// `r = a - b` where `a.len() >= b.len()` and `r.len() == a.len()`.
pub fn sub(r: &mut [u64], a: &[u64], b: &[u64]) -> u64 {
    debug_assert!(a.len() >= b.len() && r.len() == a.len());
    let mut borrow = 0;
    for i in 0..b.len() {
        (r[i], borrow) = sub_with_borrow(a[i], b[i], borrow);
    }
    r[b.len()..].copy_from_slice(&a[b.len()..]);
    sub_1(&mut r[b.len()..], borrow)
}

/// `r += b` with `b.len() <= r.len()`, returning the carry out of `r`.
pub fn add_assign(r: &mut [u64], b: &[u64]) -> u64 {
    debug_assert!(b.len() <= r.len());
    let mut carry = 0;
    for (x, &y) in r.iter_mut().zip(b) {
        (*x, carry) = add_with_carry(*x, y, carry);
    }
    add_1(&mut r[b.len()..], carry)
}

/// `r -= b` with `b.len() <= r.len()`, returning the borrow out of `r`.
pub fn sub_assign(r: &mut [u64], b: &[u64]) -> u64 {
    debug_assert!(b.len() <= r.len());
    let mut borrow = 0;
    for (x, &y) in r.iter_mut().zip(b) {
        (*x, borrow) = sub_with_borrow(*x, y, borrow);
    }
    sub_1(&mut r[b.len()..], borrow)
}

/// `r = b - r` over equal lengths, returning the borrow.
pub fn rsub_assign(r: &mut [u64], b: &[u64]) -> u64 {
    debug_assert!(b.len() == r.len());
    let mut borrow = 0;
    for (x, &y) in r.iter_mut().zip(b) {
        (*x, borrow) = sub_with_borrow(y, *x, borrow);
    }
    borrow
}

/// `r = a * m`, returning the high limb.
pub fn mul_1(r: &mut [u64], a: &[u64], m: u64) -> u64 {
    debug_assert!(r.len() >= a.len());
    let mut carry = 0;
    for (x, &y) in r.iter_mut().zip(a) {
        let (lo, hi) = mul_wide(y, m);
        let (s, c) = lo.overflowing_add(carry);
        *x = s;
        carry = hi + u64::from(c);
    }
    carry
}

/// `r *= m` in place, returning the high limb.
pub fn mul_1_assign(r: &mut [u64], m: u64) -> u64 {
    let mut carry = 0;
    for x in r.iter_mut() {
        let (lo, hi) = mul_wide(*x, m);
        let (s, c) = lo.overflowing_add(carry);
        *x = s;
        carry = hi + u64::from(c);
    }
    carry
}

/// `r[..a.len()] += a * m`, returning the carry limb.
#[allow(clippy::cast_possible_truncation)]
pub fn addmul_1(r: &mut [u64], a: &[u64], m: u64) -> u64 {
    debug_assert!(r.len() >= a.len());
    let mut carry = 0;
    for (x, &y) in r.iter_mut().zip(a) {
        let t = u128::from(y) * u128::from(m) + u128::from(*x) + u128::from(carry);
        *x = t as u64;
        carry = (t >> 64) as u64;
    }
    carry
}

/// `r[..a.len()] -= a * m`, returning the borrow limb.
pub fn submul_1(r: &mut [u64], a: &[u64], m: u64) -> u64 {
    debug_assert!(r.len() >= a.len());
    let mut borrow = 0;
    for (x, &y) in r.iter_mut().zip(a) {
        let (lo, hi) = mul_wide(y, m);
        let (s1, b1) = x.overflowing_sub(lo);
        let (s2, b2) = s1.overflowing_sub(borrow);
        *x = s2;
        borrow = hi + u64::from(b1) + u64::from(b2);
    }
    borrow
}

/// `r = a << s` for `s < 64`, returning the bits shifted out.
pub fn lshift(r: &mut [u64], a: &[u64], s: u32) -> u64 {
    debug_assert!(s < 64 && r.len() >= a.len());
    if s == 0 {
        r[..a.len()].copy_from_slice(a);
        return 0;
    }
    let mut carry = 0;
    for (x, &y) in r.iter_mut().zip(a) {
        *x = (y << s) | carry;
        carry = y >> (64 - s);
    }
    carry
}

/// `r <<= s` in place for `s < 64`, returning the bits shifted out.
pub fn lshift_assign(r: &mut [u64], s: u32) -> u64 {
    debug_assert!(s < 64);
    if s == 0 {
        return 0;
    }
    let mut carry = 0;
    for x in r.iter_mut() {
        let y = *x;
        *x = (y << s) | carry;
        carry = y >> (64 - s);
    }
    carry
}

/// `r = a >> s` for `s < 64`, returning the bits shifted out (in the top of the word).
pub fn rshift(r: &mut [u64], a: &[u64], s: u32) -> u64 {
    debug_assert!(s < 64 && r.len() >= a.len());
    if s == 0 {
        r[..a.len()].copy_from_slice(a);
        return 0;
    }
    let mut carry = 0;
    for (x, &y) in r[..a.len()].iter_mut().zip(a).rev() {
        *x = (y >> s) | carry;
        carry = y << (64 - s);
    }
    carry
}

/// `r >>= s` in place for `s < 64`, returning the bits shifted out.
pub fn rshift_assign(r: &mut [u64], s: u32) -> u64 {
    debug_assert!(s < 64);
    if s == 0 {
        return 0;
    }
    let mut carry = 0;
    for x in r.iter_mut().rev() {
        let y = *x;
        *x = (y >> s) | carry;
        carry = y << (64 - s);
    }
    carry
}

/// Two's-complement negation in place. Returns whether the value was non-zero.
pub fn negate(r: &mut [u64]) -> bool {
    let mut nonzero = false;
    let mut carry = 1u64;
    for x in r.iter_mut() {
        nonzero |= *x != 0;
        let (s, c) = (!*x).overflowing_add(carry);
        *x = s;
        carry = u64::from(c);
    }
    nonzero
}

/// Compare two equal-length limb spans.
#[must_use]
pub fn cmp(a: &[u64], b: &[u64]) -> Ordering {
    debug_assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b).rev() {
        match x.cmp(y) {
            Ordering::Equal => {}
            ord => return ord,
        }
    }
    Ordering::Equal
}

/// Compare two limb spans of possibly different length by value.
#[must_use]
pub fn cmp_values(a: &[u64], b: &[u64]) -> Ordering {
    let la = normalized_len(a);
    let lb = normalized_len(b);
    la.cmp(&lb).then_with(|| cmp(&a[..la], &b[..lb]))
}

/// Length without high zero limbs.
#[must_use]
pub fn normalized_len(a: &[u64]) -> usize {
    a.iter().rposition(|&x| x != 0).map_or(0, |i| i + 1)
}

/// Whether every limb is zero.
#[must_use]
pub fn is_zero(a: &[u64]) -> bool {
    a.iter().all(|&x| x == 0)
}

/// Number of significant bits.
#[must_use]
pub fn bit_length(a: &[u64]) -> usize {
    let n = normalized_len(a);
    if n == 0 {
        0
    } else {
        64 * n - a[n - 1].leading_zeros() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_carry() {
        assert_eq!(add_with_carry(u64::MAX, 1, 0), (0, 1));
        assert_eq!(add_with_carry(u64::MAX, u64::MAX, 1), (u64::MAX, 1));
        assert_eq!(add_with_carry(100, 200, 0), (300, 0));
    }

    #[test]
    fn sub_borrow() {
        assert_eq!(sub_with_borrow(0, 1, 0), (u64::MAX, 1));
        assert_eq!(sub_with_borrow(0, 0, 1), (u64::MAX, 1));
        assert_eq!(sub_with_borrow(500, 200, 0), (300, 0));
        assert_eq!(sub_with_borrow(1, u64::MAX, 0), (2, 1));
    }

    #[test]
    fn multiply_wide() {
        assert_eq!(mul_wide(u64::MAX, 2), (u64::MAX - 1, 1));
        assert_eq!(mul_wide(u64::MAX, u64::MAX), (1, u64::MAX - 1));
        assert_eq!(mul_wide(1u64 << 32, 1u64 << 32), (0, 1));
    }

    #[test]
    fn add_1_propagates() {
        let mut data = vec![u64::MAX, u64::MAX, 0];
        assert_eq!(add_1(&mut data, 1), 0);
        assert_eq!(data, vec![0, 0, 1]);
        let mut all = vec![u64::MAX; 3];
        assert_eq!(add_1(&mut all, 1), 1);
        let mut empty: Vec<u64> = vec![];
        assert_eq!(add_1(&mut empty, 42), 42);
    }

    #[test]
    fn sub_1_propagates() {
        let mut data = vec![0, 1, 0];
        assert_eq!(sub_1(&mut data, 1), 0);
        assert_eq!(data, vec![u64::MAX, 0, 0]);
        let mut zero = vec![0, 0];
        assert_eq!(sub_1(&mut zero, 1), 1);
        assert_eq!(zero, vec![u64::MAX, u64::MAX]);
    }

    #[test]
    fn add_and_sub_unequal_lengths() {
        let a = [u64::MAX, u64::MAX, 5];
        let b = [1];
        let mut r = [0; 3];
        assert_eq!(add(&mut r, &a, &b), 0);
        assert_eq!(r, [0, 0, 6]);
        let mut back = [0; 3];
        assert_eq!(sub(&mut back, &r, &b), 0);
        assert_eq!(back, a);
    }

    #[test]
    fn rsub_assign_reverses_operands() {
        let mut r = [3, 0];
        let b = [10, 1];
        assert_eq!(rsub_assign(&mut r, &b), 0);
        assert_eq!(r, [7, 1]);
    }

    #[test]
    fn mul_1_and_addmul_1() {
        let a = [u64::MAX, 1];
        let mut r = [0; 2];
        let hi = mul_1(&mut r, &a, 2);
        assert_eq!(r, [u64::MAX - 1, 3]);
        assert_eq!(hi, 0);
        let mut acc = [1, 0, 0];
        let c = addmul_1(&mut acc, &a, 2);
        assert_eq!(&acc[..2], &[u64::MAX, 3]);
        assert_eq!(c, 0);
    }

    #[test]
    fn submul_1_undoes_addmul_1() {
        let a = [0x1234_5678_9abc_def0, 0xffff_0000_ffff_0000];
        let mut acc = [7, 8, 9];
        let c = addmul_1(&mut acc, &a, 0xdead_beef);
        acc[2] += c;
        let b = submul_1(&mut acc, &a, 0xdead_beef);
        acc[2] -= b;
        assert_eq!(acc, [7, 8, 9]);
    }

    #[test]
    fn shifts_round_trip() {
        let a = [0x8000_0000_0000_0001, 0x1];
        let mut r = [0; 2];
        let out = lshift(&mut r, &a, 1);
        assert_eq!(r, [2, 3]);
        assert_eq!(out, 0);
        let mut back = [0; 2];
        rshift(&mut back, &r, 1);
        assert_eq!(back, a);
        let mut inplace = r;
        rshift_assign(&mut inplace, 1);
        assert_eq!(inplace, a);
        lshift_assign(&mut inplace, 1);
        assert_eq!(inplace, r);
    }

    #[test]
    fn negate_twos_complement() {
        let mut r = [1, 0];
        assert!(negate(&mut r));
        assert_eq!(r, [u64::MAX, u64::MAX]);
        let mut z = [0, 0];
        assert!(!negate(&mut z));
        assert_eq!(z, [0, 0]);
    }

    #[test]
    fn compare_and_lengths() {
        assert_eq!(cmp(&[1, 2], &[2, 1]), Ordering::Greater);
        assert_eq!(cmp_values(&[5, 0, 0], &[5]), Ordering::Equal);
        assert_eq!(cmp_values(&[0, 1], &[u64::MAX]), Ordering::Greater);
        assert_eq!(normalized_len(&[1, 0, 0]), 1);
        assert_eq!(normalized_len(&[0, 0]), 0);
        assert!(is_zero(&[0, 0]));
        assert_eq!(bit_length(&[0, 1]), 65);
        assert_eq!(bit_length(&[]), 0);
    }
}
