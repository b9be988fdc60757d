//! Bit fields at arbitrary offsets of a limb array.
//!
//! These are the bit-packer and bit-unpacker under every Kronecker and
//! Fermat-ring packing routine: values are written to, added to, subtracted
//! from, or read out of a field starting at any bit position.

use crate::arith::{add_1, add_with_carry, sub_1, sub_with_borrow};

/// OR a word into `dst` at bit `offset`. The target bits must be clear.
#[inline]
pub fn or_word(dst: &mut [u64], offset: usize, value: u64) {
    let i = offset / 64;
    let s = offset % 64;
    if let Some(d) = dst.get_mut(i) {
        *d |= value << s;
    }
    if s != 0 {
        if let Some(d) = dst.get_mut(i + 1) {
            *d |= value >> (64 - s);
        }
    }
}

/// Read a word-or-narrower field of `bits` bits at bit `offset`.
///
/// Bits past the end of `src` read as zero.
#[inline]
#[must_use]
pub fn read_word(src: &[u64], offset: usize, bits: usize) -> u64 {
    debug_assert!(bits <= 64);
    let i = offset / 64;
    let s = offset % 64;
    let lo = src.get(i).copied().unwrap_or(0);
    let mut w = lo >> s;
    if s != 0 && s + bits > 64 {
        w |= src.get(i + 1).copied().unwrap_or(0) << (64 - s);
    }
    if bits < 64 {
        w &= (1u64 << bits) - 1;
    }
    w
}

/// Read a field of `bits` bits at bit `offset` into `dst` (`ceil(bits / 64)` limbs).
pub fn read_field(dst: &mut [u64], src: &[u64], offset: usize, bits: usize) {
    let limbs = bits.div_ceil(64);
    for (k, d) in dst[..limbs].iter_mut().enumerate() {
        let take = (bits - 64 * k).min(64);
        *d = read_word(src, offset + 64 * k, take);
    }
}

/// `dst += val << offset`; returns non-zero if anything spilled past `dst`.
pub fn add_shifted(dst: &mut [u64], val: &[u64], offset: usize) -> u64 {
    let start = offset / 64;
    let s = offset % 64;
    let words = val.len() + usize::from(s != 0);
    let mut carry = 0;
    let mut spill = 0;
    let mut prev = 0u64;
    for k in 0..words {
        let v = val.get(k).copied().unwrap_or(0);
        let w = if s == 0 { v } else { (v << s) | (prev >> (64 - s)) };
        prev = v;
        match dst.get_mut(start + k) {
            Some(d) => {
                (*d, carry) = add_with_carry(*d, w, carry);
            }
            None => {
                spill |= w | carry;
                carry = 0;
            }
        }
    }
    let tail = start + words;
    if carry != 0 {
        carry = if tail < dst.len() {
            add_1(&mut dst[tail..], carry)
        } else {
            carry
        };
    }
    carry | u64::from(spill != 0)
}

/// `dst -= val << offset` in two's complement; returns the borrow out of `dst`.
pub fn sub_shifted(dst: &mut [u64], val: &[u64], offset: usize) -> u64 {
    let start = offset / 64;
    let s = offset % 64;
    let words = val.len() + usize::from(s != 0);
    let mut borrow = 0;
    let mut prev = 0u64;
    for k in 0..words {
        let v = val.get(k).copied().unwrap_or(0);
        let w = if s == 0 { v } else { (v << s) | (prev >> (64 - s)) };
        prev = v;
        if let Some(d) = dst.get_mut(start + k) {
            (*d, borrow) = sub_with_borrow(*d, w, borrow);
        }
    }
    let tail = start + words;
    if borrow != 0 && tail < dst.len() {
        borrow = sub_1(&mut dst[tail..], borrow);
    }
    borrow
}

/// Pack words of at most `bits` bits each into consecutive fields of `dst`.
///
/// `dst` is cleared first and must hold `ceil(src.len() * bits / 64)` limbs.
pub fn pack_words(dst: &mut [u64], src: &[u64], bits: usize) {
    dst.fill(0);
    for (i, &x) in src.iter().enumerate() {
        debug_assert!(bits >= 64 || x >> bits == 0);
        or_word(dst, i * bits, x);
    }
}

/// Unpack consecutive `bits`-bit fields (`bits <= 64`) into words.
pub fn unpack_words(dst: &mut [u64], src: &[u64], bits: usize) {
    for (i, d) in dst.iter_mut().enumerate() {
        *d = read_word(src, i * bits, bits);
    }
}
