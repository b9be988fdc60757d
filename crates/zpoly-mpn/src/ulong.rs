//! Word-size number theory: modular inverses and powers, primality,
//! prime generation, and random words.

use rand::Rng;

use crate::div::PreInv;
use crate::error::{ErrorKind, Result};

/// Number of significant bits of `x`.
#[inline]
#[must_use]
pub fn bits(x: u64) -> u32 {
    64 - x.leading_zeros()
}

/// `ceil(log2(x))` for `x >= 1`, and 0 for `x <= 1`.
#[inline]
#[must_use]
pub fn clog2(x: usize) -> u32 {
    if x <= 1 {
        0
    } else {
        usize::BITS - (x - 1).leading_zeros()
    }
}

/// Greatest common divisor.
#[must_use]
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Inverse of `a` modulo `m`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
pub fn invmod(a: u64, m: u64) -> Result<u64> {
    if m == 0 {
        return Err(ErrorKind::DivisionByZero);
    }
    let (mut r0, mut r1) = (i128::from(m), i128::from(a % m));
    let (mut s0, mut s1) = (0i128, 1i128);
    while r1 != 0 {
        let q = r0 / r1;
        (r0, r1) = (r1, r0 - q * r1);
        (s0, s1) = (s1, s0 - q * s1);
    }
    if r0 != 1 {
        return if m == 1 { Ok(0) } else { Err(ErrorKind::NotCoprime) };
    }
    Ok(s0.rem_euclid(i128::from(m)) as u64)
}

/// `a^e mod d` by left-to-right binary exponentiation.
#[must_use]
pub fn powmod(a: u64, mut e: u64, pre: &PreInv) -> u64 {
    let mut base = pre.reduce(a);
    let mut acc = pre.reduce(1);
    while e != 0 {
        if e & 1 == 1 {
            acc = pre.mulmod(acc, base);
        }
        base = pre.mulmod(base, base);
        e >>= 1;
    }
    acc
}

/// `a + b mod p` for reduced operands.
#[inline]
#[must_use]
pub fn addmod(a: u64, b: u64, p: u64) -> u64 {
    let (s, c) = a.overflowing_add(b);
    if c || s >= p {
        s.wrapping_sub(p)
    } else {
        s
    }
}

/// `a - b mod p` for reduced operands.
#[inline]
#[must_use]
pub fn submod(a: u64, b: u64, p: u64) -> u64 {
    if a >= b {
        a - b
    } else {
        a.wrapping_sub(b).wrapping_add(p)
    }
}

/// `-a mod p` for reduced `a`.
#[inline]
#[must_use]
pub fn negmod(a: u64, p: u64) -> u64 {
    if a == 0 {
        0
    } else {
        p - a
    }
}

/// Deterministic Miller–Rabin for all 64-bit inputs.
#[must_use]
pub fn is_prime(n: u64) -> bool {
    const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
    if n < 2 {
        return false;
    }
    for &p in &WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }
    let Ok(pre) = PreInv::new(n) else {
        return false;
    };
    let s = (n - 1).trailing_zeros();
    let d = (n - 1) >> s;
    'witness: for &a in &WITNESSES {
        let mut x = powmod(a, d, &pre);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = pre.mulmod(x, x);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Smallest prime strictly greater than `n`.
pub fn next_prime(n: u64) -> Result<u64> {
    let mut c = n.checked_add(1).ok_or(ErrorKind::ModulusInvalid)?;
    loop {
        if is_prime(c) {
            return Ok(c);
        }
        c = c.checked_add(1).ok_or(ErrorKind::ModulusInvalid)?;
    }
}

/// Largest prime strictly smaller than `n`.
pub fn prev_prime(n: u64) -> Result<u64> {
    let mut c = n.checked_sub(1).ok_or(ErrorKind::ModulusInvalid)?;
    while c >= 2 {
        if is_prime(c) {
            return Ok(c);
        }
        c -= 1;
    }
    Err(ErrorKind::ModulusInvalid)
}

/// A uniformly random word of at most `bits` bits; zero bits gives zero.
pub fn random_bits<R: Rng + ?Sized>(rng: &mut R, bits: u32) -> u64 {
    match bits {
        0 => 0,
        b if b >= 64 => rng.random::<u64>(),
        b => rng.random::<u64>() >> (64 - b),
    }
}

/// A random prime of exactly `bits` bits (`2 <= bits <= 64`).
pub fn random_prime<R: Rng + ?Sized>(rng: &mut R, bits: u32) -> Result<u64> {
    if !(2..=64).contains(&bits) {
        return Err(ErrorKind::ModulusInvalid);
    }
    if bits == 2 {
        return Ok(if rng.random::<bool>() { 2 } else { 3 });
    }
    let top = 1u64 << (bits - 1);
    loop {
        let c = random_bits(rng, bits - 1) | top | 1;
        if is_prime(c) {
            return Ok(c);
        }
    }
}

/// Distinct prime divisors of `n`, ascending.
#[must_use]
pub fn prime_divisors(mut n: u64) -> Vec<u64> {
    let mut out = Vec::new();
    let mut p = 2u64;
    while p.saturating_mul(p) <= n {
        if n % p == 0 {
            out.push(p);
            while n % p == 0 {
                n /= p;
            }
        }
        p += if p == 2 { 1 } else { 2 };
    }
    if n > 1 {
        out.push(n);
    }
    out
}
