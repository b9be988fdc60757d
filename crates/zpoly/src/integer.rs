//! Signed multi-precision integers in the coefficient encoding.
//!
//! A [`ZInt`] is a sign and a normalised magnitude; its raw form is the
//! same signed header (`±` magnitude limbs) plus little-endian limbs that
//! every [`crate::IntPoly`] coefficient uses.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::One;
use rand::Rng;
use zpoly_mpn::arith::{self, cmp_values, normalized_len};
use zpoly_mpn::div::{divrem_1, mod_1};
use zpoly_mpn::ulong::{invmod, submod};
use zpoly_mpn::{ErrorKind, PreInv, Result};

/// A signed arbitrary-precision integer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ZInt {
    neg: bool,
    mag: Vec<u64>,
}

fn trimmed(mut v: Vec<u64>) -> Vec<u64> {
    v.truncate(normalized_len(&v));
    v
}

fn mag_add(a: &[u64], b: &[u64]) -> Vec<u64> {
    let (a, b) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut r = vec![0u64; a.len() + 1];
    r[a.len()] = arith::add(&mut r[..a.len()], a, b);
    trimmed(r)
}

/// `a - b` for `|a| >= |b|`.
fn mag_sub(a: &[u64], b: &[u64]) -> Vec<u64> {
    let mut r = vec![0u64; a.len()];
    let borrow = arith::sub(&mut r, a, b);
    debug_assert_eq!(borrow, 0);
    trimmed(r)
}

/// Limb-multiplier product; the operator impls use this.
fn mag_mul(a: &[u64], b: &[u64]) -> Vec<u64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut r = vec![0u64; a.len() + b.len()];
    zpoly_mpn::mul::mul(&mut r, a, b);
    trimmed(r)
}

/// Product that switches to the Fermat-ring convolution for large operands.
fn mag_mul_fft(a: &[u64], b: &[u64]) -> Result<Vec<u64>> {
    if a.is_empty() || b.is_empty() {
        return Ok(Vec::new());
    }
    let mut r = Vec::new();
    r.try_reserve_exact(a.len() + b.len())?;
    r.resize(a.len() + b.len(), 0);
    zpoly_fermat::mul_limbs(&mut r, a, b)?;
    Ok(trimmed(r))
}

impl ZInt {
    pub(crate) fn from_parts(neg: bool, mag: Vec<u64>) -> Self {
        let mag = trimmed(mag);
        let neg = neg && !mag.is_empty();
        Self { neg, mag }
    }

    /// Zero.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// One.
    #[must_use]
    pub fn one() -> Self {
        Self::from(1u64)
    }

    /// Build from a signed header and at least `|header|` magnitude limbs.
    #[must_use]
    pub fn from_raw(header: i64, limbs: &[u64]) -> Self {
        let size = usize::try_from(header.unsigned_abs()).unwrap_or(usize::MAX).min(limbs.len());
        Self::from_parts(header < 0, limbs[..size].to_vec())
    }

    /// The signed header: `±` the number of magnitude limbs.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn header(&self) -> i64 {
        let n = self.mag.len() as i64;
        if self.neg {
            -n
        } else {
            n
        }
    }

    /// Magnitude limbs, normalised.
    #[must_use]
    pub fn magnitude(&self) -> &[u64] {
        &self.mag
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.mag.is_empty()
    }

    #[must_use]
    pub fn is_one(&self) -> bool {
        !self.neg && self.mag == [1]
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.neg
    }

    /// `-1`, `0` or `1`.
    #[must_use]
    pub fn signum(&self) -> i32 {
        match (self.is_zero(), self.neg) {
            (true, _) => 0,
            (false, true) => -1,
            (false, false) => 1,
        }
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self {
            neg: false,
            mag: self.mag.clone(),
        }
    }

    /// Number of significant bits of the magnitude.
    #[must_use]
    pub fn bits(&self) -> usize {
        arith::bit_length(&self.mag)
    }

    /// The value as a `u64`, if it fits.
    #[must_use]
    pub fn to_u64(&self) -> Option<u64> {
        match (self.neg, self.mag.as_slice()) {
            (_, []) => Some(0),
            (false, [x]) => Some(*x),
            _ => None,
        }
    }

    /// The value as an `i64`, if it fits.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        match self.mag.as_slice() {
            [] => Some(0),
            [x] if self.neg => 0i64.checked_sub_unsigned(*x),
            [x] => i64::try_from(*x).ok(),
            _ => None,
        }
    }

    /// Copy out to a [`BigInt`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_bigint(&self) -> BigInt {
        let digits: Vec<u32> = self.mag.iter().flat_map(|&w| [w as u32, (w >> 32) as u32]).collect();
        let sign = if self.neg { Sign::Minus } else { Sign::Plus };
        BigInt::from_biguint(sign, BigUint::new(digits))
    }

    /// `self * m` for a word.
    #[must_use]
    pub fn mul_u64(&self, m: u64) -> Self {
        let mut r = vec![0u64; self.mag.len() + 1];
        r[self.mag.len()] = arith::mul_1(&mut r, &self.mag, m);
        Self::from_parts(self.neg, r)
    }

    /// `self * 2^k`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn mul_2exp(&self, k: usize) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        let (words, s) = (k / 64, (k % 64) as u32);
        let mut r = vec![0u64; words + self.mag.len() + 1];
        let top = arith::lshift(&mut r[words..], &self.mag, s);
        r[words + self.mag.len()] = top;
        Self::from_parts(self.neg, r)
    }

    /// `self / 2^k` rounded towards zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn tdiv_2exp(&self, k: usize) -> Self {
        let words = k / 64;
        if words >= self.mag.len() {
            return Self::zero();
        }
        let mut r = self.mag[words..].to_vec();
        arith::rshift_assign(&mut r, (k % 64) as u32);
        Self::from_parts(self.neg, r)
    }

    /// Truncating division: `self = q d + r` with `r` taking the sign of `self`.
    pub fn tdiv_qr(&self, d: &Self) -> Result<(Self, Self)> {
        let (q, r) = zpoly_mpn::div::divrem(&self.mag, &d.mag)?;
        Ok((Self::from_parts(self.neg != d.neg, q), Self::from_parts(self.neg, r)))
    }

    /// Floor division: `self = q d + r` with `r` taking the sign of `d`.
    pub fn fdiv_qr(&self, d: &Self) -> Result<(Self, Self)> {
        let (q, r) = self.tdiv_qr(d)?;
        if !r.is_zero() && r.neg != d.neg {
            Ok((&q - &Self::one(), &r + d))
        } else {
            Ok((q, r))
        }
    }

    /// Floor quotient.
    pub fn fdiv(&self, d: &Self) -> Result<Self> {
        Ok(self.fdiv_qr(d)?.0)
    }

    /// Exact quotient; the caller guarantees `d` divides `self`.
    pub fn divexact(&self, d: &Self) -> Result<Self> {
        let (q, r) = self.tdiv_qr(d)?;
        debug_assert!(r.is_zero(), "inexact division");
        Ok(q)
    }

    /// Truncating division by a word with a precomputed reciprocal, returning
    /// the quotient and the magnitude of the remainder.
    pub fn tdiv_u64_preinv(&self, pre: &PreInv) -> (Self, u64) {
        let mut q = vec![0u64; self.mag.len()];
        let r = divrem_1(&mut q, &self.mag, pre);
        (Self::from_parts(self.neg, q), r)
    }

    /// The residue of `self` modulo `m`, in `[0, m)`.
    pub fn mod_ui(&self, m: u64) -> Result<u64> {
        let pre = PreInv::new(m)?;
        Ok(self.mod_preinv(&pre))
    }

    pub(crate) fn mod_preinv(&self, pre: &PreInv) -> u64 {
        let r = mod_1(&self.mag, pre);
        if self.neg {
            submod(0, r, pre.divisor())
        } else {
            r
        }
    }

    /// Non-negative greatest common divisor; `gcd(0, 0) = 0`.
    #[must_use]
    pub fn gcd(&self, other: &Self) -> Self {
        if self.is_zero() {
            return other.abs();
        }
        if other.is_zero() {
            return self.abs();
        }
        Self::from(&self.to_bigint().gcd(&other.to_bigint()))
    }

    /// Inverse of `self` modulo `|m|`, in `[0, |m|)`.
    pub fn invmod(&self, m: &Self) -> Result<Self> {
        if m.is_zero() {
            return Err(ErrorKind::DivisionByZero);
        }
        let m = m.abs().to_bigint();
        let a = self.to_bigint().mod_floor(&m);
        let e = a.extended_gcd(&m);
        if !e.gcd.is_one() && !m.is_one() {
            return Err(ErrorKind::NotCoprime);
        }
        Ok(Self::from(e.x.mod_floor(&m)))
    }

    /// `self * rhs`, through the convolution multiplier once both operands
    /// pass [`zpoly_fermat::SS_INT_THRESHOLD`] limbs. Allocation and ring
    /// errors are returned; the `*` operator stays on the limb multiplier.
    pub fn try_mul(&self, rhs: &Self) -> Result<Self> {
        Ok(Self::from_parts(self.neg != rhs.neg, mag_mul_fft(&self.mag, &rhs.mag)?))
    }

    /// `self^e`.
    #[must_use]
    pub fn pow(&self, e: u32) -> Self {
        let mut acc = Self::one();
        for i in (0..u32::BITS - e.leading_zeros()).rev() {
            acc = &acc * &acc;
            if (e >> i) & 1 == 1 {
                acc = &acc * self;
            }
        }
        acc
    }

    /// Floor square root of a non-negative value.
    pub fn sqrt(&self) -> Result<Self> {
        if self.neg {
            return Err(ErrorKind::ModulusInvalid);
        }
        Ok(Self::from(&self.to_bigint().sqrt()))
    }

    /// Uniform in `[0, 2^bits)`; zero bits gives zero.
    #[allow(clippy::cast_possible_truncation)]
    pub fn random<R: Rng + ?Sized>(rng: &mut R, bits: usize) -> Self {
        if bits == 0 {
            return Self::zero();
        }
        let mut mag: Vec<u64> = (0..bits.div_ceil(64)).map(|_| rng.random::<u64>()).collect();
        let spare = (64 * mag.len() - bits) as u32;
        if let Some(top) = mag.last_mut() {
            *top >>= spare;
        }
        Self::from_parts(false, mag)
    }

    /// Uniform magnitude below `2^bits` with a random sign.
    pub fn random_signed<R: Rng + ?Sized>(rng: &mut R, bits: usize) -> Self {
        let x = Self::random(rng, bits);
        if rng.random::<bool>() {
            -x
        } else {
            x
        }
    }

    /// Chinese remaindering: given `self ≡ f (mod m)` and `r ≡ f (mod p)`,
    /// return `f mod (p m)`, either in `[0, p m)` or, if `balanced`, in
    /// `[-p m / 2, p m / 2)`. `self` may lie in either range for `m`.
    pub fn crt_ui(&self, m: &Self, r: u64, p: u64, balanced: bool) -> Result<Self> {
        let pre = PreInv::new(p)?;
        let m_inv = invmod(m.mod_preinv(&pre), p)?;
        let pm = m.mul_u64(p);
        Ok(self.crt_step(m, r, &pre, m_inv, &pm, balanced))
    }

    /// [`ZInt::crt_ui`] with `m^-1 mod p` and `p m` supplied.
    pub(crate) fn crt_step(&self, m: &Self, r: u64, pre: &PreInv, m_inv: u64, pm: &Self, balanced: bool) -> Self {
        let p = pre.divisor();
        let x = if self.neg { self + m } else { self.clone() };
        let t = pre.mulmod(submod(r, x.mod_preinv(pre), p), m_inv);
        let mut y = &x + &m.mul_u64(t);
        if balanced && y.mul_u64(2) >= *pm {
            y -= pm;
        }
        y
    }
}

impl From<u64> for ZInt {
    fn from(x: u64) -> Self {
        Self::from_parts(false, vec![x])
    }
}

impl From<i64> for ZInt {
    fn from(x: i64) -> Self {
        Self::from_parts(x < 0, vec![x.unsigned_abs()])
    }
}

impl From<&BigInt> for ZInt {
    fn from(x: &BigInt) -> Self {
        Self::from_parts(x.sign() == Sign::Minus, x.magnitude().to_u64_digits())
    }
}

impl From<BigInt> for ZInt {
    fn from(x: BigInt) -> Self {
        Self::from(&x)
    }
}

impl From<&ZInt> for BigInt {
    fn from(x: &ZInt) -> Self {
        x.to_bigint()
    }
}

impl Ord for ZInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.neg, other.neg) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => cmp_values(&self.mag, &other.mag),
            (true, true) => cmp_values(&other.mag, &self.mag),
        }
    }
}

impl PartialOrd for ZInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn signed_add(a_neg: bool, a: &[u64], b_neg: bool, b: &[u64]) -> ZInt {
    if a_neg == b_neg {
        return ZInt::from_parts(a_neg, mag_add(a, b));
    }
    match cmp_values(a, b) {
        Ordering::Less => ZInt::from_parts(b_neg, mag_sub(b, a)),
        _ => ZInt::from_parts(a_neg, mag_sub(a, b)),
    }
}

impl Add<&ZInt> for &ZInt {
    type Output = ZInt;

    fn add(self, rhs: &ZInt) -> ZInt {
        signed_add(self.neg, &self.mag, rhs.neg, &rhs.mag)
    }
}

impl Sub<&ZInt> for &ZInt {
    type Output = ZInt;

    fn sub(self, rhs: &ZInt) -> ZInt {
        signed_add(self.neg, &self.mag, !rhs.neg, &rhs.mag)
    }
}

impl Mul<&ZInt> for &ZInt {
    type Output = ZInt;

    fn mul(self, rhs: &ZInt) -> ZInt {
        ZInt::from_parts(self.neg != rhs.neg, mag_mul(&self.mag, &rhs.mag))
    }
}

impl Neg for &ZInt {
    type Output = ZInt;

    fn neg(self) -> ZInt {
        ZInt::from_parts(!self.neg, self.mag.clone())
    }
}

impl Neg for ZInt {
    type Output = ZInt;

    fn neg(self) -> ZInt {
        ZInt::from_parts(!self.neg, self.mag)
    }
}

impl AddAssign<&ZInt> for ZInt {
    fn add_assign(&mut self, rhs: &ZInt) {
        *self = &*self + rhs;
    }
}

impl SubAssign<&ZInt> for ZInt {
    fn sub_assign(&mut self, rhs: &ZInt) {
        *self = &*self - rhs;
    }
}

impl MulAssign<&ZInt> for ZInt {
    fn mul_assign(&mut self, rhs: &ZInt) {
        *self = &*self * rhs;
    }
}

impl fmt::Display for ZInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bigint())
    }
}

impl FromStr for ZInt {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<BigInt>()
            .map(Self::from)
            .map_err(|_| ErrorKind::InvalidText(format!("bad integer {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Num;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn z(s: &str) -> ZInt {
        s.parse().unwrap()
    }

    #[test]
    fn word_conversions() {
        assert_eq!(ZInt::from(0u64).header(), 0);
        assert_eq!(ZInt::from(-5i64).header(), -1);
        assert_eq!(ZInt::from(i64::MIN).to_i64(), Some(i64::MIN));
        assert_eq!(ZInt::from(u64::MAX).to_i64(), None);
        assert_eq!(ZInt::from(u64::MAX).to_u64(), Some(u64::MAX));
        assert_eq!(ZInt::from(-1i64).to_u64(), None);
        assert!(!(-ZInt::zero()).is_negative());
    }

    #[test]
    fn bigint_round_trip() {
        let big = BigInt::from_str_radix("-123456789012345678901234567890123456789", 10).unwrap();
        let x = ZInt::from(&big);
        assert_eq!(x.header(), -2);
        assert_eq!(x.to_bigint(), big);
        assert_eq!(x.to_string(), big.to_string());
    }

    #[test]
    fn raw_form() {
        let x = ZInt::from_raw(-2, &[5, 1, 99]);
        assert_eq!(x.magnitude(), &[5, 1]);
        assert!(x.is_negative());
        assert!(ZInt::from_raw(2, &[0, 0]).is_zero());
    }

    #[test]
    fn convolution_product_matches_operator() {
        let n = zpoly_fermat::SS_INT_THRESHOLD + 3;
        let a = ZInt::from_parts(true, (1..=n as u64).map(|i| i.wrapping_mul(0x9e37_79b9_7f4a_7c15)).collect());
        let b = ZInt::from_parts(false, vec![u64::MAX; n]);
        let fft = a.try_mul(&b).unwrap();
        assert!(fft.is_negative());
        assert_eq!(fft, &a * &b);
        assert_eq!(ZInt::from(-6i64).try_mul(&ZInt::from(7i64)).unwrap(), ZInt::from(-42i64));
        assert!(ZInt::zero().try_mul(&b).unwrap().is_zero());
    }

    #[test]
    fn arithmetic_matches_bigint() {
        let a = z("-340282366920938463463374607431768211457");
        let b = z("18446744073709551629");
        let (ba, bb) = (a.to_bigint(), b.to_bigint());
        assert_eq!((&a + &b).to_bigint(), &ba + &bb);
        assert_eq!((&a - &b).to_bigint(), &ba - &bb);
        assert_eq!((&b - &a).to_bigint(), &bb - &ba);
        assert_eq!((&a * &b).to_bigint(), &ba * &bb);
        assert!((&a - &a).is_zero());
    }

    #[test]
    fn truncating_and_floor_division() {
        let (q, r) = ZInt::from(-7i64).tdiv_qr(&ZInt::from(2i64)).unwrap();
        assert_eq!((q, r), (ZInt::from(-3i64), ZInt::from(-1i64)));
        let (q, r) = ZInt::from(-7i64).fdiv_qr(&ZInt::from(2i64)).unwrap();
        assert_eq!((q, r), (ZInt::from(-4i64), ZInt::from(1i64)));
        let (q, r) = ZInt::from(7i64).fdiv_qr(&ZInt::from(-2i64)).unwrap();
        assert_eq!((q, r), (ZInt::from(-4i64), ZInt::from(-1i64)));
        assert_eq!(ZInt::one().tdiv_qr(&ZInt::zero()), Err(ErrorKind::DivisionByZero));
        let big = z("1000000000000000000000000000000");
        assert_eq!(big.divexact(&z("1000000000000000")).unwrap(), z("1000000000000000"));
    }

    #[test]
    fn residues_and_gcd() {
        assert_eq!(ZInt::from(-3i64).mod_ui(7).unwrap(), 4);
        assert_eq!(z("100000000000000000000").mod_ui(97).unwrap(), 100_000_000_000_000_000_000u128.rem_euclid(97) as u64);
        assert_eq!(ZInt::from(12i64).gcd(&ZInt::from(-18i64)), ZInt::from(6i64));
        assert_eq!(ZInt::zero().gcd(&ZInt::from(-4i64)), ZInt::from(4i64));
        assert_eq!(ZInt::zero().gcd(&ZInt::zero()), ZInt::zero());
    }

    #[test]
    fn modular_inverse() {
        assert_eq!(ZInt::from(3i64).invmod(&ZInt::from(7i64)).unwrap(), ZInt::from(5i64));
        assert_eq!(ZInt::from(-3i64).invmod(&ZInt::from(7i64)).unwrap(), ZInt::from(2i64));
        let m = z("170141183460469231731687303715884105727");
        let x = z("12345678901234567890123");
        let inv = x.invmod(&m).unwrap();
        assert_eq!((&x * &inv).fdiv_qr(&m).unwrap().1, ZInt::one());
        assert_eq!(ZInt::from(4i64).invmod(&ZInt::from(6i64)), Err(ErrorKind::NotCoprime));
        assert_eq!(ZInt::from(4i64).invmod(&ZInt::zero()), Err(ErrorKind::DivisionByZero));
        assert!(ZInt::from(4i64).invmod(&ZInt::one()).unwrap().is_zero());
    }

    #[test]
    fn shifts_powers_and_roots() {
        let x = ZInt::from(-3i64);
        assert_eq!(x.mul_2exp(70).to_bigint(), BigInt::from(-3) << 70);
        assert_eq!(x.mul_2exp(70).tdiv_2exp(70), x);
        assert_eq!(ZInt::from(-7i64).tdiv_2exp(1), ZInt::from(-3i64));
        assert_eq!(ZInt::from(3i64).pow(5), ZInt::from(243i64));
        assert_eq!(ZInt::from(-2i64).pow(0), ZInt::one());
        assert_eq!(ZInt::from(99i64).sqrt().unwrap(), ZInt::from(9i64));
        assert!(ZInt::from(-1i64).sqrt().is_err());
    }

    #[test]
    fn random_sizes() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(ZInt::random(&mut rng, 0).is_zero());
        for bits in [1usize, 63, 64, 65, 200] {
            assert!(ZInt::random(&mut rng, bits).bits() <= bits);
            assert!(ZInt::random_signed(&mut rng, bits).bits() <= bits);
        }
    }

    #[test]
    fn ordering() {
        let mut v = vec![ZInt::from(3i64), ZInt::from(-10i64), z("99999999999999999999"), ZInt::zero()];
        v.sort();
        assert_eq!(v[0], ZInt::from(-10i64));
        assert_eq!(v[3], z("99999999999999999999"));
    }

    #[test]
    fn chinese_remaindering() {
        // -3 = 2 mod 5 and 4 mod 7
        let x = ZInt::from(2i64);
        let y = x.crt_ui(&ZInt::from(5i64), 4, 7, true).unwrap();
        assert_eq!(y, ZInt::from(-3i64));
        let u = x.crt_ui(&ZInt::from(5i64), 4, 7, false).unwrap();
        assert_eq!(u, ZInt::from(32i64));
        let from_neg = ZInt::from(-3i64).crt_ui(&ZInt::from(35i64), 8, 11, true).unwrap();
        assert_eq!(from_neg, ZInt::from(-3i64));
        assert_eq!(x.crt_ui(&ZInt::from(6i64), 1, 3, true), Err(ErrorKind::NotCoprime));
    }

    #[test]
    fn parse_errors() {
        assert!(matches!("12a".parse::<ZInt>(), Err(ErrorKind::InvalidText(_))));
        assert_eq!(" -0".trim().parse::<ZInt>().unwrap(), ZInt::zero());
    }
}
