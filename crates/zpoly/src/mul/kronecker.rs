//! Kronecker substitution.
//!
//! Both operands are evaluated at `x = 2^field` into large integers, the
//! integers are multiplied by the limb-level multiplier, and the product's
//! fields are read back as balanced digits. An operand with a negative
//! leading coefficient is packed negated so both packed values are
//! non-negative; the product's sign is restored while unpacking.
//!
//! Fields narrower than a word are bit-aligned; wider ones are rounded up
//! to whole bytes.

use zpoly_fermat::{mul_limbs, sqr_limbs};
use zpoly_mpn::arith::normalized_len;
use zpoly_mpn::{ErrorKind, Result};

use super::clear_below;
use crate::pack::{pack_integer, packed_limbs, product_field_bits, unpack_integer};
use crate::poly::IntPoly;
use crate::view::IntPolyView;

/// Packing width for a Kronecker product: bit-aligned below a word,
/// byte-aligned above.
#[must_use]
pub fn ks_field_bits(bits1: usize, bits2: usize, min_len: usize) -> usize {
    let field = product_field_bits(bits1, bits2, min_len);
    if field < 64 {
        field
    } else {
        field.next_multiple_of(8)
    }
}

fn lead_negative(a: IntPolyView<'_>) -> bool {
    a.len() > 0 && a.is_negative(a.len() - 1)
}

/// `a(2^field)`, negated if the leading coefficient is negative.
fn pack_operand(a: IntPolyView<'_>, field: usize) -> Result<(Vec<u64>, bool)> {
    let negated = lead_negative(a);
    let mut buf = Vec::new();
    buf.try_reserve_exact(packed_limbs(a.len(), field))?;
    buf.resize(packed_limbs(a.len(), field), 0);
    pack_integer(&mut buf, a, field, negated)?;
    buf.truncate(normalized_len(&buf));
    Ok((buf, negated))
}

fn unpack_product(x: &[u64], y: &[u64], out_len: usize, field: usize, negate: bool, squaring: bool) -> Result<IntPoly> {
    let mut prod = Vec::new();
    prod.try_reserve_exact(x.len() + y.len())?;
    prod.resize(x.len() + y.len(), 0);
    if squaring {
        sqr_limbs(&mut prod, x)?;
    } else {
        mul_limbs(&mut prod, x, y)?;
    }
    let mut out = IntPoly::with_capacity(out_len, field.div_ceil(64))?;
    unpack_integer(&mut out, &prod, out_len, field, true, negate)?;
    Ok(out)
}

fn ks(a: IntPolyView<'_>, b: IntPolyView<'_>, out_len: usize, squaring: bool) -> Result<IntPoly> {
    if a.is_zero() || b.is_zero() {
        return Ok(IntPoly::new());
    }
    let out_len = out_len.min(a.len() + b.len() - 1);
    let field = ks_field_bits(a.max_bits().1, b.max_bits().1, a.len().min(b.len()));
    tracing::trace!(len1 = a.len(), len2 = b.len(), field, "kronecker substitution");
    let (x, neg_a) = pack_operand(a, field)?;
    if squaring {
        return unpack_product(&x, &x, out_len, field, false, true);
    }
    let (y, neg_b) = pack_operand(b, field)?;
    unpack_product(&x, &y, out_len, field, neg_a != neg_b, false)
}

/// Kronecker product `a * b`.
pub fn mul_ks(a: IntPolyView<'_>, b: IntPolyView<'_>) -> Result<IntPoly> {
    ks(a, b, usize::MAX, false)
}

/// Kronecker square.
pub fn sqr_ks(a: IntPolyView<'_>) -> Result<IntPoly> {
    ks(a, a, usize::MAX, true)
}

/// `a * b mod x^n`.
///
/// The operands are truncated first, so the packing width and the sign
/// normalisation follow the truncated leading coefficients.
pub fn mul_ks_trunc(a: IntPolyView<'_>, b: IntPolyView<'_>, n: usize) -> Result<IntPoly> {
    ks(a.truncated(n), b.truncated(n), n, false)
}

/// `a * b` with the coefficients below `x^n` zeroed.
pub fn mul_ks_trunc_left(a: IntPolyView<'_>, b: IntPolyView<'_>, n: usize) -> Result<IntPoly> {
    let mut r = ks(a, b, usize::MAX, false)?;
    clear_below(&mut r, n)?;
    Ok(r)
}

/// A fixed operand kept in packed form for repeated Kronecker products.
///
/// The field width is fixed at construction from bounds on the other
/// operands; a product whose operand exceeds them fails with
/// [`ErrorKind::PackDoesNotFit`].
#[derive(Debug, Clone)]
pub struct KsPrecache {
    packed: Vec<u64>,
    negated: bool,
    len: usize,
    bits: usize,
    field: usize,
}

impl KsPrecache {
    /// Pack `b` for products with operands of at most `max_len` terms and
    /// `max_bits`-bit coefficients.
    pub fn new(b: IntPolyView<'_>, max_len: usize, max_bits: usize) -> Result<Self> {
        let bits = b.max_bits().1;
        let field = ks_field_bits(bits, max_bits, b.len().min(max_len));
        let (packed, negated) = pack_operand(b, field)?;
        Ok(Self {
            packed,
            negated,
            len: b.len(),
            bits,
            field,
        })
    }

    /// Length of the cached operand.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Field width in bits.
    #[must_use]
    pub fn field_bits(&self) -> usize {
        self.field
    }

    /// `a * b mod x^n` for the cached `b`.
    pub fn mul_trunc(&self, a: IntPolyView<'_>, n: usize) -> Result<IntPoly> {
        let a = a.truncated(n);
        if a.is_zero() || self.len == 0 {
            return Ok(IntPoly::new());
        }
        if ks_field_bits(a.max_bits().1, self.bits, a.len().min(self.len)) > self.field {
            return Err(ErrorKind::PackDoesNotFit);
        }
        let out_len = n.min(a.len() + self.len - 1);
        let (x, neg_a) = pack_operand(a, self.field)?;
        let packed = if n < self.len {
            // Only the low fields of `b` reach the first `n` outputs.
            let limbs = packed_limbs(n, self.field).min(self.packed.len());
            &self.packed[..limbs]
        } else {
            &self.packed[..]
        };
        let mut out = unpack_product(&x, packed, out_len, self.field, neg_a != self.negated, false)?;
        out.truncate(n);
        Ok(out)
    }

    /// `a * b` for the cached `b`.
    pub fn mul(&self, a: IntPolyView<'_>) -> Result<IntPoly> {
        self.mul_trunc(a, usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integer::ZInt;
    use crate::mul::classical::mul_classical;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn random_poly(rng: &mut ChaCha8Rng, len: usize, bits: usize) -> IntPoly {
        let coeffs: Vec<_> = (0..len).map(|_| ZInt::random_signed(rng, bits)).collect();
        IntPoly::from_zints(&coeffs).unwrap()
    }

    fn p(c: &[i64]) -> IntPoly {
        IntPoly::from_i64s(c).unwrap()
    }

    #[test]
    fn field_alignment() {
        assert_eq!(ks_field_bits(3, 4, 2), 10);
        assert_eq!(ks_field_bits(40, 40, 1), 88);
        assert_eq!(ks_field_bits(40, 41, 1), 88);
        assert_eq!(ks_field_bits(40, 43, 1), 88);
        assert_eq!(ks_field_bits(40, 47, 1), 96);
    }

    #[test]
    fn signs_are_restored() {
        let f = p(&[1, 2, -3]);
        let g = p(&[-1, 0, 4]);
        let expected = mul_classical(f.view(), g.view()).unwrap();
        assert_eq!(mul_ks(f.view(), g.view()).unwrap(), expected);
        let fneg = f.neg().unwrap();
        assert_eq!(mul_ks(fneg.view(), g.view()).unwrap(), expected.neg().unwrap());
        assert_eq!(f, p(&[1, 2, -3]));
    }

    #[test]
    fn matches_classical_on_random_input() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for &(l1, l2, bits) in &[(1usize, 1usize, 1usize), (5, 9, 30), (20, 20, 63), (13, 40, 64), (8, 8, 300)] {
            let f = random_poly(&mut rng, l1, bits);
            let g = random_poly(&mut rng, l2, bits + 7);
            let expected = mul_classical(f.view(), g.view()).unwrap();
            assert_eq!(mul_ks(f.view(), g.view()).unwrap(), expected, "{l1} x {l2} at {bits} bits");
            assert_eq!(sqr_ks(f.view()).unwrap(), mul_classical(f.view(), f.view()).unwrap());
        }
    }

    #[test]
    fn truncated_forms() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let f = random_poly(&mut rng, 12, 50);
        let g = random_poly(&mut rng, 10, 50);
        let mut expected = mul_classical(f.view(), g.view()).unwrap();
        let high = mul_ks_trunc_left(f.view(), g.view(), 6).unwrap();
        for i in 6..expected.len() {
            assert_eq!(high.get_coeff(i), expected.get_coeff(i));
        }
        assert!((0..6).all(|i| high.get_coeff(i).is_zero()));
        expected.truncate(7);
        assert_eq!(mul_ks_trunc(f.view(), g.view(), 7).unwrap(), expected);
    }

    #[test]
    fn precache_matches_direct_product() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let b = random_poly(&mut rng, 15, 40);
        let pre = KsPrecache::new(b.view(), 20, 40).unwrap();
        assert_eq!(pre.len(), 15);
        for len in [1usize, 7, 20] {
            let a = random_poly(&mut rng, len, 40);
            let expected = mul_classical(a.view(), b.view()).unwrap();
            assert_eq!(pre.mul(a.view()).unwrap(), expected);
            let mut low = expected.clone();
            low.truncate(9);
            assert_eq!(pre.mul_trunc(a.view(), 9).unwrap(), low);
        }
        let wide = random_poly(&mut rng, 4, 200);
        if wide.max_bits().1 > 60 {
            assert_eq!(pre.mul(wide.view()), Err(ErrorKind::PackDoesNotFit));
        }
    }
}
