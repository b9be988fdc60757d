//! Products of word-prime polynomials.
//!
//! Classical multiplication delays reduction for as long as the accumulated
//! sum provably fits (one word, then two). Kronecker substitution packs each
//! operand into one large integer with fields of `2 bits(p) + log2(len)`
//! bits, multiplies the integers, and reads the fields back.

use zpoly_fermat::mul_limbs;
use zpoly_mpn::bits::{or_word, read_field};
use zpoly_mpn::div::mod_1;
use zpoly_mpn::ulong::{addmod, bits, clog2};
use zpoly_mpn::{ErrorKind, PreInv, Result};

use crate::poly::ModPoly;

/// Shorter-operand length from which Kronecker substitution is used.
pub const KS_CUTOFF: usize = 32;

/// Coefficients `[lo, hi)` of `a * b`, reduced. Entries outside the
/// product are zero.
#[allow(clippy::cast_possible_truncation)]
fn classical_range(a: &[u64], b: &[u64], lo: usize, hi: usize, p: u64, pre: &PreInv) -> Vec<u64> {
    let mut out = vec![0u64; hi.saturating_sub(lo)];
    if a.is_empty() || b.is_empty() {
        return out;
    }
    let (la, lb) = (a.len(), b.len());
    let bound = 2 * bits(p) + clog2(la.min(lb));
    for (k, slot) in (lo..hi).zip(out.iter_mut()) {
        if k > la + lb - 2 {
            break;
        }
        let start = k.saturating_sub(lb - 1);
        let end = k.min(la - 1);
        let terms = (start..=end).map(|i| (a[i], b[k - i]));
        *slot = if bound <= 64 {
            pre.reduce(terms.fold(0u64, |acc, (x, y)| acc + x * y))
        } else if bound <= 128 {
            let s = terms.fold(0u128, |acc, (x, y)| acc + u128::from(x) * u128::from(y));
            pre.reduce_wide((s >> 64) as u64, s as u64)
        } else {
            terms.fold(0u64, |acc, (x, y)| addmod(acc, pre.mulmod(x, y), p))
        };
    }
    out
}

/// Schoolbook product.
pub fn mul_classical(a: &ModPoly, b: &ModPoly) -> ModPoly {
    let len = (a.len() + b.len()).saturating_sub(1);
    let out = classical_range(a.coeffs(), b.coeffs(), 0, len, a.modulus(), a.preinv());
    a.from_raw(out)
}

/// Field width for a Kronecker product with shorter length `min_len`.
fn ks_field(p: u64, min_len: usize) -> usize {
    (2 * bits(p) + clog2(min_len)) as usize
}

/// Pack coefficients into consecutive `field`-bit fields.
fn ks_pack(coeffs: &[u64], field: usize) -> Result<Vec<u64>> {
    let limbs = (coeffs.len() * field).div_ceil(64) + 1;
    let mut out = Vec::new();
    out.try_reserve_exact(limbs)?;
    out.resize(limbs, 0);
    for (i, &c) in coeffs.iter().enumerate() {
        or_word(&mut out, i * field, c);
    }
    Ok(out)
}

/// Read fields `[lo, hi)` of a packed product and reduce them.
fn ks_unpack(prod: &[u64], field: usize, lo: usize, hi: usize, pre: &PreInv) -> Vec<u64> {
    let mut word = [0u64; 3];
    (lo..hi)
        .map(|i| {
            word.fill(0);
            read_field(&mut word, prod, i * field, field);
            mod_1(&word[..field.div_ceil(64)], pre)
        })
        .collect()
}

/// Packed product of two coefficient slices, plus the field width.
fn ks_product(a: &[u64], b: &[u64], p: u64) -> Result<(Vec<u64>, usize)> {
    let field = ks_field(p, a.len().min(b.len()));
    let pa = ks_pack(a, field)?;
    let pb = ks_pack(b, field)?;
    let mut prod = Vec::new();
    prod.try_reserve_exact(pa.len() + pb.len())?;
    prod.resize(pa.len() + pb.len(), 0);
    mul_limbs(&mut prod, &pa, &pb)?;
    Ok((prod, field))
}

/// Kronecker-substitution product.
pub fn mul_ks(a: &ModPoly, b: &ModPoly) -> Result<ModPoly> {
    mul_ks_range(a, b, 0, usize::MAX)
}

/// Kronecker product keeping only coefficients `[lo, hi)`.
fn mul_ks_range(a: &ModPoly, b: &ModPoly, lo: usize, hi: usize) -> Result<ModPoly> {
    a.check_same_modulus(b)?;
    if a.is_zero() || b.is_zero() {
        return Ok(a.zero_like());
    }
    let hi = hi.min(a.len() + b.len() - 1);
    let (ac, bc) = (&a.coeffs()[..a.len().min(hi)], &b.coeffs()[..b.len().min(hi)]);
    let (prod, field) = ks_product(ac, bc, a.modulus())?;
    let mut out = vec![0u64; lo.min(hi)];
    out.extend(ks_unpack(&prod, field, lo.min(hi), hi, a.preinv()));
    Ok(a.from_raw(out))
}

/// Product, dispatching on size.
pub fn mul(a: &ModPoly, b: &ModPoly) -> Result<ModPoly> {
    a.check_same_modulus(b)?;
    if a.len().min(b.len()) < KS_CUTOFF {
        Ok(mul_classical(a, b))
    } else {
        mul_ks(a, b)
    }
}

/// `a * a`.
pub fn sqr(a: &ModPoly) -> Result<ModPoly> {
    mul(a, a)
}

/// The first `n` coefficients of `a * b`.
pub fn mul_trunc(a: &ModPoly, b: &ModPoly, n: usize) -> Result<ModPoly> {
    a.check_same_modulus(b)?;
    if a.len().min(b.len()).min(n) < KS_CUTOFF {
        let out = classical_range(a.coeffs(), b.coeffs(), 0, n.min((a.len() + b.len()).saturating_sub(1)), a.modulus(), a.preinv());
        Ok(a.from_raw(out))
    } else {
        mul_ks_range(a, b, 0, n)
    }
}

/// `a * b` with the coefficients below `n` set to zero.
pub fn mul_trunc_left(a: &ModPoly, b: &ModPoly, n: usize) -> Result<ModPoly> {
    a.check_same_modulus(b)?;
    let len = (a.len() + b.len()).saturating_sub(1);
    if a.len().min(b.len()) < KS_CUTOFF {
        let lo = n.min(len);
        let mut out = vec![0u64; lo];
        out.extend(classical_range(a.coeffs(), b.coeffs(), lo, len, a.modulus(), a.preinv()));
        Ok(a.from_raw(out))
    } else {
        mul_ks_range(a, b, n, usize::MAX)
    }
}

/// Middle product: coefficients `[(trunc - 1) / 2, trunc)` of `a * b`,
/// with everything below set to zero.
pub fn mul_middle(a: &ModPoly, b: &ModPoly, trunc: usize) -> Result<ModPoly> {
    a.check_same_modulus(b)?;
    let lo = trunc.saturating_sub(1) / 2;
    if a.len().min(b.len()) < KS_CUTOFF {
        let mut out = vec![0u64; lo];
        let hi = trunc.min((a.len() + b.len()).saturating_sub(1)).max(lo);
        out.extend(classical_range(a.coeffs(), b.coeffs(), lo, hi, a.modulus(), a.preinv()));
        Ok(a.from_raw(out))
    } else {
        mul_ks_range(a, b, lo, trunc)
    }
}

/// A fixed operand packed once for repeated Kronecker products.
#[derive(Debug, Clone)]
pub struct MulPrecache {
    operand: ModPoly,
    packed: Vec<u64>,
    field: usize,
    max_len: usize,
}

impl MulPrecache {
    /// Pack `b` for products with polynomials of length at most `max_len`.
    pub fn new(b: &ModPoly, max_len: usize) -> Result<Self> {
        let field = ks_field(b.modulus(), b.len().min(max_len).max(1));
        Ok(Self {
            operand: b.clone(),
            packed: ks_pack(b.coeffs(), field)?,
            field,
            max_len,
        })
    }

    /// The cached operand.
    #[must_use]
    pub fn operand(&self) -> &ModPoly {
        &self.operand
    }

    /// `a * b` for the cached `b`.
    pub fn mul(&self, a: &ModPoly) -> Result<ModPoly> {
        self.mul_trunc(a, usize::MAX)
    }

    /// First `n` coefficients of `a * b` for the cached `b`.
    pub fn mul_trunc(&self, a: &ModPoly, n: usize) -> Result<ModPoly> {
        a.check_same_modulus(&self.operand)?;
        if a.len() > self.max_len {
            return Err(ErrorKind::LengthOverflow);
        }
        if a.is_zero() || self.operand.is_zero() {
            return Ok(a.zero_like());
        }
        let pa = ks_pack(a.coeffs(), self.field)?;
        let mut prod = Vec::new();
        prod.try_reserve_exact(pa.len() + self.packed.len())?;
        prod.resize(pa.len() + self.packed.len(), 0);
        mul_limbs(&mut prod, &pa, &self.packed)?;
        let hi = n.min(a.len() + self.operand.len() - 1);
        Ok(a.from_raw(ks_unpack(&prod, self.field, 0, hi, a.preinv())))
    }
}
