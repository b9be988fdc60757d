//! GCD, resultant, extended GCD and inversion for integer polynomials.
//!
//! The small cases run the subresultant remainder sequence over Z. Larger
//! operands are mapped to word primes: GCD images are combined with
//! [`IntPoly::crt`] until the lift stops moving and divides both inputs,
//! and resultant or Bézout images are gathered in parallel and rebuilt
//! with a [`Comb`] once enough primes cover the Hadamard bound.

use rayon::prelude::*;
use tracing::{debug, trace, warn};
use zpoly_mpn::{ErrorKind, Result};
use zpoly_nmod::ModPoly;

use crate::comb::Comb;
use crate::constants::{GCD_SUBRESULTANT_CUTOFF, MAX_UNLUCKY_PRIMES};
use crate::div::{divides, pseudo_rem};
use crate::integer::ZInt;
use crate::modular::PrimeStream;
use crate::poly::IntPoly;

/// Bits of a modular prime that always count towards a bound.
const PRIME_SAFE_BITS: usize = 61;

fn lead(p: &IntPoly) -> ZInt {
    p.get_coeff(p.len().saturating_sub(1))
}

fn degree_u32(p: &IntPoly) -> Result<u32> {
    u32::try_from(p.len().saturating_sub(1)).map_err(|_| ErrorKind::LengthOverflow)
}

/// `p` or `-p`, whichever has a positive leading coefficient.
fn positive_lead(mut p: IntPoly) -> IntPoly {
    if p.lead_is_negative() {
        p.neg_in_place();
    }
    p
}

/// `gcd(a, 0)` and `gcd(0, b)`; `None` when both are nonzero.
fn trivial_gcd(a: &IntPoly, b: &IntPoly) -> Option<IntPoly> {
    match (a.is_zero(), b.is_zero()) {
        (true, _) => Some(positive_lead(b.clone())),
        (false, true) => Some(positive_lead(a.clone())),
        _ => None,
    }
}

/// GCD by the subresultant remainder sequence.
pub fn gcd_subresultant(a: &IntPoly, b: &IntPoly) -> Result<IntPoly> {
    if let Some(g) = trivial_gcd(a, b) {
        return Ok(g);
    }
    let (a, b) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let d = a.content().gcd(&b.content());
    let mut u = a.primitive_part()?;
    let mut v = b.primitive_part()?;
    let mut g = ZInt::one();
    let mut h = ZInt::one();
    loop {
        let delta = u32::try_from(u.len() - v.len()).map_err(|_| ErrorKind::LengthOverflow)?;
        let (r, steps) = pseudo_rem(&u, &v)?;
        if r.is_zero() {
            break;
        }
        if r.len() == 1 {
            v = IntPoly::constant(&ZInt::one())?;
            break;
        }
        // pseudo_rem stops early when the remainder drops fast
        let missing = (delta + 1).saturating_sub(u32::try_from(steps).map_err(|_| ErrorKind::LengthOverflow)?);
        let r = r.scalar_mul(&lead(&v).pow(missing))?;
        let scale = &g * &h.pow(delta);
        u = std::mem::replace(&mut v, r.scalar_divexact(&scale)?);
        g = lead(&u);
        if delta > 0 {
            h = g.pow(delta).divexact(&h.pow(delta - 1))?;
        }
    }
    positive_lead(v.primitive_part()?).scalar_mul(&d)
}

/// GCD by reduction modulo word primes.
///
/// The content GCD is split off first. Primes where a leading coefficient
/// vanishes, or whose image has too large a degree, are skipped; past
/// `MAX_UNLUCKY_PRIMES` of those the subresultant algorithm takes over.
pub fn gcd_modular(a: &IntPoly, b: &IntPoly) -> Result<IntPoly> {
    if let Some(g) = trivial_gcd(a, b) {
        return Ok(g);
    }
    let d = a.content().gcd(&b.content());
    let (pa, pb) = (a.primitive_part()?, b.primitive_part()?);
    if pa.len() == 1 || pb.len() == 1 {
        return IntPoly::constant(&d);
    }
    let lead_gcd = lead(&pa).gcd(&lead(&pb));
    let mut primes = PrimeStream::new();
    let mut unlucky = 0usize;
    let mut lifted: Option<(IntPoly, ZInt)> = None;
    loop {
        let p = primes.next_prime()?;
        let scale = lead_gcd.mod_ui(p)?;
        if lead(&pa).mod_ui(p)? == 0 || lead(&pb).mod_ui(p)? == 0 {
            unlucky += 1;
        } else {
            let mut image = zpoly_nmod::gcd::gcd(&pa.reduce_mod(p)?, &pb.reduce_mod(p)?)?;
            trace!(p, degree = image.len() - 1, "gcd image");
            if image.len() == 1 {
                return IntPoly::constant(&d);
            }
            image.scalar_mul_assign(scale);
            lifted = match lifted {
                Some((h, m)) if image.len() == h.len() => {
                    let (next, stable) = h.crt(&m, &image)?;
                    if stable {
                        let candidate = positive_lead(next.primitive_part()?);
                        if divides(&pa, &candidate)?.is_some() && divides(&pb, &candidate)?.is_some() {
                            debug!(modulus_bits = m.bits(), "modular gcd confirmed");
                            return candidate.scalar_mul(&d);
                        }
                    }
                    Some((next, m.mul_u64(p)))
                }
                Some((h, m)) if image.len() > h.len() => {
                    unlucky += 1;
                    Some((h, m))
                }
                _ => Some((IntPoly::lift(&image, true)?, ZInt::from(p))),
            };
        }
        if unlucky > MAX_UNLUCKY_PRIMES {
            warn!(unlucky, "too many unlucky primes, using the subresultant gcd");
            return gcd_subresultant(a, b);
        }
    }
}

/// Greatest common divisor with a positive leading coefficient;
/// `gcd(0, 0) = 0`.
pub fn gcd(a: &IntPoly, b: &IntPoly) -> Result<IntPoly> {
    if a.len().max(b.len()) <= GCD_SUBRESULTANT_CUTOFF {
        gcd_subresultant(a, b)
    } else {
        gcd_modular(a, b)
    }
}

/// Bits of the Hadamard bound on any minor of the Sylvester matrix of
/// `a` and `b`.
fn hadamard_bits(a: &IntPoly, b: &IntPoly) -> Result<usize> {
    let one = ZInt::one();
    let na = (&a.norm2()? + &one).bits();
    let nb = (&b.norm2()? + &one).bits();
    Ok((b.len() - 1) * na + (a.len() - 1) * nb)
}

/// Enough primes for a balanced reconstruction of values below `2^bits`,
/// avoiding those dividing `avoid`.
fn collect_primes(bits: usize, avoid: &ZInt) -> Result<Vec<u64>> {
    let count = (bits + 2).div_ceil(PRIME_SAFE_BITS);
    let mut stream = PrimeStream::new();
    let mut out = Vec::with_capacity(count);
    let mut unlucky = 0usize;
    while out.len() < count {
        let p = stream.next_prime()?;
        if avoid.mod_ui(p)? == 0 {
            unlucky += 1;
            warn!(p, unlucky, "skipping unlucky prime");
        } else {
            out.push(p);
        }
    }
    Ok(out)
}

/// Rebuild the polynomial of length `len` from images modulo `comb`'s primes.
fn lift_images(comb: &Comb, images: &[ModPoly], len: usize) -> Result<IntPoly> {
    let coeffs = (0..len)
        .into_par_iter()
        .map(|i| {
            let residues: Vec<u64> = images.iter().map(|m| m.coeff(i)).collect();
            comb.reconstruct(&residues, true)
        })
        .collect::<Result<Vec<_>>>()?;
    IntPoly::from_zints(&coeffs)
}

/// Resultant of `a` and `b`; zero if either is zero, and `c^deg(b)` for a
/// constant `a = c`.
pub fn resultant(a: &IntPoly, b: &IntPoly) -> Result<ZInt> {
    if a.is_zero() || b.is_zero() {
        return Ok(ZInt::zero());
    }
    let bits = hadamard_bits(a, b)?;
    let primes = collect_primes(bits, &(&lead(a) * &lead(b)))?;
    debug!(bits, primes = primes.len(), "modular resultant");
    let residues = primes
        .par_iter()
        .map(|&p| zpoly_nmod::gcd::resultant(&a.reduce_mod(p)?, &b.reduce_mod(p)?))
        .collect::<Result<Vec<_>>>()?;
    Comb::new(&primes)?.reconstruct(&residues, true)
}

/// `(r, s, t)` with `s a + t b = r`, `r` the resultant of `a` and `b`,
/// `deg s < deg b` and `deg t < deg a`.
///
/// When `r = 0` all three are zero. Two constants admit no such `s` and
/// `t` and give `NotCoprime`.
pub fn xgcd(a: &IntPoly, b: &IntPoly) -> Result<(ZInt, IntPoly, IntPoly)> {
    if a.is_zero() || b.is_zero() {
        return Ok((ZInt::zero(), IntPoly::new(), IntPoly::new()));
    }
    match (a.len(), b.len()) {
        (1, 1) => return Err(ErrorKind::NotCoprime),
        (1, _) => {
            let c = lead(a);
            let e = degree_u32(b)?;
            return Ok((c.pow(e), IntPoly::constant(&c.pow(e - 1))?, IntPoly::new()));
        }
        (_, 1) => {
            let c = lead(b);
            let e = degree_u32(a)?;
            return Ok((c.pow(e), IntPoly::new(), IntPoly::constant(&c.pow(e - 1))?));
        }
        _ => {}
    }
    let r = resultant(a, b)?;
    if r.is_zero() {
        return Ok((r, IntPoly::new(), IntPoly::new()));
    }
    let bits = hadamard_bits(a, b)?;
    let primes = collect_primes(bits, &(&(&lead(a) * &lead(b)) * &r))?;
    debug!(bits, primes = primes.len(), "modular xgcd");
    let images = primes
        .par_iter()
        .map(|&p| {
            let (g, mut s, mut t) = zpoly_nmod::gcd::xgcd(&a.reduce_mod(p)?, &b.reduce_mod(p)?)?;
            debug_assert!(g.is_one());
            let rp = r.mod_ui(p)?;
            s.scalar_mul_assign(rp);
            t.scalar_mul_assign(rp);
            Ok((s, t))
        })
        .collect::<Result<Vec<_>>>()?;
    let (s_images, t_images): (Vec<_>, Vec<_>) = images.into_iter().unzip();
    let comb = Comb::new(&primes)?;
    let s = lift_images(&comb, &s_images, b.len() - 1)?;
    let t = lift_images(&comb, &t_images, a.len() - 1)?;
    Ok((r, s, t))
}

/// `(d, H)` with `H a = d (mod f)` and `d` the resultant of `a` and `f`.
pub fn invmod(a: &IntPoly, f: &IntPoly) -> Result<(ZInt, IntPoly)> {
    if f.is_zero() {
        return Err(ErrorKind::DivisionByZero);
    }
    let (d, h, _) = xgcd(a, f)?;
    if d.is_zero() {
        return Err(ErrorKind::NotCoprime);
    }
    Ok((d, h))
}

impl IntPoly {
    /// See [`gcd`].
    pub fn gcd(&self, other: &Self) -> Result<Self> {
        gcd(self, other)
    }

    /// See [`resultant`].
    pub fn resultant(&self, other: &Self) -> Result<ZInt> {
        resultant(self, other)
    }
}
