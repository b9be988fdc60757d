//! Derivative, irreducibility, square-free decomposition and Berlekamp
//! factorisation over a prime field.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use zpoly_mpn::ulong::{addmod, invmod, is_prime, negmod, prime_divisors, submod};
use zpoly_mpn::{ErrorKind, Result};

use crate::div::{div, mulmod, powmod_unsigned};
use crate::gcd::gcd;
use crate::poly::ModPoly;

/// Seed of the generator behind [`berlekamp`] and [`factor`].
pub const BERLEKAMP_SEED: u64 = 0x5eed_b3e1_ecab_0001;

/// Irreducible factors with their multiplicities.
pub type FactorList = Vec<(ModPoly, usize)>;

fn require_prime(f: &ModPoly) -> Result<()> {
    if is_prime(f.modulus()) {
        Ok(())
    } else {
        Err(ErrorKind::ModulusInvalid)
    }
}

/// Formal derivative.
pub fn derivative(f: &ModPoly) -> ModPoly {
    let pre = f.preinv();
    let coeffs = f
        .coeffs()
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, &c)| pre.mulmod(c, pre.reduce(i as u64)))
        .collect();
    f.from_raw(coeffs)
}

/// `g` with `g^p = f`, for `f` whose derivative vanishes.
fn pth_root(f: &ModPoly) -> Result<ModPoly> {
    let p = usize::try_from(f.modulus()).map_err(|_| ErrorKind::LengthOverflow)?;
    Ok(f.from_raw(f.coeffs().iter().step_by(p).copied().collect()))
}

/// Rabin's test: `f` of degree `d` is irreducible iff `x^(p^d) = x mod f`
/// and `gcd(x^(p^(d/r)) - x, f) = 1` for every prime `r | d`.
#[allow(clippy::cast_possible_truncation)]
pub fn is_irreducible(f: &ModPoly) -> Result<bool> {
    require_prime(f)?;
    if f.len() <= 1 {
        return Ok(false);
    }
    if f.len() == 2 {
        return Ok(true);
    }
    let f = f.monic()?;
    let d = f.len() - 1;
    let x = f.monomial_like(1, 1)?;
    let checks: Vec<usize> = prime_divisors(d as u64).into_iter().map(|r| d / r as usize).collect();
    let mut cur = x.clone();
    for k in 1..=d {
        cur = powmod_unsigned(&cur, f.modulus(), &f)?;
        if checks.contains(&k) && !gcd(&cur.sub(&x), &f)?.is_one() {
            return Ok(false);
        }
    }
    Ok(cur == x)
}

/// Square-free decomposition of the monic associate of `f`: pairs
/// `(g, e)` with each `g` square-free, monic and pairwise coprime, and
/// `f = lead(f) * prod g^e`.
pub fn squarefree(f: &ModPoly) -> Result<FactorList> {
    require_prime(f)?;
    let mut out = Vec::new();
    if f.len() > 1 {
        squarefree_into(&f.monic()?, 1, &mut out)?;
    }
    Ok(out)
}

fn squarefree_into(f: &ModPoly, mult: usize, out: &mut FactorList) -> Result<()> {
    if f.len() <= 1 {
        return Ok(());
    }
    let p = usize::try_from(f.modulus()).unwrap_or(usize::MAX);
    let d = derivative(f);
    if d.is_zero() {
        return squarefree_into(&pth_root(f)?, mult * p, out);
    }
    let g = gcd(f, &d)?;
    let mut w = div(f, &g)?;
    let mut c = g;
    let mut i = 1;
    while !w.is_one() {
        let y = gcd(&w, &c)?;
        let z = div(&w, &y)?;
        if !z.is_one() {
            out.push((z, i * mult));
        }
        i += 1;
        c = div(&c, &y)?;
        w = y;
    }
    if !c.is_one() {
        squarefree_into(&pth_root(&c)?, mult * p, out)?;
    }
    Ok(())
}

/// Reduced row echelon form in place; returns the pivot columns.
fn row_reduce(m: &mut [Vec<u64>], f: &ModPoly) -> Result<Vec<usize>> {
    let (p, pre) = (f.modulus(), *f.preinv());
    let cols = m.first().map_or(0, Vec::len);
    let mut pivots = Vec::new();
    let mut row = 0;
    for col in 0..cols {
        let Some(r) = (row..m.len()).find(|&r| m[r][col] != 0) else {
            continue;
        };
        m.swap(row, r);
        let inv = invmod(m[row][col], p)?;
        for x in &mut m[row] {
            *x = pre.mulmod(*x, inv);
        }
        let pivot = m[row].clone();
        for (i, other) in m.iter_mut().enumerate() {
            let c = other[col];
            if i == row || c == 0 {
                continue;
            }
            for (x, &y) in other.iter_mut().zip(&pivot) {
                *x = submod(*x, pre.mulmod(c, y), p);
            }
        }
        pivots.push(col);
        row += 1;
    }
    Ok(pivots)
}

/// Basis of `{h : h^p = h mod f}` as polynomials of degree below `deg f`.
fn berlekamp_basis(f: &ModPoly) -> Result<Vec<ModPoly>> {
    let (p, d) = (f.modulus(), f.len() - 1);
    let xp = powmod_unsigned(&f.monomial_like(1, 1)?, p, f)?;
    // column i of (Q - I) is x^(p i) mod f minus x^i
    let mut m = vec![vec![0u64; d]; d];
    let mut col = f.monomial_like(1, 0)?;
    for i in 0..d {
        for (j, row) in m.iter_mut().enumerate() {
            row[i] = col.coeff(j);
        }
        m[i][i] = submod(m[i][i], 1, p);
        col = mulmod(&col, &xp, f)?;
    }
    let pivots = row_reduce(&mut m, f)?;
    let basis = (0..d)
        .filter(|c| !pivots.contains(c))
        .map(|free| {
            let mut v = vec![0u64; d];
            v[free] = 1;
            for (r, &pc) in pivots.iter().enumerate() {
                v[pc] = negmod(m[r][free], p);
            }
            f.from_raw(v)
        })
        .collect();
    Ok(basis)
}

/// Irreducible monic factors of a square-free `f`, split with a generator
/// seeded from [`BERLEKAMP_SEED`].
pub fn berlekamp(f: &ModPoly) -> Result<Vec<ModPoly>> {
    let mut rng = ChaCha8Rng::seed_from_u64(BERLEKAMP_SEED);
    berlekamp_with_rng(f, &mut rng)
}

/// Berlekamp factorisation with a caller-supplied generator.
///
/// The null space of `Q - I` has one dimension per irreducible factor.
/// Random elements `h` of it split the current factors: over `F_2` by
/// `gcd(q, h - a)`, over odd `p` by `gcd(q, (h + a)^((p - 1) / 2) - 1)`, for
/// random `a`.
pub fn berlekamp_with_rng<R: Rng + ?Sized>(f: &ModPoly, rng: &mut R) -> Result<Vec<ModPoly>> {
    require_prime(f)?;
    if f.len() <= 1 {
        return Ok(Vec::new());
    }
    let f = f.monic()?;
    if f.len() == 2 {
        return Ok(vec![f]);
    }
    let basis = berlekamp_basis(&f)?;
    let k = basis.len();
    let p = f.modulus();
    tracing::debug!(degree = f.len() - 1, factors = k, "berlekamp null space");

    let mut factors = vec![f.clone()];
    let mut rounds = 0u32;
    while factors.len() < k {
        rounds += 1;
        let mut h = f.zero_like();
        for b in &basis {
            h.add_assign(&b.scalar_mul(rng.random_range(0..p)));
        }
        if h.len() < 2 {
            continue;
        }
        let mut next = Vec::with_capacity(factors.len() + 1);
        for q in factors {
            if q.len() <= 2 {
                next.push(q);
                continue;
            }
            let a = rng.random_range(0..p);
            let t = if p == 2 {
                let mut t = h.clone();
                t.set_coeff(0, addmod(t.coeff(0), a, p))?;
                t
            } else {
                let mut shifted = h.clone();
                shifted.set_coeff(0, addmod(shifted.coeff(0), a, p))?;
                let mut t = powmod_unsigned(&shifted, (p - 1) / 2, &q)?;
                t.set_coeff(0, submod(t.coeff(0), 1, p))?;
                t
            };
            let g = gcd(&q, &t)?;
            if g.len() > 1 && g.len() < q.len() {
                next.push(div(&q, &g)?.monic()?);
                next.push(g);
            } else {
                next.push(q);
            }
        }
        factors = next;
    }
    tracing::trace!(rounds, "berlekamp splitting done");
    sort_factors(&mut factors);
    Ok(factors)
}

fn sort_factors(factors: &mut [ModPoly]) {
    factors.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.coeffs().cmp(b.coeffs())));
}

/// Complete factorisation: the leading coefficient of `f` and its monic
/// irreducible factors with multiplicities, ordered by degree.
pub fn factor(f: &ModPoly) -> Result<(u64, FactorList)> {
    require_prime(f)?;
    let unit = f.lead();
    let mut rng = ChaCha8Rng::seed_from_u64(BERLEKAMP_SEED);
    let mut out = Vec::new();
    for (g, e) in squarefree(f)? {
        for h in berlekamp_with_rng(&g, &mut rng)? {
            out.push((h, e));
        }
    }
    out.sort_by(|(a, ea), (b, eb)| {
        a.len()
            .cmp(&b.len())
            .then_with(|| a.coeffs().cmp(b.coeffs()))
            .then_with(|| ea.cmp(eb))
    });
    Ok((unit, out))
}
