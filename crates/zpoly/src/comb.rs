//! Product tree over a list of word primes, for multi-modular reduction and
//! reconstruction of integers.
//!
//! Level 0 holds the primes; each level above pairs neighbours and keeps
//! their product, an unpaired last node being carried up unchanged. For
//! every pair the tree also keeps the inverse of the left product modulo the
//! right one, which is what a bottom-up Garner combination needs. The tree
//! is built on first use and grown in place when primes are appended.

use std::sync::OnceLock;

use rayon::prelude::*;
use tracing::debug;
use zpoly_mpn::ulong::gcd;
use zpoly_mpn::{ErrorKind, Result};

use crate::integer::ZInt;

#[derive(Debug, Clone)]
struct Tree {
    levels: Vec<Vec<ZInt>>,
    inverses: Vec<Vec<ZInt>>,
}

impl Tree {
    fn build(primes: &[u64]) -> Result<Self> {
        let mut tree = Self {
            levels: vec![Vec::new()],
            inverses: Vec::new(),
        };
        tree.extend(primes)?;
        debug!(primes = primes.len(), levels = tree.levels.len(), "built product tree");
        Ok(tree)
    }

    /// Append primes, recomputing only the nodes they affect.
    fn extend(&mut self, primes: &[u64]) -> Result<()> {
        let mut changed = self.levels[0].len();
        self.levels[0].extend(primes.iter().map(|&p| ZInt::from(p)));
        let mut k = 0;
        while self.levels[k].len() > 1 {
            if self.levels.len() == k + 1 {
                self.levels.push(Vec::new());
            }
            if self.inverses.len() == k {
                self.inverses.push(Vec::new());
            }
            let start = changed / 2;
            let below = &self.levels[k];
            let mut products = Vec::with_capacity(below.len().div_ceil(2) - start);
            let mut inverses = Vec::with_capacity(below.len() / 2 - start.min(below.len() / 2));
            for i in start..below.len().div_ceil(2) {
                match below.get(2 * i + 1) {
                    Some(right) => {
                        let left = &below[2 * i];
                        products.push(left * right);
                        inverses.push(left.invmod(right)?);
                    }
                    None => products.push(below[2 * i].clone()),
                }
            }
            self.levels[k + 1].truncate(start);
            self.levels[k + 1].extend(products);
            self.inverses[k].truncate(start);
            self.inverses[k].extend(inverses);
            changed = start;
            k += 1;
        }
        self.levels.truncate(k + 1);
        self.inverses.truncate(k);
        Ok(())
    }

    fn top(&self) -> ZInt {
        self.levels
            .last()
            .and_then(|l| l.first())
            .cloned()
            .unwrap_or_else(ZInt::one)
    }
}

/// A lazily built product tree over pairwise coprime word moduli.
#[derive(Debug, Clone, Default)]
pub struct Comb {
    primes: Vec<u64>,
    tree: OnceLock<Result<Tree>>,
}

/// `NotCoprime` unless `p` is coprime to everything in `existing`.
fn check_coprime(existing: &[u64], p: u64) -> Result<()> {
    if p < 2 {
        return Err(ErrorKind::ModulusInvalid);
    }
    if existing.iter().any(|&q| gcd(p, q) != 1) {
        return Err(ErrorKind::NotCoprime);
    }
    Ok(())
}

impl Comb {
    /// A comb over `primes`, which must be at least 2 and pairwise coprime.
    pub fn new(primes: &[u64]) -> Result<Self> {
        let mut comb = Self::default();
        comb.push_primes(primes)?;
        Ok(comb)
    }

    /// Append moduli. A tree that was already built is extended rather than
    /// rebuilt. Rejected moduli leave the comb unchanged.
    pub fn push_primes(&mut self, primes: &[u64]) -> Result<()> {
        for (i, &p) in primes.iter().enumerate() {
            check_coprime(&self.primes, p)?;
            check_coprime(&primes[..i], p)?;
        }
        let stale = match self.tree.get_mut() {
            Some(Ok(tree)) => tree.extend(primes).is_err(),
            Some(Err(_)) => true,
            None => false,
        };
        if stale {
            self.tree = OnceLock::new();
        }
        self.primes.extend_from_slice(primes);
        Ok(())
    }

    #[must_use]
    pub fn primes(&self) -> &[u64] {
        &self.primes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.primes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }

    fn tree(&self) -> Result<&Tree> {
        self.tree
            .get_or_init(|| Tree::build(&self.primes))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// The product of all moduli; one for an empty comb.
    pub fn modulus(&self) -> Result<ZInt> {
        Ok(self.tree()?.top())
    }

    /// Residues of `x` modulo every prime, each in `[0, p)`.
    pub fn reduce(&self, x: &ZInt) -> Result<Vec<u64>> {
        let tree = self.tree()?;
        if self.primes.is_empty() {
            return Ok(Vec::new());
        }
        let mut values = vec![x.fdiv_qr(&tree.top())?.1];
        for level in tree.levels[..tree.levels.len() - 1].iter().skip(1).rev() {
            values = level
                .par_iter()
                .enumerate()
                .map(|(j, m)| Ok(values[j / 2].fdiv_qr(m)?.1))
                .collect::<Result<Vec<_>>>()?;
        }
        self.primes
            .par_iter()
            .enumerate()
            .map(|(j, &p)| values[j / 2].mod_ui(p))
            .collect()
    }

    /// The integer congruent to `residues[i]` modulo `primes[i]` for every
    /// `i`, in `[0, M)` or, if `balanced`, in `[-M/2, M/2)`.
    pub fn reconstruct(&self, residues: &[u64], balanced: bool) -> Result<ZInt> {
        if residues.len() != self.primes.len() {
            return Err(ErrorKind::LengthOverflow);
        }
        let tree = self.tree()?;
        let mut values: Vec<ZInt> = residues
            .iter()
            .zip(&self.primes)
            .map(|(&r, &p)| ZInt::from(r % p))
            .collect();
        for (k, inverses) in tree.inverses.iter().enumerate() {
            let moduli = &tree.levels[k];
            values = values
                .par_chunks(2)
                .enumerate()
                .map(|(i, pair)| match pair {
                    [a, b] => {
                        let (ma, mb) = (&moduli[2 * i], &moduli[2 * i + 1]);
                        let t = (b - a).try_mul(&inverses[i])?.fdiv_qr(mb)?.1;
                        Ok(a + &ma.try_mul(&t)?)
                    }
                    _ => Ok(pair[0].clone()),
                })
                .collect::<Result<Vec<_>>>()?;
        }
        let mut x = values.pop().unwrap_or_default();
        let m = tree.top();
        if balanced && x.mul_u64(2) >= m {
            x -= &m;
        }
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn primes(n: usize) -> Vec<u64> {
        let mut out = Vec::new();
        let mut p = 1u64 << 62;
        for _ in 0..n {
            p = zpoly_mpn::ulong::prev_prime(p).unwrap();
            out.push(p);
        }
        out
    }

    #[test]
    fn small_moduli() {
        let comb = Comb::new(&[5, 7, 11]).unwrap();
        assert_eq!(comb.modulus().unwrap(), ZInt::from(385i64));
        assert_eq!(comb.reduce(&ZInt::from(-3i64)).unwrap(), vec![2, 4, 8]);
        assert_eq!(comb.reconstruct(&[2, 4, 8], true).unwrap(), ZInt::from(-3i64));
        assert_eq!(comb.reconstruct(&[2, 4, 8], false).unwrap(), ZInt::from(382i64));
    }

    #[test]
    fn reduce_then_reconstruct() {
        let ps = primes(13);
        let comb = Comb::new(&ps).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..8 {
            let x = ZInt::random_signed(&mut rng, 61 * 13);
            let r = comb.reduce(&x).unwrap();
            assert!(r.iter().zip(&ps).all(|(&a, &p)| a < p));
            assert_eq!(comb.reconstruct(&r, true).unwrap(), x);
        }
    }

    #[test]
    fn growing_matches_building_at_once() {
        let ps = primes(11);
        let mut grown = Comb::new(&ps[..4]).unwrap();
        let _ = grown.modulus().unwrap();
        grown.push_primes(&ps[4..7]).unwrap();
        grown.push_primes(&ps[7..]).unwrap();
        let whole = Comb::new(&ps).unwrap();
        assert_eq!(grown.modulus().unwrap(), whole.modulus().unwrap());
        let x = ZInt::from(-123_456_789i64).pow(9);
        assert_eq!(grown.reduce(&x).unwrap(), whole.reduce(&x).unwrap());
        assert_eq!(grown.reconstruct(&whole.reduce(&x).unwrap(), true).unwrap(), x);
    }

    #[test]
    fn rejects_bad_moduli() {
        assert_eq!(Comb::new(&[5, 1]).unwrap_err(), ErrorKind::ModulusInvalid);
        assert_eq!(Comb::new(&[6, 9]).unwrap_err(), ErrorKind::NotCoprime);
        let mut comb = Comb::new(&[5, 7]).unwrap();
        assert_eq!(comb.push_primes(&[11, 14]), Err(ErrorKind::NotCoprime));
        assert_eq!(comb.primes(), &[5, 7]);
        assert_eq!(comb.reconstruct(&[1], true), Err(ErrorKind::LengthOverflow));
    }

    #[test]
    fn empty_and_single() {
        let empty = Comb::new(&[]).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.modulus().unwrap(), ZInt::one());
        assert!(empty.reduce(&ZInt::from(9i64)).unwrap().is_empty());
        assert!(empty.reconstruct(&[], true).unwrap().is_zero());
        let one = Comb::new(&[13]).unwrap();
        assert_eq!(one.reconstruct(&[12], true).unwrap(), ZInt::from(-1i64));
        assert_eq!(one.reduce(&ZInt::from(27i64)).unwrap(), vec![1]);
    }
}
