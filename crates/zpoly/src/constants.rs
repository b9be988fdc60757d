//! Crossover thresholds and tuning tables for the integer polynomial engines.

/// Total operand length up to which the classical product is used.
pub const DEFAULT_CLASSICAL_CUTOFF: usize = 6;

/// Total operand length up to which Karatsuba is preferred over packing.
pub const DEFAULT_KARATSUBA_CUTOFF: usize = 32;

/// Combined coefficient width (in limbs) up to which Kronecker substitution
/// is used regardless of length.
pub const DEFAULT_KS_MAX_LIMBS: usize = 8;

/// Schönhage–Strassen is chosen when `factor * (bits1 + bits2)` reaches the
/// total operand length.
pub const DEFAULT_SS_BITS_FACTOR: usize = 3;

/// Divisor length from which divide-and-conquer division is used.
pub const DEFAULT_DIVCONQUER_CUTOFF: usize = 16;

/// Quotient length from which the quotient-only path goes through a
/// Newton inverse.
pub const DEFAULT_NEWTON_CUTOFF: usize = 96;

/// Unlucky primes tolerated by one modular GCD or resultant before giving up.
pub const MAX_UNLUCKY_PRIMES: usize = 64;

/// Bit size of the word primes used by the modular algorithms.
pub const MODULAR_PRIME_BITS: u32 = 62;

/// Operand length up to which `gcd` uses the subresultant algorithm.
pub const GCD_SUBRESULTANT_CUTOFF: usize = 4;

/// A step function from a size to a threshold.
///
/// Entries are `(upper_size, value)` in increasing order of `upper_size`.
/// Sizes below the first entry take its value; sizes past the last entry
/// take `fallback`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuningTable {
    entries: &'static [(usize, usize)],
    fallback: usize,
}

impl TuningTable {
    /// Build a table from sorted entries and the value used past the end.
    #[must_use]
    pub const fn new(entries: &'static [(usize, usize)], fallback: usize) -> Self {
        Self { entries, fallback }
    }

    /// Value for `size`.
    #[must_use]
    pub fn lookup(&self, size: usize) -> usize {
        self.entries
            .iter()
            .find(|&&(limit, _)| size <= limit)
            .map_or(self.fallback, |&(_, v)| v)
    }

    /// The table entries.
    #[must_use]
    pub fn entries(&self) -> &'static [(usize, usize)] {
        self.entries
    }

    /// Value past the last entry.
    #[must_use]
    pub fn fallback(&self) -> usize {
        self.fallback
    }
}

/// Karatsuba base case: shorter operand length below which the recursion
/// switches to the classical product, by coefficient width in limbs.
pub const KARATSUBA_BASE_TABLE: TuningTable = TuningTable::new(&[(1, 16), (2, 12), (4, 8), (16, 6)], 4);

/// Same as [`KARATSUBA_BASE_TABLE`] for squaring.
pub const KARATSUBA_SQR_BASE_TABLE: TuningTable = TuningTable::new(&[(1, 20), (2, 14), (4, 10), (16, 7)], 5);
