//! Engine selection options.

use crate::constants::{
    DEFAULT_CLASSICAL_CUTOFF, DEFAULT_DIVCONQUER_CUTOFF, DEFAULT_KARATSUBA_CUTOFF, DEFAULT_KS_MAX_LIMBS,
    DEFAULT_NEWTON_CUTOFF, DEFAULT_SS_BITS_FACTOR,
};

/// Crossovers used by the multiplication and division dispatchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MulOptions {
    /// Total length up to which the classical product runs.
    pub classical_cutoff: usize,
    /// Total length up to which Karatsuba runs.
    pub karatsuba_cutoff: usize,
    /// Combined coefficient limbs up to which Kronecker substitution runs.
    pub ks_max_limbs: usize,
    /// Multiplier on `bits1 + bits2` in the Schönhage–Strassen test.
    pub ss_bits_factor: usize,
    /// Divisor length from which divide-and-conquer division runs.
    pub divconquer_cutoff: usize,
    /// Quotient length from which Newton division runs.
    pub newton_cutoff: usize,
}

impl Default for MulOptions {
    fn default() -> Self {
        Self {
            classical_cutoff: DEFAULT_CLASSICAL_CUTOFF,
            karatsuba_cutoff: DEFAULT_KARATSUBA_CUTOFF,
            ks_max_limbs: DEFAULT_KS_MAX_LIMBS,
            ss_bits_factor: DEFAULT_SS_BITS_FACTOR,
            divconquer_cutoff: DEFAULT_DIVCONQUER_CUTOFF,
            newton_cutoff: DEFAULT_NEWTON_CUTOFF,
        }
    }
}

impl MulOptions {
    /// Normalize options, applying defaults where values are zero.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.classical_cutoff == 0 {
            self.classical_cutoff = DEFAULT_CLASSICAL_CUTOFF;
        }
        if self.karatsuba_cutoff == 0 {
            self.karatsuba_cutoff = DEFAULT_KARATSUBA_CUTOFF;
        }
        if self.ks_max_limbs == 0 {
            self.ks_max_limbs = DEFAULT_KS_MAX_LIMBS;
        }
        if self.ss_bits_factor == 0 {
            self.ss_bits_factor = DEFAULT_SS_BITS_FACTOR;
        }
        if self.divconquer_cutoff == 0 {
            self.divconquer_cutoff = DEFAULT_DIVCONQUER_CUTOFF;
        }
        if self.newton_cutoff == 0 {
            self.newton_cutoff = DEFAULT_NEWTON_CUTOFF;
        }
        self
    }
}
