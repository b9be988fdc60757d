//! Serializable tuning profiles for the engine crossovers.
//!
//! A profile is plain JSON written and read at paths chosen by the caller;
//! nothing is looked up implicitly.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::options::MulOptions;

/// Current profile format version.
pub const PROFILE_VERSION: u32 = 1;

/// Measured crossovers for one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuningProfile {
    /// Profile format version for compatibility checking.
    pub version: u32,
    /// Total length up to which the classical product runs.
    pub classical_cutoff: usize,
    /// Total length up to which Karatsuba runs.
    pub karatsuba_cutoff: usize,
    /// Combined coefficient limbs up to which Kronecker substitution runs.
    pub ks_max_limbs: usize,
    /// Multiplier in the Schönhage–Strassen test.
    pub ss_bits_factor: usize,
    /// Divisor length for divide-and-conquer division.
    pub divconquer_cutoff: usize,
    /// Quotient length for Newton division.
    pub newton_cutoff: usize,
    /// Free-form description of where the numbers came from.
    #[serde(default)]
    pub label: String,
}

impl Default for TuningProfile {
    fn default() -> Self {
        Self::from_options(&MulOptions::default())
    }
}

impl TuningProfile {
    /// Capture a set of options.
    #[must_use]
    pub fn from_options(opts: &MulOptions) -> Self {
        Self {
            version: PROFILE_VERSION,
            classical_cutoff: opts.classical_cutoff,
            karatsuba_cutoff: opts.karatsuba_cutoff,
            ks_max_limbs: opts.ks_max_limbs,
            ss_bits_factor: opts.ss_bits_factor,
            divconquer_cutoff: opts.divconquer_cutoff,
            newton_cutoff: opts.newton_cutoff,
            label: String::new(),
        }
    }

    /// Check if this profile is compatible with the current version.
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        self.version == PROFILE_VERSION
    }

    /// Validate that thresholds are within reasonable bounds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.classical_cutoff > 0
            && self.karatsuba_cutoff >= self.classical_cutoff
            && self.ks_max_limbs > 0
            && self.ss_bits_factor > 0
            && self.divconquer_cutoff > 1
            && self.newton_cutoff >= self.divconquer_cutoff
    }

    /// Options carrying these thresholds.
    #[must_use]
    pub fn to_options(&self) -> MulOptions {
        MulOptions {
            classical_cutoff: self.classical_cutoff,
            karatsuba_cutoff: self.karatsuba_cutoff,
            ks_max_limbs: self.ks_max_limbs,
            ss_bits_factor: self.ss_bits_factor,
            divconquer_cutoff: self.divconquer_cutoff,
            newton_cutoff: self.newton_cutoff,
        }
        .normalize()
    }
}

/// Save a profile as pretty-printed JSON.
pub fn save_to_path(p: &TuningProfile, path: &Path) -> std::io::Result<()> {
    let content = serde_json::to_string_pretty(p).map_err(std::io::Error::other)?;
    std::fs::write(path, content)
}

/// Load a profile, or `None` if the file is missing or malformed.
#[must_use]
pub fn load_from_path(path: &Path) -> Option<TuningProfile> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(p) => Some(p),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "malformed tuning profile");
            None
        }
    }
}

/// Load a profile and check it. Returns `None` if the profile is
/// incompatible or its thresholds are inconsistent.
#[must_use]
pub fn load_validated(path: &Path) -> Option<TuningProfile> {
    let p = load_from_path(path)?;
    if !p.is_compatible() {
        tracing::warn!(version = p.version, "tuning profile version mismatch, ignoring it");
        return None;
    }
    if !p.is_valid() {
        tracing::warn!("tuning profile has invalid thresholds, ignoring it");
        return None;
    }
    tracing::info!(path = %path.display(), label = %p.label, "loaded tuning profile");
    Some(p)
}

/// Options from the profile at `path`, or the defaults.
#[must_use]
pub fn options_from_path(path: &Path) -> MulOptions {
    load_validated(path).map_or_else(MulOptions::default, |p| p.to_options())
}
