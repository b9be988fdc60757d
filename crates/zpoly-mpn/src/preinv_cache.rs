//! Process-wide cache of precomputed reciprocals.
//!
//! Append-only: entries are never replaced or evicted, so a reciprocal read
//! by one thread stays valid for every other. Readers share an `RwLock`.

use std::collections::HashMap;
use std::sync::LazyLock;

use parking_lot::RwLock;

use crate::div::PreInv;
use crate::error::Result;

/// Maximum number of cached moduli; past this, reciprocals are computed
/// on the fly without being stored.
pub const MAX_CACHED_MODULI: usize = 4096;

static CACHE: LazyLock<RwLock<HashMap<u64, PreInv>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Reciprocal for `d`, from the cache if present.
pub fn preinv_for(d: u64) -> Result<PreInv> {
    if let Some(pre) = CACHE.read().get(&d) {
        return Ok(*pre);
    }
    let pre = PreInv::new(d)?;
    let mut cache = CACHE.write();
    if cache.len() < MAX_CACHED_MODULI {
        cache.entry(d).or_insert(pre);
    }
    Ok(pre)
}

/// Number of cached moduli.
#[must_use]
pub fn cached_moduli() -> usize {
    CACHE.read().len()
}
