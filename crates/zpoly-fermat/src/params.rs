//! Choice of transform depth, ring width and bundle size.

use zpoly_mpn::ulong::clog2;

/// Upper bound on the bundle size (log2) by total operand size in limbs,
/// for products of distinct operands. Sizes past the last entry use it.
pub const MUL_TWK: &[(usize, u32)] = &[(512, 0), (4096, 1), (32_768, 2), (262_144, 3), (usize::MAX, 4)];

/// Same as [`MUL_TWK`] for squaring, where one transform is saved.
pub const SQR_TWK: &[(usize, u32)] = &[(768, 0), (6144, 1), (49_152, 2), (393_216, 3), (usize::MAX, 4)];

/// Parameters for one Fermat-ring convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FftParams {
    /// Log2 of the transform length.
    pub depth: u32,
    /// Ring width in limbs.
    pub n: usize,
    /// Source coefficients packed into each ring coefficient.
    pub bundle: usize,
}

/// Smallest width `>= n` that admits a transform of `2^depth` points.
#[must_use]
pub fn round_n(n: usize, depth: u32, negacyclic: bool) -> usize {
    let need = depth + u32::from(negacyclic);
    let n = n.max(1);
    if need <= 8 {
        n
    } else {
        let m = 1usize << (need - 8);
        n.div_ceil(m) * m
    }
}

/// Bundle-size limit for `total` limbs of input.
fn max_bundle_log(table: &[(usize, u32)], total: usize) -> u32 {
    table
        .iter()
        .find(|&&(limit, _)| total <= limit)
        .map_or(0, |&(_, log)| log)
}

/// Pick parameters for a product of `len1` by `len2` coefficients whose
/// outputs each need `field_limbs` limbs (sign included).
///
/// Bundling `b` coefficients shortens the transform by a factor `b` at the
/// price of `2b - 1` fields per ring coefficient; the cheapest estimated
/// choice under the table limit wins.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn select_params(len1: usize, len2: usize, field_limbs: usize, squaring: bool) -> FftParams {
    let table = if squaring { SQR_TWK } else { MUL_TWK };
    let (len1, len2, field_limbs) = (len1.max(1), len2.max(1), field_limbs.max(1));
    let total = (len1 + len2).saturating_mul(field_limbs);
    let limit = max_bundle_log(table, total);
    let transforms = if squaring { 2.0 } else { 3.0 };

    let mut best: Option<(f64, FftParams)> = None;
    for log in 0..=limit {
        let bundle = 1usize << log;
        let out = len1.div_ceil(bundle) + len2.div_ceil(bundle) - 1;
        let depth = clog2(out.max(1));
        let n = round_n((2 * bundle - 1) * field_limbs, depth, false);
        let size = (1usize << depth) as f64;
        let nf = n as f64;
        let cost = size * (transforms * f64::from(depth.max(1)) * nf + nf.powf(1.585));
        if best.map_or(true, |(c, _)| cost < c) {
            best = Some((cost, FftParams { depth, n, bundle }));
        }
    }
    let params = best.map_or(
        FftParams {
            depth: clog2(len1 + len2),
            n: field_limbs,
            bundle: 1,
        },
        |(_, p)| p,
    );
    tracing::debug!(len1, len2, field_limbs, ?params, "selected fermat parameters");
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fft::check_ring;

    #[test]
    fn round_n_respects_root_order() {
        assert_eq!(round_n(3, 5, false), 3);
        assert_eq!(round_n(3, 10, false), 4);
        assert_eq!(round_n(5, 10, true), 8);
        assert_eq!(round_n(0, 2, false), 1);
        for depth in 0..14 {
            for n in 1..20 {
                assert!(check_ring(round_n(n, depth, false), depth, false).is_ok());
                assert!(check_ring(round_n(n, depth, true), depth, true).is_ok());
            }
        }
    }

    #[test]
    fn small_products_do_not_bundle() {
        let p = select_params(10, 10, 1, false);
        assert_eq!(p.bundle, 1);
        assert_eq!(p.depth, 5);
        assert!(p.n >= 1);
    }

    #[test]
    fn parameters_cover_the_output() {
        for &(l1, l2, f) in &[(1usize, 1usize, 1usize), (1000, 3, 2), (5000, 5000, 4), (300, 200, 40)] {
            for sq in [false, true] {
                let p = select_params(l1, l2, f, sq);
                let out = l1.div_ceil(p.bundle) + l2.div_ceil(p.bundle) - 1;
                assert!(out <= 1 << p.depth);
                assert!(p.n >= (2 * p.bundle - 1) * f);
                assert!(check_ring(p.n, p.depth, false).is_ok());
            }
        }
    }
}
