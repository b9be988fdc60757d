#![no_main]

use libfuzzer_sys::fuzz_target;

use zpoly::mul::{mul_classical, mul_karatsuba, mul_ks, mul_ss};
use zpoly::{IntPoly, ZInt};

/// Split the input into two polynomials with coefficients built from
/// little-endian byte chunks; the first byte picks the chunk width.
fn decode(data: &[u8]) -> Option<(IntPoly, IntPoly)> {
    let (&head, rest) = data.split_first()?;
    let width = usize::from(head % 24) + 1;
    let coeffs: Vec<ZInt> = rest
        .chunks(width)
        .map(|chunk| {
            let mut acc = ZInt::zero();
            for &byte in chunk.iter().rev() {
                acc = &acc.mul_2exp(8) + &ZInt::from(u64::from(byte));
            }
            if chunk[0] & 1 == 1 {
                -acc
            } else {
                acc
            }
        })
        .collect();
    let mid = coeffs.len() / 2;
    Some((
        IntPoly::from_zints(&coeffs[..mid]).ok()?,
        IntPoly::from_zints(&coeffs[mid..]).ok()?,
    ))
}

fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 {
        return;
    }
    let Some((a, b)) = decode(data) else {
        return;
    };
    let expected = mul_classical(a.view(), b.view()).unwrap();
    assert_eq!(mul_karatsuba(a.view(), b.view()).unwrap(), expected, "karatsuba");
    assert_eq!(mul_ks(a.view(), b.view()).unwrap(), expected, "kronecker");
    assert_eq!(mul_ss(a.view(), b.view()).unwrap(), expected, "schonhage-strassen");
    assert_eq!(b.mul(&a).unwrap(), expected, "dispatch");
});
