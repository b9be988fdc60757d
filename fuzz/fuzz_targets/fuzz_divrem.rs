#![no_main]

use libfuzzer_sys::fuzz_target;

use zpoly::div::{divrem, pseudo_divrem};
use zpoly::IntPoly;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 || data.len() > 512 {
        return;
    }
    let coeffs: Vec<i64> = data.iter().map(|&b| i64::from(b as i8)).collect();
    let split = usize::from(data[0]) % coeffs.len();
    let a = IntPoly::from_i64s(&coeffs[split..]).unwrap();
    let b = IntPoly::from_i64s(&coeffs[..split]).unwrap();
    if b.is_zero() {
        assert!(divrem(&a, &b).is_err());
        return;
    }
    let (q, r) = divrem(&a, &b).unwrap();
    assert_eq!(q.mul(&b).unwrap().add(&r).unwrap(), a);

    let (q, r, d) = pseudo_divrem(&a, &b).unwrap();
    let l = b.get_coeff(b.len() - 1).pow(u32::try_from(d).unwrap());
    assert_eq!(a.scalar_mul(&l).unwrap(), q.mul(&b).unwrap().add(&r).unwrap());
    assert!(r.len() < b.len());
});
