//! Property-based tests for limb arithmetic.

use num_bigint::BigUint;
use proptest::prelude::*;
use zpoly_mpn::arith::normalized_len;
use zpoly_mpn::bits::{add_shifted, read_field};
use zpoly_mpn::div::divrem;
use zpoly_mpn::mul::mul;
use zpoly_mpn::PreInv;

fn big(a: &[u64]) -> BigUint {
    let bytes: Vec<u8> = a.iter().flat_map(|x| x.to_le_bytes()).collect();
    BigUint::from_bytes_le(&bytes)
}

fn limbs() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(any::<u64>(), 1..80)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn mul_matches_biguint(a in limbs(), b in limbs()) {
        let mut r = vec![0u64; a.len() + b.len()];
        mul(&mut r, &a, &b);
        prop_assert_eq!(big(&r), big(&a) * big(&b));
    }

    #[test]
    fn divrem_matches_biguint(a in limbs(), b in limbs()) {
        prop_assume!(normalized_len(&b) > 0);
        let (q, r) = divrem(&a, &b).unwrap();
        prop_assert_eq!(big(&q), big(&a) / big(&b));
        prop_assert_eq!(big(&r), big(&a) % big(&b));
    }

    #[test]
    fn preinv_divrem(d in 1u64.., hi in any::<u64>(), lo in any::<u64>()) {
        let pre = PreInv::new(d).unwrap();
        let hi = hi % d;
        let n = (u128::from(hi) << 64) | u128::from(lo);
        let (q, r) = pre.divrem(hi, lo);
        prop_assert_eq!(u128::from(q), n / u128::from(d));
        prop_assert_eq!(u128::from(r), n % u128::from(d));
    }

    #[test]
    fn shifted_field_round_trip(val in prop::collection::vec(any::<u64>(), 1..4), offset in 0usize..300) {
        let mut buf = vec![0u64; 10];
        prop_assert_eq!(add_shifted(&mut buf, &val, offset), 0);
        let mut out = vec![0u64; val.len()];
        read_field(&mut out, &buf, offset, 64 * val.len());
        prop_assert_eq!(out, val);
    }
}
