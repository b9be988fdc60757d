//! Property-based tests for polynomials modulo a word prime.

use proptest::prelude::*;
use zpoly_nmod::div::{div_newton, divrem, divrem_classical, divrem_divconquer, inv_series};
use zpoly_nmod::gcd::{gcd, xgcd};
use zpoly_nmod::mul::{mul, mul_classical, mul_ks, mul_middle, mul_trunc, KS_CUTOFF};
use zpoly_nmod::ModPoly;

const PRIMES: [u64; 4] = [2, 65_537, 4_294_967_311, 0xffff_ffff_ffff_ffc5];

fn poly_strategy(max_len: usize) -> impl Strategy<Value = ModPoly> {
    (0..PRIMES.len(), prop::collection::vec(any::<u64>(), 0..max_len))
        .prop_map(|(i, c)| ModPoly::from_coeffs(PRIMES[i], &c).unwrap())
}

fn with_modulus(p: u64, c: &[u64]) -> ModPoly {
    ModPoly::from_coeffs(p, c).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn coefficients_stay_reduced(f in poly_strategy(60)) {
        prop_assert!(f.coeffs().iter().all(|&c| c < f.modulus()));
        prop_assert!(f.coeffs().last().map_or(true, |&c| c != 0));
    }

    #[test]
    fn kronecker_matches_classical(
        f in poly_strategy(80),
        g in prop::collection::vec(any::<u64>(), 0..80),
    ) {
        let g = with_modulus(f.modulus(), &g);
        let c = mul_classical(&f, &g);
        prop_assert_eq!(mul_ks(&f, &g).unwrap(), c.clone());
        prop_assert_eq!(mul(&g, &f).unwrap(), c);
    }

    #[test]
    fn distributive(
        f in poly_strategy(40),
        g in prop::collection::vec(any::<u64>(), 0..40),
        h in prop::collection::vec(any::<u64>(), 0..40),
    ) {
        let (g, h) = (with_modulus(f.modulus(), &g), with_modulus(f.modulus(), &h));
        let lhs = mul(&f, &g.add(&h)).unwrap();
        let rhs = mul(&f, &g).unwrap().add(&mul(&f, &h).unwrap());
        prop_assert_eq!(lhs, rhs);
    }

    #[test]
    fn associative_across_ks_cutoff(
        f in poly_strategy(3 * KS_CUTOFF),
        g in prop::collection::vec(any::<u64>(), KS_CUTOFF / 2..3 * KS_CUTOFF),
        h in prop::collection::vec(any::<u64>(), 0..2 * KS_CUTOFF),
    ) {
        let (g, h) = (with_modulus(f.modulus(), &g), with_modulus(f.modulus(), &h));
        let lhs = mul(&mul(&f, &g).unwrap(), &h).unwrap();
        let rhs = mul(&f, &mul(&g, &h).unwrap()).unwrap();
        prop_assert_eq!(&lhs, &rhs);
        prop_assert_eq!(lhs, mul_classical(&mul_classical(&f, &g), &h));
    }

    #[test]
    fn middle_product_matches_truncation(
        f in poly_strategy(70),
        g in prop::collection::vec(any::<u64>(), 0..40),
        trunc in 0usize..120,
    ) {
        let g = with_modulus(f.modulus(), &g);
        let full = mul_trunc(&f, &g, trunc).unwrap();
        let mid = mul_middle(&f, &g, trunc).unwrap();
        let lo = trunc.saturating_sub(1) / 2;
        for i in lo..trunc {
            prop_assert_eq!(mid.coeff(i), full.coeff(i));
        }
        for i in 0..lo {
            prop_assert_eq!(mid.coeff(i), 0);
        }
    }

    #[test]
    fn division_identity(
        a in poly_strategy(300),
        b in prop::collection::vec(any::<u64>(), 1..120),
    ) {
        let mut b = with_modulus(a.modulus(), &b);
        if b.is_zero() {
            b = with_modulus(a.modulus(), &[1]);
        }
        let (q, r) = divrem(&a, &b).unwrap();
        prop_assert!(r.len() < b.len());
        prop_assert_eq!(mul(&q, &b).unwrap().add(&r), a.clone());
        prop_assert_eq!(divrem_classical(&a, &b).unwrap(), (q.clone(), r.clone()));
        prop_assert_eq!(divrem_divconquer(&a, &b).unwrap(), (q.clone(), r));
        prop_assert_eq!(div_newton(&a, &b).unwrap(), q);
    }

    #[test]
    fn series_inverse_is_inverse(
        b in poly_strategy(50),
        n in 1usize..90,
    ) {
        let mut b = b;
        b.set_coeff(0, 1 + b.coeff(0) % (b.modulus() - 1)).unwrap();
        let y = inv_series(&b, n).unwrap();
        prop_assert!(mul_trunc(&b, &y, n).unwrap().is_one());
    }

    #[test]
    fn gcd_recovers_common_factor(
        g in poly_strategy(8),
        a in prop::collection::vec(any::<u64>(), 1..10),
        b in prop::collection::vec(any::<u64>(), 1..10),
    ) {
        let p = g.modulus();
        let (a, b) = (with_modulus(p, &a), with_modulus(p, &b));
        prop_assume!(!g.is_zero() && !a.is_zero() && !b.is_zero());
        prop_assume!(gcd(&a, &b).unwrap().is_one());
        let (ga, gb) = (mul(&g, &a).unwrap(), mul(&g, &b).unwrap());
        prop_assert_eq!(gcd(&ga, &gb).unwrap(), g.monic().unwrap());
        let (d, s, t) = xgcd(&ga, &gb).unwrap();
        prop_assert_eq!(mul(&s, &ga).unwrap().add(&mul(&t, &gb).unwrap()), d);
    }

    #[test]
    fn text_round_trip(f in poly_strategy(50)) {
        prop_assert_eq!(f.to_string().parse::<ModPoly>().unwrap(), f);
    }

    #[test]
    fn reverse_twice_restores(f in poly_strategy(40), extra in 0usize..10) {
        let m = f.len() + extra;
        let mut g = f.reverse(m).unwrap();
        g.reverse_in_place(m).unwrap();
        prop_assert_eq!(g, f);
    }
}
