//! Integration tests checking that scratch memory is returned on every path.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use zpoly::mul::{mul_classical, mul_karatsuba, mul_ks, mul_ss, KsPrecache};
use zpoly::{ErrorKind, IntPoly, ZInt};
use zpoly_memory::scratch_stats;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn random_poly(rng: &mut ChaCha8Rng, len: usize, bits: usize) -> IntPoly {
    let coeffs: Vec<_> = (0..len).map(|_| ZInt::random_signed(rng, bits)).collect();
    IntPoly::from_zints(&coeffs).unwrap()
}

#[test]
fn products_release_scratch() {
    init_logging();
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    let f = random_poly(&mut rng, 70, 300);
    let g = random_poly(&mut rng, 50, 200);
    let before = scratch_stats();
    let c = mul_classical(f.view(), g.view()).unwrap();
    assert_eq!(mul_karatsuba(f.view(), g.view()).unwrap(), c);
    assert_eq!(mul_ks(f.view(), g.view()).unwrap(), c);
    assert_eq!(mul_ss(f.view(), g.view()).unwrap(), c);
    let after = scratch_stats();
    assert!(after.acquired > before.acquired);
    assert_eq!(after.outstanding(), before.outstanding());
}

#[test]
fn failures_release_scratch() {
    init_logging();
    let before = scratch_stats();
    let f = IntPoly::from_i64s(&[1, 2, 3]).unwrap();
    assert_eq!(f.divrem(&IntPoly::new()), Err(ErrorKind::DivisionByZero));
    assert_eq!(ZInt::from(5i64).tdiv_qr(&ZInt::zero()), Err(ErrorKind::DivisionByZero));

    let cache = KsPrecache::new(f.view(), 4, 10).unwrap();
    let wide = IntPoly::constant(&ZInt::one().mul_2exp(500)).unwrap();
    assert_eq!(cache.mul(wide.view()), Err(ErrorKind::PackDoesNotFit));
    assert_eq!(scratch_stats().outstanding(), before.outstanding());
}

#[test]
fn division_and_gcd_release_scratch() {
    init_logging();
    let mut rng = ChaCha8Rng::seed_from_u64(32);
    let g = random_poly(&mut rng, 8, 100);
    let a = g.mul(&random_poly(&mut rng, 12, 50)).unwrap();
    let b = g.mul(&random_poly(&mut rng, 10, 50)).unwrap();
    let before = scratch_stats();
    let d = a.gcd(&b).unwrap();
    assert!(a.divides(&d).unwrap().is_some());
    let _ = a.resultant(&b).unwrap();
    assert_eq!(scratch_stats().outstanding(), before.outstanding());
}
