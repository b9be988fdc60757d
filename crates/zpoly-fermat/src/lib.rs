//! # zpoly-fermat
//!
//! Arithmetic modulo `B^n + 1` (`B = 2^64`) and polynomials over that ring,
//! with a truncated Schönhage–Strassen FFT whose twiddles are powers of
//! `sqrt(2)`. The convolutions here are the engine behind large polynomial
//! and integer products in the rest of the workspace.

pub mod fft;
pub mod intmul;
pub mod params;
pub mod poly;
pub mod ring;

pub use fft::{check_ring, FFT_ITERATIVE_DEPTH};
pub use intmul::{mul_limbs, sqr_limbs, SS_INT_THRESHOLD};
pub use params::{select_params, FftParams};
pub use poly::FermatPoly;
