#![forbid(unsafe_code)]
#![cfg_attr(not(debug_assertions), deny(warnings))] // Forbid warnings in release builds
#![warn(clippy::all, rust_2018_idioms)]

//! Eigenvalues of dense complex matrices.
//!
//! A square matrix is reduced to upper Hessenberg form by Householder
//! reflections ([`hessenberg`]) and then iterated with double-shifted QR sweeps
//! built from Givens rotations ([`shifted_qr`]) until its diagonal holds the
//! eigenvalues. [`EigenvalueDecomposition`] ties the two together.
//!
//! Matrices are `nalgebra::DMatrix<Complex<f64>>` (column-major).

pub mod config;
mod eigenvalue_decomposition;
pub mod error;
pub mod hessenberg;
pub mod scalar;
pub mod shifted_qr;

pub use config::{QrConfig, MAX_ITERATIONS, TOL0, TOL1};
pub use eigenvalue_decomposition::{compute_eigenvalues, EigenvalueDecomposition};
pub use error::{Error, Result};
pub use hessenberg::{is_hessenberg, reduce_to_hessenberg, reduce_to_hessenberg_with};
pub use shifted_qr::{extract_eigenvalues_from_hessenberg, QrStats, ShiftedQr};
