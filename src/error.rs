//! Error types for complex-eigen.

use nalgebra::Complex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The iteration cap was reached before every eigenvalue deflated.
    ///
    /// `unresolved` is the size of the active block left when iteration stopped and
    /// `partial` holds the diagonal at that point. Only the trailing
    /// `partial.len() - unresolved` entries are converged eigenvalues.
    #[error("QR iteration did not converge after {iterations} iterations ({unresolved} eigenvalues unresolved)")]
    DidNotConverge {
        iterations: usize,
        unresolved: usize,
        partial: Vec<Complex<f64>>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn not_square(rows: usize, cols: usize) -> Self {
        Error::InvalidArgument(format!("expected a square matrix, got {rows}x{cols}"))
    }
}
