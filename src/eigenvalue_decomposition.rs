//! Eigenvalues of a dense complex square matrix.
//!
//! The input is copied, the copy is reduced to upper Hessenberg form and then
//! iterated with shifted QR until its diagonal holds the eigenvalues. The input
//! matrix is never modified.
//!
//! ```
//! use complex_eigen::EigenvalueDecomposition;
//! use nalgebra::DMatrix;
//!
//! let a = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 2.0, 3.0]);
//! let eig = EigenvalueDecomposition::from_real(&a).unwrap().into_sorted();
//! let values = eig.get_real_eigenvalues();
//! assert!((values[0] - 2.0).abs() < 1e-10);
//! assert!((values[1] - 5.0).abs() < 1e-10);
//! ```

use nalgebra::{Complex, DMatrix, DVector};

use crate::{
    config::QrConfig,
    error::Result,
    hessenberg::{checked_order, max_modulus, reduce_to_hessenberg_with},
    scalar::chop,
    shifted_qr::{QrStats, ShiftedQr},
};

#[derive(Clone, Debug)]
pub struct EigenvalueDecomposition {
    /** Row and column dimension (square matrix). */
    n: usize,

    /** Eigenvalues, in the order they appear on the converged diagonal. */
    d: DVector<Complex<f64>>,

    /** Counters from the QR iteration. */
    stats: QrStats,
}

impl EigenvalueDecomposition {
    /// Computes the eigenvalues of `matrix` with the default configuration.
    pub fn new(matrix: &DMatrix<Complex<f64>>) -> Result<Self> {
        Self::with_config(matrix, &QrConfig::default())
    }

    /// Computes the eigenvalues of `matrix`.
    ///
    /// Returns `InvalidArgument` for non-square, empty or non-finite input, and
    /// `DidNotConverge` if the QR iteration hits `config.max_iterations`.
    pub fn with_config(matrix: &DMatrix<Complex<f64>>, config: &QrConfig) -> Result<Self> {
        puffin::profile_function!();
        config.validate()?;
        let n = checked_order(matrix)?;

        let mut h = matrix.clone();

        // Reduce to Hessenberg form.
        reduce_to_hessenberg_with(&mut h, config)?;

        // Reduce Hessenberg to triangular form.
        let stats = ShiftedQr::new(*config)?.extract(&mut h)?;

        // Components below zero_tolerance relative to the input are cleared.
        let tolerance = config.zero_tolerance * max_modulus(matrix);
        let d = DVector::from_fn(n, |i, _| chop(h[(i, i)], tolerance));
        Ok(Self { n, d, stats })
    }

    /// Computes the eigenvalues of a real matrix.
    pub fn from_real(matrix: &DMatrix<f64>) -> Result<Self> {
        Self::new(&matrix.map(|x| Complex::new(x, 0.0)))
    }

    /// Sorts the eigenvalues by real part, then by imaginary part.
    pub fn into_sorted(mut self) -> Self {
        let mut values: Vec<_> = self.d.iter().copied().collect();
        values.sort_by(|a, b| a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im)));
        self.d = DVector::from_vec(values);
        self
    }

    pub fn order(&self) -> usize {
        self.n
    }

    pub fn get_eigenvalues(&self) -> &DVector<Complex<f64>> {
        &self.d
    }

    pub fn into_eigenvalues(self) -> DVector<Complex<f64>> {
        self.d
    }

    pub fn get_real_eigenvalues(&self) -> DVector<f64> {
        self.d.map(|z| z.re)
    }

    pub fn get_imag_eigenvalues(&self) -> DVector<f64> {
        self.d.map(|z| z.im)
    }

    pub fn stats(&self) -> &QrStats {
        &self.stats
    }
}

/// Eigenvalues of `matrix`, in diagonal order of the converged form.
pub fn compute_eigenvalues(matrix: &DMatrix<Complex<f64>>) -> Result<DVector<Complex<f64>>> {
    EigenvalueDecomposition::new(matrix).map(EigenvalueDecomposition::into_eigenvalues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn identity_of_order_five() {
        let eig = EigenvalueDecomposition::new(&DMatrix::identity(5, 5)).unwrap();
        assert_eq!(eig.order(), 5);
        assert_eq!(eig.stats().sweeps, 0);
        for z in eig.get_eigenvalues().iter() {
            assert_eq!(*z, Complex::new(1.0, 0.0));
        }
    }

    #[test]
    fn input_is_not_modified() {
        let a = DMatrix::from_fn(4, 4, |i, j| Complex::new((i * 4 + j) as f64, (i as f64) - (j as f64)));
        let copy = a.clone();
        compute_eigenvalues(&a).unwrap();
        assert_eq!(a, copy);
    }

    #[test]
    fn real_and_imaginary_parts() {
        let a = DMatrix::from_row_slice(2, 2, &[0.0, -1.0, 1.0, 0.0]);
        let eig = EigenvalueDecomposition::from_real(&a).unwrap();
        let re = eig.get_real_eigenvalues();
        let mut im: Vec<f64> = eig.get_imag_eigenvalues().iter().copied().collect();
        im.sort_by(f64::total_cmp);
        assert!(re.iter().all(|x| x.abs() < 1e-12));
        assert!((im[0] + 1.0).abs() < 1e-12);
        assert!((im[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_invalid_input() {
        let rect = DMatrix::from_element(3, 2, Complex::new(1.0, 0.0));
        assert!(matches!(
            compute_eigenvalues(&rect),
            Err(Error::InvalidArgument(_))
        ));

        let empty = DMatrix::<Complex<f64>>::zeros(0, 0);
        assert!(matches!(
            compute_eigenvalues(&empty),
            Err(Error::InvalidArgument(_))
        ));

        let mut nan = DMatrix::<Complex<f64>>::identity(3, 3);
        nan[(2, 1)] = Complex::new(f64::NAN, 0.0);
        match compute_eigenvalues(&nan) {
            Err(Error::InvalidArgument(message)) => assert!(message.contains("(2, 1)")),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn tiny_matrix_keeps_imaginary_parts() {
        let a = DMatrix::from_row_slice(2, 2, &[0.0, -1e-20, 1e-20, 0.0]);
        let eig = EigenvalueDecomposition::from_real(&a).unwrap();
        let mut im: Vec<f64> = eig.get_imag_eigenvalues().iter().copied().collect();
        im.sort_by(f64::total_cmp);
        assert!((im[0] + 1e-20).abs() < 1e-30);
        assert!((im[1] - 1e-20).abs() < 1e-30);
    }

    #[test]
    fn single_entry() {
        let a = DMatrix::from_element(1, 1, Complex::new(-2.5, 4.0));
        let values = compute_eigenvalues(&a).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0], Complex::new(-2.5, 4.0));
    }
}
