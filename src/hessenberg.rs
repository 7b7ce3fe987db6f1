// Unitary reduction to upper Hessenberg form.

use nalgebra::{Complex, DMatrix, DVector};

use crate::{
    config::QrConfig,
    error::{Error, Result},
    scalar::phase_of,
};

/// Order of `matrix`, or `InvalidArgument` if it is empty, not square or has a
/// non-finite entry.
pub(crate) fn checked_order(matrix: &DMatrix<Complex<f64>>) -> Result<usize> {
    let (rows, cols) = matrix.shape();
    if rows != cols {
        return Err(Error::not_square(rows, cols));
    }
    if rows == 0 {
        return Err(Error::InvalidArgument("matrix must not be empty".to_owned()));
    }
    if let Some((index, _)) = matrix
        .iter()
        .enumerate()
        .find(|(_, z)| !(z.re.is_finite() && z.im.is_finite()))
    {
        return Err(Error::InvalidArgument(format!(
            "non-finite entry at ({}, {})",
            index % rows,
            index / rows
        )));
    }
    Ok(rows)
}

/// Largest entry modulus. Overflow-free, unlike the Frobenius norm.
pub(crate) fn max_modulus(matrix: &DMatrix<Complex<f64>>) -> f64 {
    matrix.iter().fold(0.0, |acc: f64, z| acc.max(z.norm()))
}

/// True when every entry below the first subdiagonal is exactly zero.
pub fn is_hessenberg(matrix: &DMatrix<Complex<f64>>) -> bool {
    let (rows, cols) = matrix.shape();
    (0..cols).all(|j| ((j + 2)..rows).all(|i| matrix[(i, j)] == Complex::new(0.0, 0.0)))
}

/// Reduces `matrix` in place to upper Hessenberg form using the default configuration.
pub fn reduce_to_hessenberg(matrix: &mut DMatrix<Complex<f64>>) -> Result<()> {
    reduce_to_hessenberg_with(matrix, &QrConfig::default())
}

/// Reduces `matrix` in place to upper Hessenberg form.
///
/// Applies `n - 2` Householder similarity transforms `H = (I - 2vv*) H (I - 2vv*)`,
/// so the eigenvalues are preserved. Entries below the first subdiagonal are
/// written as exact zeros afterwards; the QR deflation test relies on it.
/// Columns whose subcolumn is at or below `zero_tolerance` relative to the
/// largest entry are left as they are, apart from that zeroing.
pub fn reduce_to_hessenberg_with(
    matrix: &mut DMatrix<Complex<f64>>,
    config: &QrConfig,
) -> Result<()> {
    puffin::profile_function!();
    let n = checked_order(matrix)?;
    let zero = Complex::new(0.0, 0.0);
    let negligible = config.zero_tolerance * max_modulus(matrix);

    let mut v = DVector::<Complex<f64>>::zeros(n);

    for k in 0..n.saturating_sub(2) {
        let len = n - k - 1;
        let mut u = v.rows_mut(0, len);

        // Scale column.

        let mut scale = 0.0;
        for i in 0..len {
            scale += matrix[(k + 1 + i, k)].norm();
        }

        if scale > negligible && scale > 0.0 {
            // Compute Householder vector on the scaled subcolumn. The leading
            // entry is pushed away from zero along its own phase.

            for i in 0..len {
                u[i] = matrix[(k + 1 + i, k)] / scale;
            }
            let norm = u.norm();
            let lead = u[0];
            u[0] = lead + phase_of(lead) * norm;
            let length = u.norm();
            u.unscale_mut(length);

            // Apply from the left: rows k+1.., columns k..

            for j in k..n {
                let mut f = zero;
                for i in 0..len {
                    f += u[i].conj() * matrix[(k + 1 + i, j)];
                }
                f *= 2.0;
                for i in 0..len {
                    matrix[(k + 1 + i, j)] -= u[i] * f;
                }
            }

            // Apply from the right: all rows, columns k+1..

            for i in 0..n {
                let mut f = zero;
                for jj in 0..len {
                    f += matrix[(i, k + 1 + jj)] * u[jj];
                }
                f *= 2.0;
                for jj in 0..len {
                    matrix[(i, k + 1 + jj)] -= f * u[jj].conj();
                }
            }
        } else {
            log::trace!("column {k} already reduced (scale {scale:e})");
        }

        for i in (k + 2)..n {
            matrix[(i, k)] = zero;
        }
    }

    Ok(())
}
