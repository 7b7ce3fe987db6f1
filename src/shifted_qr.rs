//! Shifted QR iteration on an upper Hessenberg matrix.
//!
//! Each outer iteration either deflates a converged trailing eigenvalue or runs
//! explicit QR sweeps (`H - sI = QR`, `H <- RQ + sI`) over the active leading
//! block, once for each eigenvalue of its trailing 2x2 block. The factorization
//! uses complex Givens rotations, which keeps the Hessenberg structure intact.

use nalgebra::{Complex, DMatrix};

use crate::{
    config::QrConfig,
    error::{Error, Result},
    hessenberg::{checked_order, is_hessenberg, max_modulus},
    scalar::roots,
};

/// Counters describing one run of [`ShiftedQr::extract`].
#[cfg_attr(feature = "persistence", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QrStats {
    /// Outer iterations, deflation steps included.
    pub iterations: usize,
    pub sweeps: usize,
    pub deflations: usize,
    pub exceptional_shifts: usize,
}

/// A unitary 2x2 rotation `[[c*, s*], [-s, c]]` with `|c|^2 + |s|^2 = 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GivensRotation {
    c: Complex<f64>,
    s: Complex<f64>,
}

impl GivensRotation {
    pub fn identity() -> Self {
        Self {
            c: Complex::new(1.0, 0.0),
            s: Complex::new(0.0, 0.0),
        }
    }

    /// Rotation taking `(a, b)` to `(r, 0)`, together with the real `r = |(a, b)|`.
    pub fn make(a: Complex<f64>, b: Complex<f64>) -> (Self, f64) {
        let r = a.norm().hypot(b.norm());
        if r == 0.0 {
            (Self::identity(), 0.0)
        } else {
            (Self { c: a / r, s: b / r }, r)
        }
    }

    /// Applies the rotation to the pair of rows `(x, y)` of one column.
    #[inline]
    pub fn apply_left(&self, x: Complex<f64>, y: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        (
            self.c.conj() * x + self.s.conj() * y,
            self.c * y - self.s * x,
        )
    }

    /// Multiplies the pair of columns `(p, q)` of one row by the conjugate transpose.
    #[inline]
    pub fn apply_right(&self, p: Complex<f64>, q: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        (
            p * self.c + q * self.s,
            q * self.c.conj() - p * self.s.conj(),
        )
    }
}

/// Both eigenvalues of `[[a, b], [c, d]]`, `(a + d)/2 ± sqrt(((a + d)/2)^2 - (ad - bc))`.
///
/// The block is divided by its largest entry modulus first, so the products
/// stay finite for any finite block.
pub fn trailing_block_eigenvalues(
    a: Complex<f64>,
    b: Complex<f64>,
    c: Complex<f64>,
    d: Complex<f64>,
) -> (Complex<f64>, Complex<f64>) {
    let scale = a.norm().max(b.norm()).max(c.norm()).max(d.norm());
    if scale == 0.0 {
        return (Complex::new(0.0, 0.0), Complex::new(0.0, 0.0));
    }
    let (a, b, c, d) = (a / scale, b / scale, c / scale, d / scale);

    let half_trace = (a + d) * 0.5;
    let determinant = a * d - b * c;
    let root = roots(half_trace * half_trace - determinant, 2);
    ((half_trace + root[0]) * scale, (half_trace + root[1]) * scale)
}

/// Shifted QR eigenvalue extractor.
#[derive(Clone, Debug, Default)]
pub struct ShiftedQr {
    config: QrConfig,
}

impl ShiftedQr {
    pub fn new(config: QrConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &QrConfig {
        &self.config
    }

    /// Iterates on the Hessenberg `matrix` until its diagonal holds the eigenvalues.
    ///
    /// On success the matrix is upper triangular up to `near_zero_tolerance` and
    /// similar to the input. If the iteration cap is reached the matrix is left in
    /// its current state and [`Error::DidNotConverge`] reports how much is unresolved.
    pub fn extract(&self, matrix: &mut DMatrix<Complex<f64>>) -> Result<QrStats> {
        puffin::profile_function!();
        let n = checked_order(matrix)?;
        if !is_hessenberg(matrix) {
            return Err(Error::InvalidArgument(
                "matrix is not in upper Hessenberg form".to_owned(),
            ));
        }

        // Fallback scale for blocks with a zero diagonal.
        let norm = max_modulus(matrix);

        let mut stats = QrStats::default();
        let mut rotations = Vec::with_capacity(n - 1);
        let mut stalled = 0;

        // Active block is matrix[0..m, 0..m].
        let mut m = n;
        while m > 0 {
            if stats.iterations == self.config.max_iterations {
                log::warn!(
                    "QR iteration stopped after {} iterations with {} of {} eigenvalues unresolved",
                    stats.iterations,
                    m,
                    n
                );
                return Err(Error::DidNotConverge {
                    iterations: stats.iterations,
                    unresolved: m,
                    partial: matrix.diagonal().iter().copied().collect(),
                });
            }
            stats.iterations += 1;

            // One root found

            if m == 1 || self.is_negligible(matrix, m, norm) {
                if m > 1 {
                    matrix[(m - 1, m - 2)] = Complex::new(0.0, 0.0);
                }
                m -= 1;
                stats.deflations += 1;
                stalled = 0;
                log::debug!(
                    "eigenvalue {} deflated after {} iterations",
                    matrix[(m, m)],
                    stats.iterations
                );
                continue;
            }

            stalled += 1;
            let period = self.config.exceptional_shift_period;
            if period > 0 && stalled % period == 0 {
                let shift = exceptional_shift(matrix, m);
                log::debug!("exceptional shift {shift} on active block of size {m}");
                qr_sweep(matrix, m, shift, &mut rotations);
                stats.sweeps += 1;
                stats.exceptional_shifts += 1;
            } else {
                let (s1, s2) = trailing_block_eigenvalues(
                    matrix[(m - 2, m - 2)],
                    matrix[(m - 2, m - 1)],
                    matrix[(m - 1, m - 2)],
                    matrix[(m - 1, m - 1)],
                );
                for shift in [s1, s2] {
                    qr_sweep(matrix, m, shift, &mut rotations);
                    stats.sweeps += 1;
                }
            }
        }

        log::debug!(
            "order {n} converged: {} iterations, {} sweeps, {} exceptional shifts",
            stats.iterations,
            stats.sweeps,
            stats.exceptional_shifts
        );
        Ok(stats)
    }

    // Subdiagonal entry closing the active block, measured against the two
    // diagonal entries beside it, or against `norm` when both are zero.
    fn is_negligible(&self, matrix: &DMatrix<Complex<f64>>, m: usize, norm: f64) -> bool {
        let mut scale = matrix[(m - 1, m - 1)].norm() + matrix[(m - 2, m - 2)].norm();
        if scale == 0.0 {
            scale = norm;
        }
        matrix[(m - 1, m - 2)].norm() <= self.config.near_zero_tolerance * scale
    }
}

/// Runs [`ShiftedQr::extract`] with the default configuration.
pub fn extract_eigenvalues_from_hessenberg(matrix: &mut DMatrix<Complex<f64>>) -> Result<QrStats> {
    ShiftedQr::default().extract(matrix)
}

// Wilkinson's ad hoc shift, used when the double shift stops making progress.
fn exceptional_shift(matrix: &DMatrix<Complex<f64>>, m: usize) -> Complex<f64> {
    let mut s = matrix[(m - 1, m - 2)].norm();
    if m > 2 {
        s += matrix[(m - 2, m - 3)].norm();
    }
    matrix[(m - 1, m - 1)] + 0.75 * s
}

/// One explicit shifted QR step on the leading `active` x `active` block.
///
/// Left rotations run across the full row width so the whole matrix stays
/// similar to the input. `rotations` is scratch space reused between sweeps.
fn qr_sweep(
    matrix: &mut DMatrix<Complex<f64>>,
    active: usize,
    shift: Complex<f64>,
    rotations: &mut Vec<GivensRotation>,
) {
    puffin::profile_scope!("qr_sweep");
    let n = matrix.ncols();

    for i in 0..active {
        matrix[(i, i)] -= shift;
    }

    // QR factorization: zero the subdiagonal column by column.

    rotations.clear();
    for j in 0..(active - 1) {
        let (rotation, r) = GivensRotation::make(matrix[(j, j)], matrix[(j + 1, j)]);
        matrix[(j, j)] = Complex::new(r, 0.0);
        matrix[(j + 1, j)] = Complex::new(0.0, 0.0);
        for k in (j + 1)..n {
            let (x, y) = rotation.apply_left(matrix[(j, k)], matrix[(j + 1, k)]);
            matrix[(j, k)] = x;
            matrix[(j + 1, k)] = y;
        }
        rotations.push(rotation);
    }

    // RQ: apply the accumulated rotations from the right. R is upper
    // triangular, so column pair (j, j+1) only has rows 0..=j+1 populated.

    for (j, rotation) in rotations.iter().enumerate() {
        for i in 0..=(j + 1) {
            let (p, q) = rotation.apply_right(matrix[(i, j)], matrix[(i, j + 1)]);
            matrix[(i, j)] = p;
            matrix[(i, j + 1)] = q;
        }
    }

    for i in 0..active {
        matrix[(i, i)] += shift;
    }
}
