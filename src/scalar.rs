//! Scalar helpers layered on top of `num_complex`.

use std::f64::consts::PI;

use nalgebra::Complex;

/// All `n` n-th roots of `value`, starting from the principal root and
/// walking counter-clockwise.
pub fn roots(value: Complex<f64>, n: usize) -> Vec<Complex<f64>> {
    if n == 0 {
        return Vec::new();
    }
    let (r, theta) = value.to_polar();
    let modulus = r.powf(1.0 / n as f64);
    let step = 2.0 * PI / n as f64;
    (0..n)
        .map(|k| Complex::from_polar(modulus, theta / n as f64 + step * k as f64))
        .collect()
}

/// Unit-modulus phase `z / |z|`, or one for zero.
#[inline]
pub fn phase_of(z: Complex<f64>) -> Complex<f64> {
    let r = z.norm();
    if r == 0.0 {
        Complex::new(1.0, 0.0)
    } else {
        z / r
    }
}

/// Clears each component whose magnitude is at or below `tolerance`.
#[inline]
pub fn chop(z: Complex<f64>, tolerance: f64) -> Complex<f64> {
    let clear = |x: f64| if x.abs() <= tolerance { 0.0 } else { x };
    Complex::new(clear(z.re), clear(z.im))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_roots_square_back() {
        let value = Complex::new(-3.0, 4.0);
        let r = roots(value, 2);
        assert_eq!(r.len(), 2);
        for root in &r {
            assert!((root * root - value).norm() < 1e-12);
        }
        assert!((r[0] + r[1]).norm() < 1e-12);
    }

    #[test]
    fn cube_roots_of_unity() {
        let r = roots(Complex::new(1.0, 0.0), 3);
        assert!((r[0] - Complex::new(1.0, 0.0)).norm() < 1e-12);
        for root in &r {
            assert!((root.powu(3) - Complex::new(1.0, 0.0)).norm() < 1e-12);
        }
    }

    #[test]
    fn phase_and_chop() {
        assert_eq!(phase_of(Complex::new(0.0, 0.0)), Complex::new(1.0, 0.0));
        assert!((phase_of(Complex::new(0.0, -2.0)) - Complex::new(0.0, -1.0)).norm() < 1e-15);
        assert_eq!(
            chop(Complex::new(1e-30, 2.0), 1e-24),
            Complex::new(0.0, 2.0)
        );
    }
}
