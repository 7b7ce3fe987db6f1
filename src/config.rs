use crate::error::{Error, Result};

/// Almost zero numbers. Governs deflation.
pub const TOL0: f64 = 1.0e-12;

/// Definitely zero numbers. Governs skipped reflections and chopped output.
pub const TOL1: f64 = 1.0e-24;

/// Maximum number of outer QR iterations.
pub const MAX_ITERATIONS: usize = 1_000_000;

/// Outer iterations without a deflation before an exceptional shift is used.
pub const EXCEPTIONAL_SHIFT_PERIOD: usize = 10;

/// Tolerances and limits for the Hessenberg reduction and the shifted QR iteration.
#[cfg_attr(feature = "persistence", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QrConfig {
    /// A subdiagonal entry below this, relative to the two diagonal entries
    /// beside it (or to the largest entry when both are zero), counts as converged.
    pub near_zero_tolerance: f64,

    /// Values below this, relative to the largest input entry, are treated as
    /// exactly zero.
    pub zero_tolerance: f64,

    /// Cap on outer iterations, deflation steps included.
    pub max_iterations: usize,

    /// Stalled iterations between exceptional shifts. Zero disables them.
    pub exceptional_shift_period: usize,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            near_zero_tolerance: TOL0,
            zero_tolerance: TOL1,
            max_iterations: MAX_ITERATIONS,
            exceptional_shift_period: EXCEPTIONAL_SHIFT_PERIOD,
        }
    }
}

impl QrConfig {
    pub fn with_near_zero_tolerance(mut self, tolerance: f64) -> Self {
        self.near_zero_tolerance = tolerance;
        self
    }

    pub fn with_zero_tolerance(mut self, tolerance: f64) -> Self {
        self.zero_tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_exceptional_shift_period(mut self, period: usize) -> Self {
        self.exceptional_shift_period = period;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |t: f64| t.is_finite() && t > 0.0;
        if !positive(self.near_zero_tolerance) {
            return Err(Error::InvalidArgument(format!(
                "near-zero tolerance must be positive and finite, got {}",
                self.near_zero_tolerance
            )));
        }
        if !positive(self.zero_tolerance) {
            return Err(Error::InvalidArgument(format!(
                "zero tolerance must be positive and finite, got {}",
                self.zero_tolerance
            )));
        }
        if self.zero_tolerance > self.near_zero_tolerance {
            return Err(Error::InvalidArgument(format!(
                "zero tolerance {} exceeds near-zero tolerance {}",
                self.zero_tolerance, self.near_zero_tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidArgument(
                "max_iterations must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_constants() {
        let config = QrConfig::default();
        assert_eq!(config.near_zero_tolerance, TOL0);
        assert_eq!(config.zero_tolerance, TOL1);
        assert_eq!(config.max_iterations, MAX_ITERATIONS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let config = QrConfig::default().with_near_zero_tolerance(-1.0);
        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));

        let config = QrConfig::default().with_zero_tolerance(f64::NAN);
        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));

        let config = QrConfig::default().with_zero_tolerance(1.0);
        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));

        let config = QrConfig::default().with_max_iterations(0);
        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));
    }

    #[cfg(feature = "persistence")]
    #[test]
    fn survives_serialization() {
        let config = QrConfig::default()
            .with_near_zero_tolerance(1e-10)
            .with_max_iterations(500)
            .with_exceptional_shift_period(0);
        let json = serde_json::to_string(&config).unwrap();
        let restored: QrConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);

        let stats = crate::QrStats {
            iterations: 12,
            sweeps: 18,
            deflations: 3,
            exceptional_shifts: 1,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"exceptional_shifts\":1"));
        assert_eq!(serde_json::from_str::<crate::QrStats>(&json).unwrap(), stats);
    }
}
