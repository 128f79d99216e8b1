use crate::error::MergeError;

/// Settings for a merge run.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeConfig {
    /// Fuzzy value for classification and imprinting; also the distance
    /// below which two shapes are considered neighbours and the relative
    /// bound on per-shape volume changes.
    pub tolerance: f64,
    /// Deadline for each classification fill in milliseconds; 0 disables it.
    pub pave_timeout_ms: u32,
    /// Retry a timed-out classification once without a deadline.
    pub retry_timeouts: bool,
    /// Run the shape checker on the input before merging.
    pub check_geometry: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            pave_timeout_ms: 0,
            retry_timeouts: true,
            check_geometry: false,
        }
    }
}

impl MergeConfig {
    /// Checks that the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Config`] if the tolerance is negative or not
    /// finite.
    pub fn validate(&self) -> Result<(), MergeError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(MergeError::Config(format!(
                "tolerance must be finite and non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = MergeConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.retry_timeouts);
        assert_eq!(config.pave_timeout_ms, 0);
    }

    #[test]
    fn bad_tolerances_are_rejected() {
        for tolerance in [-1e-3, f64::NAN, f64::INFINITY] {
            let config = MergeConfig {
                tolerance,
                ..MergeConfig::default()
            };
            assert!(config.validate().is_err());
        }
    }
}
