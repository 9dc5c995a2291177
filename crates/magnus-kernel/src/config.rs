//! Per-call configuration.
//!
//! A [`Config`] is built once per call or per long-lived context and is
//! read-only afterwards. Callers that need a different setting for one call
//! derive a copy with [`Config::with_overrides`] or the `with_*` builders;
//! the shared instance is never mutated.

use magnus_integers::{RoundingMode, ValidationError, MAX_DECIMAL_PRECISION};

/// Numeric policy shared by every kernel operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Fractional digits produced by decimal results.
    pub decimal_precision: u32,
    /// Rounding applied when digits are discarded.
    pub rounding_mode: RoundingMode,
    /// Whether the overflow guard is active.
    pub overflow_checking: bool,
    /// Iteration and work-stack budget for iterative algorithms.
    pub max_computation_steps: usize,
    /// Size bound, in bits, enforced by the overflow guard.
    pub max_bits: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            decimal_precision: 20,
            rounding_mode: RoundingMode::HalfEven,
            overflow_checking: true,
            max_computation_steps: 1_000_000,
            max_bits: 1 << 20,
        }
    }
}

/// Field-by-field overrides applied on top of a base [`Config`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Replaces `decimal_precision` when set.
    pub decimal_precision: Option<u32>,
    /// Replaces `rounding_mode` when set.
    pub rounding_mode: Option<RoundingMode>,
    /// Replaces `overflow_checking` when set.
    pub overflow_checking: Option<bool>,
    /// Replaces `max_computation_steps` when set.
    pub max_computation_steps: Option<usize>,
    /// Replaces `max_bits` when set.
    pub max_bits: Option<usize>,
}

impl Config {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with the given overrides applied.
    #[must_use]
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Self {
        Self {
            decimal_precision: overrides.decimal_precision.unwrap_or(self.decimal_precision),
            rounding_mode: overrides.rounding_mode.unwrap_or(self.rounding_mode),
            overflow_checking: overrides.overflow_checking.unwrap_or(self.overflow_checking),
            max_computation_steps: overrides
                .max_computation_steps
                .unwrap_or(self.max_computation_steps),
            max_bits: overrides.max_bits.unwrap_or(self.max_bits),
        }
    }

    /// Returns a copy with a different decimal precision.
    #[must_use]
    pub fn with_decimal_precision(mut self, precision: u32) -> Self {
        self.decimal_precision = precision;
        self
    }

    /// Returns a copy with a different rounding mode.
    #[must_use]
    pub fn with_rounding_mode(mut self, mode: RoundingMode) -> Self {
        self.rounding_mode = mode;
        self
    }

    /// Returns a copy with overflow checking switched on or off.
    #[must_use]
    pub fn with_overflow_checking(mut self, enabled: bool) -> Self {
        self.overflow_checking = enabled;
        self
    }

    /// Returns a copy with a different step budget.
    #[must_use]
    pub fn with_max_computation_steps(mut self, steps: usize) -> Self {
        self.max_computation_steps = steps;
        self
    }

    /// Returns a copy with a different size bound.
    #[must_use]
    pub fn with_max_bits(mut self, bits: usize) -> Self {
        self.max_bits = bits;
        self
    }

    /// Checks that every field is inside its domain.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidParameter`] for a zero bit bound or
    /// step budget, and [`ValidationError::InvalidPrecision`] for a precision
    /// above [`MAX_DECIMAL_PRECISION`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_bits == 0 {
            return Err(ValidationError::parameter("max_bits", "must be positive"));
        }
        if self.max_computation_steps == 0 {
            return Err(ValidationError::parameter(
                "max_computation_steps",
                "must be positive",
            ));
        }
        if self.decimal_precision > MAX_DECIMAL_PRECISION {
            return Err(ValidationError::InvalidPrecision {
                precision: self.decimal_precision,
                max: MAX_DECIMAL_PRECISION,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rounding_mode, RoundingMode::HalfEven);
        assert!(config.overflow_checking);
    }

    #[test]
    fn test_overrides_leave_base_untouched() {
        let base = Config::default();
        let overrides = ConfigOverrides {
            max_bits: Some(64),
            rounding_mode: Some(RoundingMode::Floor),
            ..ConfigOverrides::default()
        };
        let derived = base.with_overrides(&overrides);

        assert_eq!(derived.max_bits, 64);
        assert_eq!(derived.rounding_mode, RoundingMode::Floor);
        assert_eq!(derived.decimal_precision, base.decimal_precision);
        assert_eq!(base, Config::default());
    }

    #[test]
    fn test_builders() {
        let config = Config::new()
            .with_max_bits(128)
            .with_overflow_checking(false)
            .with_decimal_precision(4)
            .with_max_computation_steps(10);
        assert_eq!(config.max_bits, 128);
        assert!(!config.overflow_checking);
        assert_eq!(config.decimal_precision, 4);
        assert_eq!(config.max_computation_steps, 10);
    }

    #[test]
    fn test_validation() {
        assert!(Config::new().with_max_bits(0).validate().is_err());
        assert!(Config::new().with_max_computation_steps(0).validate().is_err());
        assert!(matches!(
            Config::new()
                .with_decimal_precision(MAX_DECIMAL_PRECISION + 1)
                .validate(),
            Err(ValidationError::InvalidPrecision { .. })
        ));
    }
}
