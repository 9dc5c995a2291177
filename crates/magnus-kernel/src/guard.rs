//! Overflow guard.
//!
//! The guard compares operand and result sizes against the configured bit
//! bound. Checks that can be decided from the operands alone run before the
//! operation, so an operation that is certain to exceed the bound is never
//! attempted; the remaining cases are caught on the result.
//!
//! A disabled guard accepts everything: callers that switch overflow
//! checking off always receive the exact result.

use magnus_integers::Integer;
use num_traits::Zero;
use tracing::debug;

use crate::config::Config;
use crate::error::{ComputeError, Result};

/// Size checks derived from a [`Config`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverflowGuard {
    enabled: bool,
    max_bits: usize,
}

impl OverflowGuard {
    /// Creates the guard described by `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.overflow_checking,
            max_bits: config.max_bits,
        }
    }

    /// Creates an active guard with an explicit bound.
    #[must_use]
    pub fn with_max_bits(max_bits: usize) -> Self {
        Self {
            enabled: true,
            max_bits,
        }
    }

    /// Creates a guard that accepts everything.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            max_bits: usize::MAX,
        }
    }

    /// Returns true when checks are active.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the bound in bits.
    #[must_use]
    pub fn max_bits(&self) -> usize {
        self.max_bits
    }

    fn reject(&self, operation: &'static str, needed: usize) -> ComputeError {
        debug!(operation, needed, limit = self.max_bits, "overflow guard rejected operation");
        ComputeError::Overflow {
            operation,
            limit: self.max_bits,
            detail: format!("result needs at least {needed} bits"),
        }
    }

    /// Fails if `value` is wider than the bound.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Overflow`] when the check fails.
    pub fn check_result(&self, operation: &'static str, value: &Integer) -> Result<()> {
        if self.enabled && value.bit_len() > self.max_bits {
            return Err(self.reject(operation, value.bit_len()));
        }
        Ok(())
    }

    /// Fails if an intermediate of `needed` bits would exceed the bound.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Overflow`] when the check fails.
    pub fn check_bits(&self, operation: &'static str, needed: usize) -> Result<()> {
        if self.enabled && needed > self.max_bits {
            return Err(self.reject(operation, needed));
        }
        Ok(())
    }

    /// Pre-checks an addition.
    ///
    /// Adding operands of equal sign never shrinks the magnitude, so an
    /// oversized operand of that kind already decides the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Overflow`] when the check fails.
    pub fn check_add(&self, a: &Integer, b: &Integer) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let same_sign = a.signum() * b.signum() >= 0;
        let widest = a.bit_len().max(b.bit_len());
        if same_sign && widest > self.max_bits {
            return Err(self.reject("add", widest));
        }
        Ok(())
    }

    /// Pre-checks a multiplication.
    ///
    /// A product of `p`- and `q`-bit magnitudes needs at least `p + q - 1`
    /// bits.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Overflow`] when the check fails.
    pub fn check_multiply(&self, a: &Integer, b: &Integer) -> Result<()> {
        if !self.enabled || a.is_zero() || b.is_zero() {
            return Ok(());
        }
        let needed = a.bit_len() + b.bit_len() - 1;
        if needed > self.max_bits {
            return Err(self.reject("multiply", needed));
        }
        Ok(())
    }

    /// Pre-checks `base^exponent`.
    ///
    /// For `|base| >= 2` with `b` bits the power needs at least
    /// `(b - 1) * exponent + 1` bits.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Overflow`] when the check fails.
    pub fn check_power(&self, base: &Integer, exponent: &Integer) -> Result<()> {
        if !self.enabled || exponent.is_zero() || base.bit_len() <= 1 {
            return Ok(());
        }
        let per_step = base.bit_len() - 1;
        let needed = exponent
            .to_usize()
            .and_then(|e| e.checked_mul(per_step))
            .and_then(|bits| bits.checked_add(1));
        match needed {
            Some(bits) if bits <= self.max_bits => Ok(()),
            Some(bits) => Err(self.reject("power", bits)),
            None => Err(self.reject("power", usize::MAX)),
        }
    }

    /// Pre-checks `value << shift`.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Overflow`] when the check fails.
    pub fn check_shift(&self, value: &Integer, shift: usize) -> Result<()> {
        if !self.enabled || value.is_zero() {
            return Ok(());
        }
        let needed = value.bit_len().saturating_add(shift);
        if needed > self.max_bits {
            return Err(self.reject("shift_left", needed));
        }
        Ok(())
    }
}
