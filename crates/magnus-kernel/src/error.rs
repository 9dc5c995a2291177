//! Errors raised by kernel operations.

use magnus_integers::ValidationError;
use thiserror::Error;

/// The three failure kinds of the numeric kernel.
///
/// `Overflow` and `ComputationLimit` are recoverable: retrying with relaxed
/// bounds may succeed. `Validation` reports a caller or input error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ComputeError {
    /// Malformed input, invalid argument, or division by zero.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A result or intermediate would exceed the configured size bound.
    #[error("{operation} overflows the {limit}-bit bound: {detail}")]
    Overflow {
        /// The operation that was refused.
        operation: &'static str,
        /// The configured bound in bits.
        limit: usize,
        /// What exceeded it.
        detail: String,
    },

    /// The iteration or work-stack budget ran out.
    #[error("{operation} exhausted its budget of {limit} steps")]
    ComputationLimit {
        /// The operation that was stopped.
        operation: &'static str,
        /// The configured step budget.
        limit: usize,
    },
}

impl ComputeError {
    /// Returns true for errors a caller may retry with relaxed bounds.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Overflow { .. } | Self::ComputationLimit { .. })
    }

    /// Returns true for [`ComputeError::Overflow`].
    #[must_use]
    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::Overflow { .. })
    }
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, ComputeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        let overflow = ComputeError::Overflow {
            operation: "power",
            limit: 64,
            detail: "result needs at least 1001 bits".into(),
        };
        let limit = ComputeError::ComputationLimit {
            operation: "nth_root",
            limit: 10,
        };
        let invalid = ComputeError::from(ValidationError::DivisionByZero);

        assert!(overflow.is_recoverable());
        assert!(limit.is_recoverable());
        assert!(!invalid.is_recoverable());
        assert_eq!(invalid.to_string(), "division by zero");
        assert_eq!(
            overflow.to_string(),
            "power overflows the 64-bit bound: result needs at least 1001 bits"
        );
    }
}
