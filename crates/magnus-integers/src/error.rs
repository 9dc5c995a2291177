//! Validation errors.
//!
//! Every malformed-input condition in the numeric stack is reported through
//! [`ValidationError`]. Higher layers wrap it alongside their own overflow
//! and step-budget failures.

use thiserror::Error;

/// Errors raised when an input or argument is not acceptable.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Text that is not an integer in the requested notation.
    #[error("invalid integer literal {input:?}")]
    InvalidInteger {
        /// The rejected text.
        input: String,
    },

    /// Text that is not a plain decimal literal.
    #[error("invalid decimal literal {input:?}")]
    InvalidDecimal {
        /// The rejected text.
        input: String,
    },

    /// A floating input that is NaN or infinite.
    #[error("non-finite number {value}")]
    NonFinite {
        /// The rejected value, rendered in decimal.
        value: String,
    },

    /// A floating input with a fractional part.
    #[error("number {value} is not integral")]
    Fractional {
        /// The rejected value, rendered in decimal.
        value: String,
    },

    /// A null or absent input.
    #[error("missing numeric input")]
    Missing,

    /// A radix outside `2..=36`.
    #[error("unsupported radix {radix}")]
    InvalidRadix {
        /// The rejected radix.
        radix: u32,
    },

    /// Division or modulo by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// An argument that must be non-negative was negative.
    #[error("{name} must be non-negative, got {value}")]
    NegativeArgument {
        /// Argument name.
        name: &'static str,
        /// The rejected value, rendered in decimal.
        value: String,
    },

    /// A `[lo, hi]` range that is empty or outside `[0, len)`.
    #[error("invalid range [{lo}, {hi}] for length {len}")]
    InvalidRange {
        /// Lower bound.
        lo: usize,
        /// Upper bound.
        hi: usize,
        /// Current length.
        len: usize,
    },

    /// An index outside `[0, len)`.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// Current length.
        len: usize,
    },

    /// A decimal precision outside the supported range.
    #[error("precision {precision} exceeds the maximum of {max}")]
    InvalidPrecision {
        /// The rejected precision.
        precision: u32,
        /// The largest accepted precision.
        max: u32,
    },

    /// An unrecognized rounding mode name.
    #[error("unknown rounding mode {name:?}")]
    InvalidRoundingMode {
        /// The rejected name.
        name: String,
    },

    /// A configuration or structural parameter out of its domain.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// No integer root satisfies the requested inverse operation.
    #[error("no integer {operation} root of {value}")]
    NoIntegerRoot {
        /// The inverse operation that was attempted.
        operation: &'static str,
        /// The value whose root was requested.
        value: String,
    },

    /// A value too large for the machine-sized argument it must feed.
    #[error("{name} = {value} does not fit the supported range")]
    NotRepresentable {
        /// Argument name.
        name: &'static str,
        /// The rejected value, rendered in decimal.
        value: String,
    },
}

impl ValidationError {
    /// Builds a [`ValidationError::NegativeArgument`].
    pub fn negative(name: &'static str, value: impl ToString) -> Self {
        Self::NegativeArgument {
            name,
            value: value.to_string(),
        }
    }

    /// Builds a [`ValidationError::InvalidParameter`].
    pub fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
