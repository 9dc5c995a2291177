//! Rounding disciplines.
//!
//! All rounding in the crate reduces to one primitive: dividing two
//! integers and choosing which neighbouring integer the exact quotient
//! lands on. [`round_quotient`] implements that choice for every
//! [`RoundingMode`].

use num_traits::{One, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::integer::Integer;

/// How to resolve digits that do not fit the requested precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RoundingMode {
    /// Toward negative infinity.
    Floor,
    /// Toward positive infinity.
    Ceil,
    /// Toward zero (truncation).
    Down,
    /// Away from zero.
    Up,
    /// To nearest; exact ties go to the even neighbour (banker's rounding).
    #[default]
    HalfEven,
    /// To nearest; exact ties go away from zero.
    HalfUp,
    /// To nearest; exact ties go toward zero.
    HalfDown,
}

impl RoundingMode {
    /// All modes, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Floor,
        Self::Ceil,
        Self::Down,
        Self::Up,
        Self::HalfEven,
        Self::HalfUp,
        Self::HalfDown,
    ];

    /// The canonical upper-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Floor => "FLOOR",
            Self::Ceil => "CEIL",
            Self::Down => "DOWN",
            Self::Up => "UP",
            Self::HalfEven => "HALF_EVEN",
            Self::HalfUp => "HALF_UP",
            Self::HalfDown => "HALF_DOWN",
        }
    }

    /// Decides whether a truncated quotient moves one step away from zero.
    ///
    /// `sign` is the sign of the exact quotient, `half` compares the
    /// discarded fraction against one half, and `odd` reports whether the
    /// truncated quotient is odd.
    fn away_from_zero(self, sign: i8, half: Ordering, odd: bool) -> bool {
        match self {
            Self::Down => false,
            Self::Up => true,
            Self::Floor => sign < 0,
            Self::Ceil => sign > 0,
            Self::HalfUp => half != Ordering::Less,
            Self::HalfDown => half == Ordering::Greater,
            Self::HalfEven => match half {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => odd,
            },
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RoundingMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == wanted)
            .ok_or_else(|| ValidationError::InvalidRoundingMode { name: s.to_string() })
    }
}

/// Divides `numerator` by `denominator` and rounds the exact quotient to an
/// integer according to `mode`.
///
/// A tie is a remainder of exactly half the divisor, which in decimal terms
/// is a discarded digit run of exactly `5000…`.
///
/// # Errors
///
/// Returns [`ValidationError::DivisionByZero`] when `denominator` is zero.
pub fn round_quotient(
    numerator: &Integer,
    denominator: &Integer,
    mode: RoundingMode,
) -> Result<Integer, ValidationError> {
    if denominator.is_zero() {
        return Err(ValidationError::DivisionByZero);
    }

    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.is_zero() {
        return Ok(quotient);
    }

    let sign = numerator.signum() * denominator.signum();
    let doubled = remainder.abs() * Integer::new(2);
    let half = doubled.cmp(&denominator.abs());

    if mode.away_from_zero(sign, half, !quotient.is_even()) {
        let step = if sign < 0 { -Integer::one() } else { Integer::one() };
        Ok(quotient + step)
    } else {
        Ok(quotient)
    }
}
