//! Fixed-point decimals over unbounded integers.
//!
//! A [`ScaledDecimal`] is an unscaled integer together with a base-10
//! scale, representing `unscaled / 10^scale` exactly. Operands are brought
//! to a common scale before they are combined, and digits are only ever
//! discarded through an explicit [`RoundingMode`].

use num_traits::Zero;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::integer::Integer;
use crate::rounding::{round_quotient, RoundingMode};

/// The largest number of fractional digits any operation will produce.
pub const MAX_DECIMAL_PRECISION: u32 = 100_000;

/// An exact fixed-point decimal `unscaled / 10^scale`.
///
/// Equality and ordering compare numeric values, so `1.0 == 1.00`.
#[derive(Clone, Default)]
pub struct ScaledDecimal {
    unscaled: Integer,
    scale: u32,
}

impl ScaledDecimal {
    /// Creates a decimal from its unscaled value and scale.
    #[must_use]
    pub fn new(unscaled: Integer, scale: u32) -> Self {
        Self { unscaled, scale }
    }

    /// Creates a decimal with scale zero.
    #[must_use]
    pub fn from_integer(value: Integer) -> Self {
        Self::new(value, 0)
    }

    /// Parses text of the form `[+-]digits[.digits]`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDecimal`] for anything else.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidDecimal {
            input: text.to_string(),
        };

        let trimmed = text.trim();
        let (negative, unsigned) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty()
            || (unsigned.contains('.') && fraction.is_empty())
            || !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let scale = u32::try_from(fraction.len()).map_err(|_| invalid())?;
        let digits = format!("{whole}{fraction}");
        let magnitude = Integer::from_str_radix(&digits, 10).map_err(|_| invalid())?;
        Ok(Self::new(if negative { -magnitude } else { magnitude }, scale))
    }

    /// Returns the unscaled integer.
    #[must_use]
    pub fn unscaled(&self) -> &Integer {
        &self.unscaled
    }

    /// Returns the number of fractional digits.
    #[must_use]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Returns true if the value is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.unscaled.is_zero()
    }

    /// Returns the sign: -1, 0, or 1.
    #[must_use]
    pub fn signum(&self) -> i8 {
        self.unscaled.signum()
    }

    /// Returns the same value at a scale of at least `scale`.
    ///
    /// This is exact: the unscaled value is multiplied by a power of ten.
    /// A target below the current scale leaves the value unchanged.
    #[must_use]
    pub fn rescale(&self, scale: u32) -> Self {
        if scale <= self.scale {
            return self.clone();
        }
        let factor = Integer::ten_pow((scale - self.scale) as usize);
        Self::new(&self.unscaled * &factor, scale)
    }

    /// Rounds to `precision` fractional digits.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPrecision`] if `precision` exceeds
    /// [`MAX_DECIMAL_PRECISION`].
    pub fn round(&self, precision: u32, mode: RoundingMode) -> Result<Self, ValidationError> {
        round(self, precision, mode)
    }

    /// Drops the fractional digits, rounding toward zero.
    #[must_use]
    pub fn trunc_to_integer(&self) -> Integer {
        &self.unscaled / &Integer::ten_pow(self.scale as usize)
    }

    /// Rounds to an integer with the given mode.
    #[must_use]
    pub fn to_integer(&self, mode: RoundingMode) -> Integer {
        // The divisor is a positive power of ten, so this cannot fail.
        round_quotient(&self.unscaled, &Integer::ten_pow(self.scale as usize), mode)
            .unwrap_or_else(|_| self.trunc_to_integer())
    }

    /// Divides by `other`, producing `precision` fractional digits.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DivisionByZero`] if `other` is zero and
    /// [`ValidationError::InvalidPrecision`] for an oversized precision.
    pub fn div(
        &self,
        other: &Self,
        precision: u32,
        mode: RoundingMode,
    ) -> Result<Self, ValidationError> {
        check_precision(precision)?;
        if other.is_zero() {
            return Err(ValidationError::DivisionByZero);
        }
        // (a / 10^sa) / (b / 10^sb) * 10^p = a * 10^(p + sb) / (b * 10^sa)
        let shift = combined_scale(precision, other.scale)?;
        let numerator = &self.unscaled * &Integer::ten_pow(shift as usize);
        let denominator = &other.unscaled * &Integer::ten_pow(self.scale as usize);
        let unscaled = round_quotient(&numerator, &denominator, mode)?;
        Ok(Self::new(unscaled, precision))
    }

    /// Multiplies exactly; the result scale is the sum of both scales.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPrecision`] if the scale sum does
    /// not fit a `u32`.
    pub fn checked_mul(&self, other: &Self) -> Result<Self, ValidationError> {
        let scale = combined_scale(self.scale, other.scale)?;
        Ok(Self::new(&self.unscaled * &other.unscaled, scale))
    }
}

fn combined_scale(a: u32, b: u32) -> Result<u32, ValidationError> {
    a.checked_add(b).ok_or(ValidationError::InvalidPrecision {
        precision: u32::MAX,
        max: MAX_DECIMAL_PRECISION,
    })
}

fn check_precision(precision: u32) -> Result<(), ValidationError> {
    if precision > MAX_DECIMAL_PRECISION {
        return Err(ValidationError::InvalidPrecision {
            precision,
            max: MAX_DECIMAL_PRECISION,
        });
    }
    Ok(())
}

/// Rounds `value` to `precision` fractional digits according to `mode`.
///
/// Raising the precision is exact and pads with zeros.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidPrecision`] if `precision` exceeds
/// [`MAX_DECIMAL_PRECISION`].
pub fn round(
    value: &ScaledDecimal,
    precision: u32,
    mode: RoundingMode,
) -> Result<ScaledDecimal, ValidationError> {
    check_precision(precision)?;
    if value.scale <= precision {
        return Ok(value.rescale(precision));
    }
    let divisor = Integer::ten_pow((value.scale - precision) as usize);
    let unscaled = round_quotient(&value.unscaled, &divisor, mode)?;
    Ok(ScaledDecimal::new(unscaled, precision))
}

/// Divides two integers, keeping `precision` fractional digits.
///
/// The integer quotient is exact; the fractional digits derived from the
/// remainder are rounded according to `mode`.
///
/// # Errors
///
/// Returns [`ValidationError::DivisionByZero`] when `denominator` is zero
/// and [`ValidationError::InvalidPrecision`] for an oversized precision.
pub fn scaled_division(
    numerator: &Integer,
    denominator: &Integer,
    precision: u32,
    mode: RoundingMode,
) -> Result<ScaledDecimal, ValidationError> {
    check_precision(precision)?;
    if denominator.is_zero() {
        return Err(ValidationError::DivisionByZero);
    }
    let scaled = numerator * &Integer::ten_pow(precision as usize);
    let unscaled = round_quotient(&scaled, denominator, mode)?;
    Ok(ScaledDecimal::new(unscaled, precision))
}

/// Brings two decimals to their common (larger) scale.
///
/// The operand with the smaller scale has its unscaled value multiplied by
/// the matching power of ten; the other is returned unchanged.
#[must_use]
pub fn normalize_precision(a: &ScaledDecimal, b: &ScaledDecimal) -> (ScaledDecimal, ScaledDecimal) {
    let scale = a.scale.max(b.scale);
    (a.rescale(scale), b.rescale(scale))
}

impl PartialEq for ScaledDecimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScaledDecimal {}

impl PartialOrd for ScaledDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScaledDecimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = normalize_precision(self, other);
        a.unscaled.cmp(&b.unscaled)
    }
}

impl fmt::Debug for ScaledDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScaledDecimal({self})")
    }
}

impl fmt::Display for ScaledDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.abs().to_string();
        let sign = if self.unscaled.is_negative() { "-" } else { "" };
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }
        let padded = format!("{digits:0>width$}", width = scale + 1);
        let (whole, fraction) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{whole}.{fraction}")
    }
}

impl FromStr for ScaledDecimal {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for &ScaledDecimal {
    type Output = ScaledDecimal;

    fn add(self, rhs: Self) -> Self::Output {
        let (a, b) = normalize_precision(self, rhs);
        ScaledDecimal::new(a.unscaled + b.unscaled, a.scale)
    }
}

impl Sub for &ScaledDecimal {
    type Output = ScaledDecimal;

    fn sub(self, rhs: Self) -> Self::Output {
        let (a, b) = normalize_precision(self, rhs);
        ScaledDecimal::new(a.unscaled - b.unscaled, a.scale)
    }
}

impl Neg for &ScaledDecimal {
    type Output = ScaledDecimal;

    fn neg(self) -> Self::Output {
        ScaledDecimal::new(-&self.unscaled, self.scale)
    }
}

impl From<Integer> for ScaledDecimal {
    fn from(value: Integer) -> Self {
        Self::from_integer(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(text: &str) -> ScaledDecimal {
        ScaledDecimal::parse(text).unwrap()
    }

    fn rounded(text: &str, precision: u32, mode: RoundingMode) -> String {
        round(&dec(text), precision, mode).unwrap().to_string()
    }

    #[test]
    fn test_parse_and_display() {
        let d = dec("-1.005");
        assert_eq!(d.unscaled().to_i64(), Some(-1005));
        assert_eq!(d.scale(), 3);
        assert_eq!(d.to_string(), "-1.005");
        assert_eq!(dec("0.05").to_string(), "0.05");
        assert_eq!(dec("-0.5").to_string(), "-0.5");
        assert_eq!(dec("42").to_string(), "42");

        for bad in ["", ".5", "5.", "1.2.3", "1e5", "-", "1,5"] {
            assert!(ScaledDecimal::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(dec("1.0"), dec("1.00"));
        assert!(dec("1.01") > dec("1.0099"));
        assert!(dec("-2") < dec("-1.5"));
    }

    #[test]
    fn test_round_half_even_ties() {
        assert_eq!(rounded("1.005", 2, RoundingMode::HalfEven), "1.00");
        assert_eq!(rounded("1.015", 2, RoundingMode::HalfEven), "1.02");
        assert_eq!(rounded("-1.005", 2, RoundingMode::HalfEven), "-1.00");
        assert_eq!(rounded("2.5", 0, RoundingMode::HalfEven), "2");
        assert_eq!(rounded("3.5", 0, RoundingMode::HalfEven), "4");
        // A trailing non-zero digit means the run is not an exact tie.
        assert_eq!(rounded("1.00501", 2, RoundingMode::HalfEven), "1.01");
    }

    #[test]
    fn test_round_each_mode_tie_and_non_tie() {
        let cases = [
            (RoundingMode::Floor, "1.00", "1.00", "-1.01", "-1.01"),
            (RoundingMode::Ceil, "1.01", "1.01", "-1.00", "-1.00"),
            (RoundingMode::Down, "1.00", "1.00", "-1.00", "-1.00"),
            (RoundingMode::Up, "1.01", "1.01", "-1.01", "-1.01"),
            (RoundingMode::HalfEven, "1.00", "1.00", "-1.00", "-1.00"),
            (RoundingMode::HalfUp, "1.01", "1.00", "-1.01", "-1.00"),
            (RoundingMode::HalfDown, "1.00", "1.00", "-1.00", "-1.00"),
        ];
        for (mode, tie, below, neg_tie, neg_below) in cases {
            assert_eq!(rounded("1.005", 2, mode), tie, "{mode} tie");
            assert_eq!(rounded("1.004", 2, mode), below, "{mode} non-tie");
            assert_eq!(rounded("-1.005", 2, mode), neg_tie, "{mode} negative tie");
            assert_eq!(rounded("-1.004", 2, mode), neg_below, "{mode} negative non-tie");
        }
        // Above the midpoint, every nearest mode agrees.
        for mode in [RoundingMode::HalfEven, RoundingMode::HalfUp, RoundingMode::HalfDown] {
            assert_eq!(rounded("1.006", 2, mode), "1.01");
        }
    }

    #[test]
    fn test_round_up_in_precision_is_exact() {
        let r = round(&dec("1.5"), 4, RoundingMode::Down).unwrap();
        assert_eq!(r.to_string(), "1.5000");
        assert!(round(&dec("1.5"), MAX_DECIMAL_PRECISION + 1, RoundingMode::Down).is_err());
    }

    #[test]
    fn test_scaled_division() {
        let one = Integer::new(1);
        let three = Integer::new(3);
        let r = scaled_division(&one, &three, 5, RoundingMode::HalfEven).unwrap();
        assert_eq!(r.to_string(), "0.33333");
        let r = scaled_division(&Integer::new(2), &three, 3, RoundingMode::Down).unwrap();
        assert_eq!(r.to_string(), "0.666");
        let r = scaled_division(&Integer::new(2), &three, 3, RoundingMode::HalfUp).unwrap();
        assert_eq!(r.to_string(), "0.667");
        let r = scaled_division(&Integer::new(-1), &Integer::new(8), 2, RoundingMode::HalfEven)
            .unwrap();
        assert_eq!(r.to_string(), "-0.12");
        assert_eq!(
            scaled_division(&one, &Integer::new(0), 2, RoundingMode::Floor),
            Err(ValidationError::DivisionByZero)
        );
    }

    #[test]
    fn test_normalize_precision() {
        let (a, b) = normalize_precision(&dec("1.5"), &dec("2.125"));
        assert_eq!(a.scale(), 3);
        assert_eq!(a.unscaled().to_i64(), Some(1500));
        assert_eq!(b.unscaled().to_i64(), Some(2125));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!((&dec("1.5") + &dec("2.125")).to_string(), "3.625");
        assert_eq!((&dec("1.5") - &dec("2.125")).to_string(), "-0.625");
        assert_eq!(dec("1.5").checked_mul(&dec("-0.25")).unwrap().to_string(), "-0.375");
        let q = dec("1").div(&dec("0.3"), 4, RoundingMode::HalfEven).unwrap();
        assert_eq!(q.to_string(), "3.3333");
        assert!(dec("1").div(&dec("0.0"), 4, RoundingMode::HalfEven).is_err());
    }

    #[test]
    fn test_scale_sum_overflow_is_rejected() {
        let wide = ScaledDecimal::new(Integer::new(1), u32::MAX);
        let tenth = ScaledDecimal::new(Integer::new(1), 1);
        assert!(matches!(
            wide.checked_mul(&tenth),
            Err(ValidationError::InvalidPrecision { .. })
        ));
        assert!(matches!(
            tenth.div(&wide, 2, RoundingMode::Down),
            Err(ValidationError::InvalidPrecision { .. })
        ));
        assert_eq!(tenth.checked_mul(&tenth).unwrap().scale(), 2);
    }

    #[test]
    fn test_rescale() {
        let r = dec("1.5").rescale(3);
        assert_eq!(r.scale(), 3);
        assert_eq!(r.unscaled().to_i64(), Some(1500));
        assert_eq!(dec("1.25").rescale(1).scale(), 2);
    }

    #[test]
    fn test_integer_conversion() {
        assert_eq!(dec("-2.7").trunc_to_integer().to_i64(), Some(-2));
        assert_eq!(dec("-2.7").to_integer(RoundingMode::Floor).to_i64(), Some(-3));
        assert_eq!(dec("2.5").to_integer(RoundingMode::HalfEven).to_i64(), Some(2));
    }
}
