//! Numeric input normalization.
//!
//! Callers hand the library text, machine numbers, or already-built
//! integers. [`NumericInput`] tags which one it is and [`normalize`]
//! turns every tag into an exact [`Integer`], or rejects it. Nothing is
//! ever silently truncated or coerced.

use crate::error::ValidationError;
use crate::integer::Integer;

/// A numeric argument before normalization.
#[derive(Clone, Debug, PartialEq)]
pub enum NumericInput {
    /// Decimal text such as `"-12345678901234567890"`.
    Text(String),
    /// A machine integer.
    Int(i128),
    /// A floating-point number; accepted only when finite and integral.
    Float(f64),
    /// An already-normalized integer.
    Big(Integer),
    /// A null or absent value.
    Absent,
}

/// Normalizes any supported input into an [`Integer`].
///
/// # Errors
///
/// - [`ValidationError::InvalidInteger`] for text that is not an optionally
///   signed run of decimal digits (decimal points and exponents included)
/// - [`ValidationError::NonFinite`] for NaN and infinities
/// - [`ValidationError::Fractional`] for floats with a fractional part
/// - [`ValidationError::Missing`] for [`NumericInput::Absent`]
pub fn normalize(input: impl Into<NumericInput>) -> Result<Integer, ValidationError> {
    match input.into() {
        NumericInput::Text(text) => normalize_text(&text, 10),
        NumericInput::Int(value) => Ok(Integer::from(value)),
        NumericInput::Float(value) => normalize_float(value),
        NumericInput::Big(value) => Ok(value),
        NumericInput::Absent => Err(ValidationError::Missing),
    }
}

/// Parses integer text in an explicit radix.
///
/// A radix of 0 selects the radix from a `0x`, `0o`, or `0b` prefix and
/// falls back to decimal. With an explicit radix, a prefix is accepted only
/// when it names that same radix.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidRadix`] for a radix outside `2..=36`
/// and [`ValidationError::InvalidInteger`] for malformed text.
pub fn normalize_radix(text: &str, radix: u32) -> Result<Integer, ValidationError> {
    if radix != 0 && !(2..=36).contains(&radix) {
        return Err(ValidationError::InvalidRadix { radix });
    }
    normalize_text(text, radix)
}

fn normalize_text(text: &str, radix: u32) -> Result<Integer, ValidationError> {
    let invalid = || ValidationError::InvalidInteger {
        input: text.to_string(),
    };

    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, digits) = split_prefix(unsigned, radix).ok_or_else(invalid)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }

    let magnitude = Integer::from_str_radix(digits, radix).map_err(|_| invalid())?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Resolves the effective radix and strips a matching prefix.
fn split_prefix(text: &str, radix: u32) -> Option<(u32, &str)> {
    let lower = text.get(..2).map(str::to_ascii_lowercase);
    let prefixed = match lower.as_deref() {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };

    match (prefixed, radix) {
        (Some(p), 0) => Some((p, &text[2..])),
        (Some(p), r) if p == r => Some((p, &text[2..])),
        // "0b1" in radix 16 is a plain hexadecimal literal.
        (Some(_), 16) => Some((16, text)),
        (Some(_), _) => None,
        (None, 0) => Some((10, text)),
        (None, r) => Some((r, text)),
    }
}

fn normalize_float(value: f64) -> Result<Integer, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite {
            value: value.to_string(),
        });
    }
    if value.fract() != 0.0 {
        return Err(ValidationError::Fractional {
            value: value.to_string(),
        });
    }

    // Integral magnitudes below 2^63 are exact in an i64.
    if value.abs() < 9_223_372_036_854_775_808.0 {
        #[allow(clippy::cast_possible_truncation)]
        return Ok(Integer::new(value as i64));
    }

    // Larger integral values: mantissa * 2^(exponent - 1075), exponent > 0.
    let bits = value.to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as usize;
    let mantissa = (bits & ((1u64 << 52) - 1)) | (1u64 << 52);
    let magnitude = Integer::from(mantissa) * Integer::two_pow(exponent - 1075);
    Ok(if value.is_sign_negative() {
        -magnitude
    } else {
        magnitude
    })
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for NumericInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for NumericInput {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for NumericInput {
                fn from(value: $t) -> Self {
                    Self::Int(i128::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl From<usize> for NumericInput {
    fn from(value: usize) -> Self {
        Self::Big(Integer::from(value))
    }
}

impl From<isize> for NumericInput {
    fn from(value: isize) -> Self {
        Self::Big(Integer::from(value))
    }
}

impl From<u128> for NumericInput {
    fn from(value: u128) -> Self {
        Self::Big(Integer::from(value))
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for NumericInput {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<Integer> for NumericInput {
    fn from(value: Integer) -> Self {
        Self::Big(value)
    }
}

impl From<&Integer> for NumericInput {
    fn from(value: &Integer) -> Self {
        Self::Big(value.clone())
    }
}

impl<T: Into<NumericInput>> From<Option<T>> for NumericInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

impl NumericInput {
    /// Returns true for [`NumericInput::Absent`].
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Normalizes an input that must be non-negative.
///
/// # Errors
///
/// Fails like [`normalize`], or with [`ValidationError::NegativeArgument`]
/// naming `name` when the value is below zero.
pub fn normalize_non_negative(
    input: impl Into<NumericInput>,
    name: &'static str,
) -> Result<Integer, ValidationError> {
    let value = normalize(input)?;
    if value.is_negative() {
        return Err(ValidationError::negative(name, &value));
    }
    Ok(value)
}

/// Normalizes a non-negative input that must fit a `u64`.
///
/// # Errors
///
/// Fails like [`normalize_non_negative`], or with
/// [`ValidationError::NotRepresentable`] when the value exceeds `u64::MAX`.
pub fn normalize_u64(input: impl Into<NumericInput>, name: &'static str) -> Result<u64, ValidationError> {
    let value = normalize_non_negative(input, name)?;
    value.to_u64().ok_or_else(|| ValidationError::NotRepresentable {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_inputs() {
        assert_eq!(normalize("42").unwrap(), Integer::new(42));
        assert_eq!(normalize("  -17 ").unwrap(), Integer::new(-17));
        assert_eq!(normalize("+0007").unwrap(), Integer::new(7));
        assert_eq!(normalize("-0").unwrap(), Integer::new(0));
        assert_eq!(
            normalize("12345678901234567890123").unwrap().to_string(),
            "12345678901234567890123"
        );
    }

    #[test]
    fn test_rejects_malformed_text() {
        for bad in ["", "-", "+", "1.5", "1e10", "12a", "--3", "0x1f", " 1 2", "١٢"] {
            assert!(
                matches!(normalize(bad), Err(ValidationError::InvalidInteger { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_float_inputs() {
        assert_eq!(normalize(12.0).unwrap(), Integer::new(12));
        assert_eq!(normalize(-3.0f32).unwrap(), Integer::new(-3));
        assert_eq!(
            normalize(1e20).unwrap().to_string(),
            "100000000000000000000"
        );
        assert_eq!(normalize(-(2f64.powi(70))).unwrap(), -Integer::two_pow(70));

        assert_eq!(
            normalize(f64::NAN),
            Err(ValidationError::NonFinite {
                value: "NaN".into()
            })
        );
        assert!(matches!(
            normalize(f64::NEG_INFINITY),
            Err(ValidationError::NonFinite { .. })
        ));
        assert_eq!(
            normalize(0.5),
            Err(ValidationError::Fractional {
                value: "0.5".into()
            })
        );
    }

    #[test]
    fn test_absent_inputs() {
        assert_eq!(normalize(None::<i64>), Err(ValidationError::Missing));
        assert_eq!(normalize(Some(5i64)).unwrap(), Integer::new(5));
        assert!(NumericInput::from(None::<&str>).is_absent());
    }

    #[test]
    fn test_radix_inputs() {
        assert_eq!(normalize_radix("ff", 16).unwrap(), Integer::new(255));
        assert_eq!(normalize_radix("0xff", 0).unwrap(), Integer::new(255));
        assert_eq!(normalize_radix("-0b101", 0).unwrap(), Integer::new(-5));
        assert_eq!(normalize_radix("0o17", 8).unwrap(), Integer::new(15));
        assert_eq!(normalize_radix("0b1", 16).unwrap(), Integer::new(0xb1));
        assert_eq!(normalize_radix("99", 0).unwrap(), Integer::new(99));

        assert!(normalize_radix("0x10", 8).is_err());
        assert!(normalize_radix("12", 2).is_err());
        assert_eq!(
            normalize_radix("1", 40),
            Err(ValidationError::InvalidRadix { radix: 40 })
        );
    }

    #[test]
    fn test_non_negative_helpers() {
        assert_eq!(normalize_u64("10", "n").unwrap(), 10);
        assert!(matches!(
            normalize_u64(-1, "n"),
            Err(ValidationError::NegativeArgument { name: "n", .. })
        ));
        assert!(matches!(
            normalize_u64("18446744073709551616", "n"),
            Err(ValidationError::NotRepresentable { .. })
        ));
    }
}
