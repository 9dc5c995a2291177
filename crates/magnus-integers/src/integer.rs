//! Arbitrary precision integers.
//!
//! This module provides a wrapper around `dashu::IBig` with the
//! conversions and bit-level queries the arithmetic kernel needs.

use dashu::base::{Abs, BitTest, Gcd, Signed as DashuSigned};
use dashu::integer::IBig;
use num_traits::{One, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Not, Rem, Sub};
use std::str::FromStr;

use crate::error::ValidationError;
use crate::input::normalize;

/// An arbitrary precision integer.
///
/// This is the universal value type: every operation in the numeric
/// stack consumes and produces `Integer`s.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Integer(IBig);

impl Integer {
    /// Creates a new integer from an i64.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(IBig::from(value))
    }

    /// Parses a base-10 integer literal.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidInteger`] if the text is not an
    /// optionally signed run of decimal digits.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        normalize(text)
    }

    /// Creates an integer from a string in the given base.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid integer.
    pub fn from_str_radix(s: &str, radix: u32) -> Result<Self, dashu::base::error::ParseError> {
        IBig::from_str_radix(s, radix).map(Self)
    }

    /// Returns `10^exp`.
    #[must_use]
    pub fn ten_pow(exp: usize) -> Self {
        Self(IBig::from(10u8).pow(exp))
    }

    /// Returns `2^exp`.
    #[must_use]
    pub fn two_pow(exp: usize) -> Self {
        Self(IBig::ONE << exp)
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.clone().abs())
    }

    /// Returns the sign: -1, 0, or 1.
    #[must_use]
    pub fn signum(&self) -> i8 {
        if self.0.is_zero() {
            0
        } else if DashuSigned::is_positive(&self.0) {
            1
        } else {
            -1
        }
    }

    /// Returns true if this integer is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        DashuSigned::is_negative(&self.0)
    }

    /// Returns true if this integer is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        DashuSigned::is_positive(&self.0)
    }

    /// Returns true if this integer is divisible by two.
    #[must_use]
    pub fn is_even(&self) -> bool {
        (&self.0 % &IBig::from(2u8)).is_zero()
    }

    /// Returns the number of bits needed to represent the magnitude.
    ///
    /// Zero has a bit length of zero.
    #[must_use]
    pub fn bit_len(&self) -> usize {
        self.0.bit_len()
    }

    /// Returns the number of decimal digits of the magnitude.
    ///
    /// Zero has one digit.
    #[must_use]
    pub fn decimal_digits(&self) -> usize {
        let text = self.0.to_string();
        text.strip_prefix('-').unwrap_or(&text).len()
    }

    /// Computes the greatest common divisor.
    #[must_use]
    pub fn gcd(&self, other: &Self) -> Self {
        Self(IBig::from(self.0.clone().gcd(other.0.clone())))
    }

    /// Computes the least common multiple.
    #[must_use]
    pub fn lcm(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let g = self.gcd(other);
        Self(&self.0 / &g.0 * &other.0).abs()
    }

    /// Attempts to convert to an i64.
    ///
    /// Returns `None` if the value doesn't fit in an i64.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        self.0.clone().try_into().ok()
    }

    /// Attempts to convert to a u64.
    #[must_use]
    pub fn to_u64(&self) -> Option<u64> {
        self.0.clone().try_into().ok()
    }

    /// Attempts to convert to a usize.
    #[must_use]
    pub fn to_usize(&self) -> Option<usize> {
        self.0.clone().try_into().ok()
    }

    /// Returns the nearest `f64`, or an infinity when out of range.
    ///
    /// Only meant for reporting; exact work never goes through floats.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.0.to_string().parse().unwrap_or(f64::NAN)
    }

    /// Computes self^exp for non-negative exp.
    #[must_use]
    pub fn pow(&self, exp: usize) -> Self {
        Self(self.0.pow(exp))
    }

    /// Division rounding toward negative infinity, paired with the
    /// remainder carrying the divisor's sign.
    ///
    /// # Panics
    ///
    /// Panics if `divisor` is zero.
    #[must_use]
    pub fn div_rem_floor(&self, divisor: &Self) -> (Self, Self) {
        let q = &self.0 / &divisor.0;
        let r = &self.0 % &divisor.0;
        if !r.is_zero() && (DashuSigned::is_negative(&r) != DashuSigned::is_negative(&divisor.0)) {
            (Self(q - IBig::ONE), Self(r + &divisor.0))
        } else {
            (Self(q), Self(r))
        }
    }

    /// Compares magnitudes, ignoring sign.
    #[must_use]
    pub fn cmp_abs(&self, other: &Self) -> Ordering {
        self.abs().cmp(&other.abs())
    }
}

impl Zero for Integer {
    fn zero() -> Self {
        Self(IBig::ZERO)
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl One for Integer {
    fn one() -> Self {
        Self(IBig::ONE)
    }

    fn is_one(&self) -> bool {
        self.0 == IBig::ONE
    }
}

impl fmt::Debug for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Integer({})", self.0)
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Integer {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Arithmetic operations
impl Add for Integer {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Add<&Integer> for Integer {
    type Output = Self;

    fn add(self, rhs: &Integer) -> Self::Output {
        Self(self.0 + &rhs.0)
    }
}

impl Add for &Integer {
    type Output = Integer;

    fn add(self, rhs: Self) -> Self::Output {
        Integer(&self.0 + &rhs.0)
    }
}

impl Sub for Integer {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sub<&Integer> for Integer {
    type Output = Self;

    fn sub(self, rhs: &Integer) -> Self::Output {
        Self(self.0 - &rhs.0)
    }
}

impl Sub for &Integer {
    type Output = Integer;

    fn sub(self, rhs: Self) -> Self::Output {
        Integer(&self.0 - &rhs.0)
    }
}

impl Mul for Integer {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl Mul<&Integer> for Integer {
    type Output = Self;

    fn mul(self, rhs: &Integer) -> Self::Output {
        Self(self.0 * &rhs.0)
    }
}

impl Mul for &Integer {
    type Output = Integer;

    fn mul(self, rhs: Self) -> Self::Output {
        Integer(&self.0 * &rhs.0)
    }
}

// Division truncates toward zero; the remainder takes the dividend's sign.
impl Div for Integer {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Self(self.0 / rhs.0)
    }
}

impl Div<&Integer> for Integer {
    type Output = Self;

    fn div(self, rhs: &Integer) -> Self::Output {
        Self(self.0 / &rhs.0)
    }
}

impl Div for &Integer {
    type Output = Integer;

    fn div(self, rhs: Self) -> Self::Output {
        Integer(&self.0 / &rhs.0)
    }
}

impl Rem for Integer {
    type Output = Self;

    fn rem(self, rhs: Self) -> Self::Output {
        Self(self.0 % rhs.0)
    }
}

impl Rem for &Integer {
    type Output = Integer;

    fn rem(self, rhs: Self) -> Self::Output {
        Integer(&self.0 % &rhs.0)
    }
}

impl Neg for Integer {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Neg for &Integer {
    type Output = Integer;

    fn neg(self) -> Self::Output {
        Integer(-&self.0)
    }
}

// Bitwise operations use two's-complement semantics.
impl BitAnd for &Integer {
    type Output = Integer;

    fn bitand(self, rhs: Self) -> Self::Output {
        Integer(&self.0 & &rhs.0)
    }
}

impl BitOr for &Integer {
    type Output = Integer;

    fn bitor(self, rhs: Self) -> Self::Output {
        Integer(&self.0 | &rhs.0)
    }
}

impl BitXor for &Integer {
    type Output = Integer;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Integer(&self.0 ^ &rhs.0)
    }
}

impl Not for &Integer {
    type Output = Integer;

    fn not(self) -> Self::Output {
        Integer(-&self.0 - IBig::ONE)
    }
}

macro_rules! impl_from_primitive {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Integer {
                fn from(value: $t) -> Self {
                    Self(IBig::from(value))
                }
            }
        )*
    };
}

impl_from_primitive!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<IBig> for Integer {
    fn from(value: IBig) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_ops() {
        let a = Integer::new(10);
        let b = Integer::new(3);

        assert_eq!((a.clone() + b.clone()).to_i64(), Some(13));
        assert_eq!((a.clone() - b.clone()).to_i64(), Some(7));
        assert_eq!((a.clone() * b.clone()).to_i64(), Some(30));
        assert_eq!((a.clone() / b.clone()).to_i64(), Some(3));
        assert_eq!((a % b).to_i64(), Some(1));
    }

    #[test]
    fn test_truncating_division_signs() {
        let a = Integer::new(-7);
        let b = Integer::new(2);
        assert_eq!((&a / &b).to_i64(), Some(-3));
        assert_eq!((&a % &b).to_i64(), Some(-1));

        let (q, r) = a.div_rem_floor(&b);
        assert_eq!(q.to_i64(), Some(-4));
        assert_eq!(r.to_i64(), Some(1));

        let (q, r) = Integer::new(7).div_rem_floor(&Integer::new(-2));
        assert_eq!(q.to_i64(), Some(-4));
        assert_eq!(r.to_i64(), Some(-1));
    }

    #[test]
    fn test_gcd() {
        let a = Integer::new(48);
        let b = Integer::new(18);
        assert_eq!(a.gcd(&b).to_i64(), Some(6));
        assert_eq!(a.lcm(&b).to_i64(), Some(144));
    }

    #[test]
    fn test_large_numbers() {
        let a = Integer::from_str_radix("123456789012345678901234567890", 10).unwrap();
        let b = Integer::from_str_radix("987654321098765432109876543210", 10).unwrap();
        let sum = a + b;
        assert_eq!(sum.to_string(), "1111111110111111111011111111100");
    }

    #[test]
    fn test_bit_queries() {
        assert_eq!(Integer::zero().bit_len(), 0);
        assert_eq!(Integer::new(255).bit_len(), 8);
        assert_eq!(Integer::new(-256).bit_len(), 9);
        assert_eq!(Integer::two_pow(64).bit_len(), 65);
        assert!(Integer::new(-4).is_even());
        assert!(!Integer::new(7).is_even());
    }

    #[test]
    fn test_decimal_digits() {
        assert_eq!(Integer::zero().decimal_digits(), 1);
        assert_eq!(Integer::new(-12345).decimal_digits(), 5);
        assert_eq!(Integer::ten_pow(40).decimal_digits(), 41);
    }

    #[test]
    fn test_bitwise_twos_complement() {
        let a = Integer::new(-6);
        let b = Integer::new(3);
        assert_eq!((&a & &b).to_i64(), Some(-6 & 3));
        assert_eq!((&a | &b).to_i64(), Some(-6 | 3));
        assert_eq!((&a ^ &b).to_i64(), Some(-6 ^ 3));
        assert_eq!((!&a).to_i64(), Some(!-6i64));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Integer::new(-1).to_u64(), None);
        assert_eq!(Integer::from(u64::MAX).to_u64(), Some(u64::MAX));
        assert_eq!(Integer::two_pow(64).to_u64(), None);
        assert!((Integer::new(1_000_000).to_f64() - 1.0e6).abs() < f64::EPSILON);
    }
}
