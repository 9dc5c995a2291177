//! The arithmetic kernel.
//!
//! Every binary operation normalizes its operands, consults the overflow
//! guard, and only then computes. Operands may be anything that converts
//! into a [`NumericInput`]: text, machine numbers, or [`Integer`]s.

use magnus_integers::{
    normalize, normalize_non_negative, scaled_division, Integer, NumericInput, ScaledDecimal,
    ValidationError,
};
use num_traits::{One, Zero};
use std::cmp::Ordering;

use crate::config::Config;
use crate::error::{ComputeError, Result};
use crate::guard::OverflowGuard;

/// Adds two numbers.
///
/// # Errors
///
/// Fails with a validation error for malformed operands and with
/// [`ComputeError::Overflow`] when the sum exceeds the bound.
pub fn add(
    a: impl Into<NumericInput>,
    b: impl Into<NumericInput>,
    config: &Config,
) -> Result<Integer> {
    config.validate()?;
    let (a, b) = (normalize(a)?, normalize(b)?);
    checked_add(&a, &b, &OverflowGuard::new(config))
}

/// Subtracts `b` from `a`.
///
/// # Errors
///
/// Fails like [`add`].
pub fn subtract(
    a: impl Into<NumericInput>,
    b: impl Into<NumericInput>,
    config: &Config,
) -> Result<Integer> {
    config.validate()?;
    let (a, b) = (normalize(a)?, normalize(b)?);
    checked_add(&a, &-b, &OverflowGuard::new(config))
}

/// Multiplies two numbers.
///
/// # Errors
///
/// Fails with a validation error for malformed operands and with
/// [`ComputeError::Overflow`] when the product exceeds the bound.
pub fn multiply(
    a: impl Into<NumericInput>,
    b: impl Into<NumericInput>,
    config: &Config,
) -> Result<Integer> {
    config.validate()?;
    let (a, b) = (normalize(a)?, normalize(b)?);
    checked_mul(&a, &b, &OverflowGuard::new(config))
}

/// Divides `a` by `b`, truncating toward zero.
///
/// # Errors
///
/// Returns [`ValidationError::DivisionByZero`] when `b` normalizes to zero.
pub fn divide(
    a: impl Into<NumericInput>,
    b: impl Into<NumericInput>,
    config: &Config,
) -> Result<Integer> {
    config.validate()?;
    let (a, b) = nonzero_divisor(a, b)?;
    let quotient = &a / &b;
    OverflowGuard::new(config).check_result("divide", &quotient)?;
    Ok(quotient)
}

/// Divides `a` by `b` to `decimal_precision` fractional digits, rounded per
/// the configured rounding mode.
///
/// # Errors
///
/// Returns [`ValidationError::DivisionByZero`] when `b` normalizes to zero.
pub fn divide_decimal(
    a: impl Into<NumericInput>,
    b: impl Into<NumericInput>,
    config: &Config,
) -> Result<ScaledDecimal> {
    config.validate()?;
    let (a, b) = nonzero_divisor(a, b)?;
    let quotient = scaled_division(&a, &b, config.decimal_precision, config.rounding_mode)?;
    OverflowGuard::new(config).check_result("divide_decimal", quotient.unscaled())?;
    Ok(quotient)
}

/// Remainder of truncating division; takes the sign of `a`.
///
/// # Errors
///
/// Returns [`ValidationError::DivisionByZero`] when `b` normalizes to zero.
pub fn modulo(
    a: impl Into<NumericInput>,
    b: impl Into<NumericInput>,
    config: &Config,
) -> Result<Integer> {
    config.validate()?;
    let (a, b) = nonzero_divisor(a, b)?;
    Ok(&a % &b)
}

/// Remainder of floor division; takes the sign of `b`.
///
/// # Errors
///
/// Returns [`ValidationError::DivisionByZero`] when `b` normalizes to zero.
pub fn mod_floor(
    a: impl Into<NumericInput>,
    b: impl Into<NumericInput>,
    config: &Config,
) -> Result<Integer> {
    config.validate()?;
    let (a, b) = nonzero_divisor(a, b)?;
    Ok(a.div_rem_floor(&b).1)
}

/// Computes `base^exponent mod modulus`, in `[0, |modulus|)`.
///
/// # Errors
///
/// Fails for a negative exponent or a zero modulus.
pub fn mod_pow(
    base: impl Into<NumericInput>,
    exponent: impl Into<NumericInput>,
    modulus: impl Into<NumericInput>,
    config: &Config,
) -> Result<Integer> {
    config.validate()?;
    let base = normalize(base)?;
    let exponent = normalize_non_negative(exponent, "exponent")?;
    let modulus = normalize(modulus)?.abs();
    if modulus.is_zero() {
        return Err(ValidationError::DivisionByZero.into());
    }
    Ok(pow_mod(&base, &exponent, &modulus))
}

/// Modular exponentiation for a non-negative exponent and positive modulus.
pub(crate) fn pow_mod(base: &Integer, exponent: &Integer, modulus: &Integer) -> Integer {
    let two = Integer::new(2);
    let mut exponent = exponent.clone();
    let mut result = Integer::one().div_rem_floor(modulus).1;
    let mut square = base.div_rem_floor(modulus).1;
    while !exponent.is_zero() {
        if !exponent.is_even() {
            result = (&result * &square).div_rem_floor(modulus).1;
        }
        exponent = &exponent / &two;
        square = (&square * &square).div_rem_floor(modulus).1;
    }
    result
}

/// Compares two numbers.
///
/// # Errors
///
/// Fails only for malformed operands.
pub fn compare(a: impl Into<NumericInput>, b: impl Into<NumericInput>) -> Result<Ordering> {
    Ok(normalize(a)?.cmp(&normalize(b)?))
}

/// Negates a number.
///
/// # Errors
///
/// Fails only for malformed operands.
pub fn negate(a: impl Into<NumericInput>) -> Result<Integer> {
    Ok(-normalize(a)?)
}

/// Returns the absolute value of a number.
///
/// # Errors
///
/// Fails only for malformed operands.
pub fn abs(a: impl Into<NumericInput>) -> Result<Integer> {
    Ok(normalize(a)?.abs())
}

/// Greatest common divisor, always non-negative.
///
/// # Errors
///
/// Fails only for malformed operands.
pub fn gcd(a: impl Into<NumericInput>, b: impl Into<NumericInput>) -> Result<Integer> {
    Ok(normalize(a)?.gcd(&normalize(b)?))
}

/// Least common multiple, always non-negative.
///
/// # Errors
///
/// Fails for malformed operands or when the result exceeds the bound.
pub fn lcm(
    a: impl Into<NumericInput>,
    b: impl Into<NumericInput>,
    config: &Config,
) -> Result<Integer> {
    config.validate()?;
    let result = normalize(a)?.lcm(&normalize(b)?);
    OverflowGuard::new(config).check_result("lcm", &result)?;
    Ok(result)
}

/// Guarded addition on already-normalized operands.
///
/// # Errors
///
/// Returns [`ComputeError::Overflow`] when the sum exceeds the bound.
pub fn checked_add(a: &Integer, b: &Integer, guard: &OverflowGuard) -> Result<Integer> {
    guard.check_add(a, b)?;
    let sum = a + b;
    guard.check_result("add", &sum)?;
    Ok(sum)
}

/// Guarded multiplication on already-normalized operands.
///
/// # Errors
///
/// Returns [`ComputeError::Overflow`] when the product exceeds the bound.
pub fn checked_mul(a: &Integer, b: &Integer, guard: &OverflowGuard) -> Result<Integer> {
    guard.check_multiply(a, b)?;
    let product = a * b;
    guard.check_result("multiply", &product)?;
    Ok(product)
}

fn nonzero_divisor(
    a: impl Into<NumericInput>,
    b: impl Into<NumericInput>,
) -> Result<(Integer, Integer)> {
    let a = normalize(a)?;
    let b = normalize(b)?;
    if b.is_zero() {
        return Err(ComputeError::Validation(ValidationError::DivisionByZero));
    }
    Ok((a, b))
}

/// What bitwise operations do with values wider than the configured word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BitPolicy {
    /// Fail with [`ComputeError::Overflow`].
    #[default]
    Strict,
    /// Wrap into a signed two's-complement word of `max_bits` bits.
    Truncate,
}

/// The signed two's-complement word that bitwise operations are capped at.
#[derive(Clone, Copy, Debug)]
struct Word {
    guard: OverflowGuard,
    policy: BitPolicy,
}

impl Word {
    fn new(config: &Config, policy: BitPolicy) -> Self {
        Self {
            guard: OverflowGuard::new(config),
            policy,
        }
    }

    fn bits(&self) -> usize {
        self.guard.max_bits()
    }

    /// True if `value` lies in `[-2^(w-1), 2^(w-1))`.
    fn fits(&self, value: &Integer) -> bool {
        let w = self.bits();
        if value.bit_len() < w {
            return true;
        }
        value.is_negative() && value.bit_len() == w && value.abs() == Integer::two_pow(w - 1)
    }

    /// Reduces `value` modulo `2^w` into the signed range.
    fn wrap(&self, value: &Integer) -> Integer {
        let w = self.bits();
        let modulus = Integer::two_pow(w);
        let low = value.div_rem_floor(&modulus).1;
        if low >= Integer::two_pow(w - 1) {
            low - modulus
        } else {
            low
        }
    }

    /// Applies the policy to an operand or result.
    fn admit(&self, operation: &'static str, value: Integer) -> Result<Integer> {
        if !self.guard.is_enabled() || self.fits(&value) {
            return Ok(value);
        }
        match self.policy {
            BitPolicy::Strict => Err(ComputeError::Overflow {
                operation,
                limit: self.bits(),
                detail: format!("{}-bit value does not fit a signed {}-bit word", value.bit_len(), self.bits()),
            }),
            BitPolicy::Truncate => Ok(self.wrap(&value)),
        }
    }
}

fn bitwise(
    operation: &'static str,
    a: impl Into<NumericInput>,
    b: impl Into<NumericInput>,
    policy: BitPolicy,
    config: &Config,
    op: impl Fn(&Integer, &Integer) -> Integer,
) -> Result<Integer> {
    config.validate()?;
    let word = Word::new(config, policy);
    let a = word.admit(operation, normalize(a)?)?;
    let b = word.admit(operation, normalize(b)?)?;
    word.admit(operation, op(&a, &b))
}

/// Bitwise AND with two's-complement semantics.
///
/// # Errors
///
/// Fails for malformed operands, or under [`BitPolicy::Strict`] when an
/// operand does not fit the configured word.
pub fn bit_and(
    a: impl Into<NumericInput>,
    b: impl Into<NumericInput>,
    policy: BitPolicy,
    config: &Config,
) -> Result<Integer> {
    bitwise("bit_and", a, b, policy, config, |x, y| x & y)
}

/// Bitwise OR with two's-complement semantics.
///
/// # Errors
///
/// Fails like [`bit_and`].
pub fn bit_or(
    a: impl Into<NumericInput>,
    b: impl Into<NumericInput>,
    policy: BitPolicy,
    config: &Config,
) -> Result<Integer> {
    bitwise("bit_or", a, b, policy, config, |x, y| x | y)
}

/// Bitwise XOR with two's-complement semantics.
///
/// # Errors
///
/// Fails like [`bit_and`].
pub fn bit_xor(
    a: impl Into<NumericInput>,
    b: impl Into<NumericInput>,
    policy: BitPolicy,
    config: &Config,
) -> Result<Integer> {
    bitwise("bit_xor", a, b, policy, config, |x, y| x ^ y)
}

/// Bitwise NOT, i.e. `-a - 1`.
///
/// # Errors
///
/// Fails like [`bit_and`].
pub fn bit_not(a: impl Into<NumericInput>, policy: BitPolicy, config: &Config) -> Result<Integer> {
    config.validate()?;
    let word = Word::new(config, policy);
    let a = word.admit("bit_not", normalize(a)?)?;
    word.admit("bit_not", !&a)
}

/// Shifts left by `shift` bits (multiplies by `2^shift`).
///
/// # Errors
///
/// Fails for malformed operands or a negative shift. Under
/// [`BitPolicy::Strict`] a result wider than the word fails before it is
/// computed.
pub fn shift_left(
    a: impl Into<NumericInput>,
    shift: impl Into<NumericInput>,
    policy: BitPolicy,
    config: &Config,
) -> Result<Integer> {
    config.validate()?;
    let word = Word::new(config, policy);
    let a = word.admit("shift_left", normalize(a)?)?;
    let shift = shift_amount(shift)?;

    if !word.guard.is_enabled() {
        return Ok(&a * &Integer::two_pow(shift));
    }
    if a.is_zero() {
        return Ok(a);
    }
    match policy {
        BitPolicy::Strict => {
            word.guard.check_shift(&a, shift)?;
            word.admit("shift_left", &a * &Integer::two_pow(shift))
        }
        // Every bit of the word is shifted out.
        BitPolicy::Truncate if shift >= word.bits() => Ok(Integer::zero()),
        BitPolicy::Truncate => Ok(word.wrap(&(&a * &Integer::two_pow(shift)))),
    }
}

/// Arithmetic right shift (floor division by `2^shift`).
///
/// # Errors
///
/// Fails for malformed operands or a negative shift, or under
/// [`BitPolicy::Strict`] when the operand does not fit the word.
pub fn shift_right(
    a: impl Into<NumericInput>,
    shift: impl Into<NumericInput>,
    policy: BitPolicy,
    config: &Config,
) -> Result<Integer> {
    config.validate()?;
    let word = Word::new(config, policy);
    let a = word.admit("shift_right", normalize(a)?)?;
    let shift = shift_amount(shift)?;

    if shift >= a.bit_len() {
        return Ok(if a.is_negative() { -Integer::one() } else { Integer::zero() });
    }
    Ok(a.div_rem_floor(&Integer::two_pow(shift)).0)
}

fn shift_amount(shift: impl Into<NumericInput>) -> Result<usize> {
    let shift = normalize_non_negative(shift, "shift")?;
    shift.to_usize().ok_or_else(|| {
        ValidationError::NotRepresentable {
            name: "shift",
            value: shift.to_string(),
        }
        .into()
    })
}
