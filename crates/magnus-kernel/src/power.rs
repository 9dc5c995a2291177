//! Powers, roots, and tetration.
//!
//! - [`power`]: square-and-multiply, guarded at every multiplication
//! - [`nth_root`] / [`nth_root_decimal`]: Newton iteration under the step budget
//! - [`tetration`] / [`power_tower`]: right-to-left iterated exponentiation
//! - [`super_root`]: inverse tetration by bisection over candidate bases

use magnus_integers::{
    normalize, normalize_u64, round_quotient, Integer, NumericInput, ScaledDecimal,
    ValidationError,
};
use num_traits::{One, Zero};
use std::cmp::Ordering;
use tracing::{debug, trace};

use crate::arithmetic::checked_mul;
use crate::config::Config;
use crate::error::{ComputeError, Result};
use crate::guard::OverflowGuard;

/// Raises `base` to a non-negative integer `exponent`.
///
/// `0^0` is 1.
///
/// # Errors
///
/// - [`ValidationError::NegativeArgument`] for a negative exponent
/// - [`ComputeError::Overflow`] as soon as a multiplication step would
///   exceed the bound, or when the exponent is too large to materialize
pub fn power(
    base: impl Into<NumericInput>,
    exponent: impl Into<NumericInput>,
    config: &Config,
) -> Result<Integer> {
    config.validate()?;
    let base = normalize(base)?;
    let exponent = normalize(exponent)?;
    power_integer(&base, &exponent, &OverflowGuard::new(config))
}

/// Guarded exponentiation on normalized operands.
///
/// # Errors
///
/// Fails like [`power`].
pub fn power_integer(base: &Integer, exponent: &Integer, guard: &OverflowGuard) -> Result<Integer> {
    if exponent.is_negative() {
        return Err(ValidationError::negative("exponent", exponent).into());
    }
    if exponent.is_zero() {
        return Ok(Integer::one());
    }
    if base.bit_len() <= 1 {
        // 0, 1, and -1 never grow.
        return Ok(if base.is_negative() && !exponent.is_even() {
            -Integer::one()
        } else {
            base.abs()
        });
    }

    guard.check_power(base, exponent)?;
    let Some(mut remaining) = exponent.to_usize() else {
        return Err(ComputeError::Overflow {
            operation: "power",
            limit: guard.max_bits(),
            detail: format!("exponent {exponent} is too large to materialize"),
        });
    };

    let mut result = Integer::one();
    let mut square = base.clone();
    let mut step = 0usize;
    loop {
        if remaining & 1 == 1 {
            result = checked_mul(&result, &square, guard)?;
        }
        remaining >>= 1;
        if remaining == 0 {
            break;
        }
        step += 1;
        trace!(step, bits = square.bit_len(), "squaring");
        square = checked_mul(&square, &square, guard)?;
    }
    Ok(result)
}

/// Floor of the square root.
///
/// # Errors
///
/// Fails like [`nth_root`].
pub fn isqrt(value: impl Into<NumericInput>, config: &Config) -> Result<Integer> {
    nth_root(value, 2, config)
}

/// Integer `n`-th root, truncated toward zero.
///
/// Negative values have real roots only for odd `n`.
///
/// # Errors
///
/// - [`ValidationError::InvalidParameter`] for `n == 0`
/// - [`ValidationError::NegativeArgument`] for an even root of a negative
///   value
/// - [`ComputeError::ComputationLimit`] if Newton iteration does not
///   converge within `max_computation_steps`
pub fn nth_root(
    value: impl Into<NumericInput>,
    n: impl Into<NumericInput>,
    config: &Config,
) -> Result<Integer> {
    config.validate()?;
    let value = normalize(value)?;
    let n = root_degree(n, &value)?;
    let root = floor_root(&value.abs(), n, config.max_computation_steps)?;
    Ok(if value.is_negative() { -root } else { root })
}

/// Square root to `decimal_precision` fractional digits.
///
/// # Errors
///
/// Fails like [`nth_root_decimal`].
pub fn sqrt_decimal(value: impl Into<NumericInput>, config: &Config) -> Result<ScaledDecimal> {
    nth_root_decimal(value, 2, config)
}

/// `n`-th root to `decimal_precision` fractional digits, rounded per the
/// configured rounding mode.
///
/// Ties are detected exactly: a root is only treated as a midpoint when the
/// digit after the last kept one is 5 and the extended root is exact.
///
/// # Errors
///
/// Fails like [`nth_root`], or with [`ComputeError::Overflow`] if the
/// rounded result exceeds the bound.
pub fn nth_root_decimal(
    value: impl Into<NumericInput>,
    n: impl Into<NumericInput>,
    config: &Config,
) -> Result<ScaledDecimal> {
    config.validate()?;
    let value = normalize(value)?;
    let n = root_degree(n, &value)?;
    let precision = config.decimal_precision;

    // One guard digit past the requested precision. 10^d needs more than
    // 3d bits.
    let digits = n.saturating_mul(precision as usize + 1);
    let guard = OverflowGuard::new(config);
    guard.check_bits("nth_root_decimal", digits.saturating_mul(3))?;
    let extra = Integer::ten_pow(digits);
    let scaled = value.abs() * &extra;
    let root = floor_root(&scaled, n, config.max_computation_steps)?;
    let sticky = if root.pow(n) == scaled { 0 } else { 1 };

    let mut numerator = root * Integer::new(10) + Integer::new(sticky);
    if value.is_negative() {
        numerator = -numerator;
    }
    let unscaled = round_quotient(&numerator, &Integer::new(100), config.rounding_mode)?;
    guard.check_result("nth_root_decimal", &unscaled)?;
    Ok(ScaledDecimal::new(unscaled, precision))
}

fn root_degree(n: impl Into<NumericInput>, value: &Integer) -> Result<usize> {
    let n = normalize(n)?;
    let degree = n
        .to_usize()
        .filter(|&d| d > 0)
        .ok_or_else(|| ValidationError::parameter("n", format!("root degree {n} must be a positive machine integer")))?;
    if value.is_negative() && degree % 2 == 0 {
        return Err(ValidationError::negative("value", value).into());
    }
    Ok(degree)
}

/// Floor of the `n`-th root of a non-negative integer by Newton iteration.
///
/// Starts above the root, so the iterates decrease monotonically until
/// they stop moving.
fn floor_root(value: &Integer, n: usize, max_steps: usize) -> Result<Integer> {
    if n == 1 || value.bit_len() <= 1 {
        return Ok(value.clone());
    }
    if value.bit_len() <= n {
        // 2 <= value < 2^n
        return Ok(Integer::one());
    }

    let degree = Integer::from(n);
    let lower = Integer::from(n - 1);
    let mut x = Integer::two_pow(value.bit_len().div_ceil(n));
    let mut steps = 0usize;
    loop {
        steps += 1;
        if steps > max_steps {
            debug!(steps, n, "root iteration did not converge");
            return Err(ComputeError::ComputationLimit {
                operation: "nth_root",
                limit: max_steps,
            });
        }
        let y = (&lower * &x + value / &x.pow(n - 1)) / &degree;
        trace!(steps, bits = y.bit_len(), "newton step");
        if y >= x {
            return Ok(x);
        }
        x = y;
    }
}

/// Computes the power tower `base↑↑height`.
///
/// Height 0 yields 1 and height 1 yields `base`.
///
/// # Errors
///
/// - [`ValidationError::NegativeArgument`] for a negative height
/// - [`ComputeError::ComputationLimit`] when more than
///   `max_computation_steps` exponentiations are needed
/// - [`ComputeError::Overflow`] when a level exceeds the bound
pub fn tetration(
    base: impl Into<NumericInput>,
    height: impl Into<NumericInput>,
    config: &Config,
) -> Result<Integer> {
    config.validate()?;
    let base = normalize(base)?;
    let height = normalize_u64(height, "height")?;
    tetrate(&base, height, &OverflowGuard::new(config), config.max_computation_steps)
}

fn tetrate(base: &Integer, height: u64, guard: &OverflowGuard, max_steps: usize) -> Result<Integer> {
    if height == 0 {
        return Ok(Integer::one());
    }
    guard.check_result("tetration", base)?;

    let mut result = base.clone();
    for level in 1..height {
        if usize::try_from(level).map_or(true, |l| l > max_steps) {
            return Err(ComputeError::ComputationLimit {
                operation: "tetration",
                limit: max_steps,
            });
        }
        trace!(level, bits = result.bit_len(), "tetration level");
        result = power_integer(base, &result, guard)?;
    }
    Ok(result)
}

/// Evaluates `values[0]^(values[1]^(...))`, right to left.
///
/// An empty tower is 1.
///
/// # Errors
///
/// Fails like [`power`], or with [`ComputeError::ComputationLimit`] for a
/// tower taller than the step budget.
pub fn power_tower(values: &[Integer], config: &Config) -> Result<Integer> {
    config.validate()?;
    if values.len() > config.max_computation_steps {
        return Err(ComputeError::ComputationLimit {
            operation: "power_tower",
            limit: config.max_computation_steps,
        });
    }
    let guard = OverflowGuard::new(config);
    let Some((top, rest)) = values.split_last() else {
        return Ok(Integer::one());
    };
    rest.iter()
        .rev()
        .try_fold(top.clone(), |exponent, base| power_integer(base, &exponent, &guard))
}

/// Finds the integer base `b` with `b↑↑height == value`.
///
/// Candidates are probed with a guard bounded just above the target's bit
/// length, so candidates that overshoot are rejected without being
/// materialized.
///
/// # Errors
///
/// - [`ValidationError::InvalidParameter`] for height 0
/// - [`ValidationError::NoIntegerRoot`] when no positive integer base works
/// - [`ComputeError::ComputationLimit`] when the search exceeds the budget
pub fn super_root(
    value: impl Into<NumericInput>,
    height: impl Into<NumericInput>,
    config: &Config,
) -> Result<Integer> {
    config.validate()?;
    let value = normalize(value)?;
    let height = normalize_u64(height, "height")?;

    if height == 0 {
        return Err(ValidationError::parameter("height", "every base has a height-0 tower of 1").into());
    }
    if height == 1 {
        return Ok(value);
    }
    let no_root = || ValidationError::NoIntegerRoot {
        operation: "super",
        value: value.to_string(),
    };
    if value < Integer::one() {
        return Err(no_root().into());
    }
    if value.is_one() {
        return Ok(value);
    }

    let probe = OverflowGuard::with_max_bits(value.bit_len() + 1);
    let max_steps = config.max_computation_steps;
    let mut lo = Integer::one();
    let mut hi = value.clone();
    let two = Integer::new(2);
    let mut steps = 0usize;

    // Invariant: lo↑↑h < value <= hi↑↑h
    while &hi - &lo > Integer::one() {
        steps += 1;
        if steps > max_steps {
            return Err(ComputeError::ComputationLimit {
                operation: "super_root",
                limit: max_steps,
            });
        }
        let mid = (&lo + &hi) / &two;
        let ordering = match tetrate(&mid, height, &probe, max_steps) {
            Ok(tower) => tower.cmp(&value),
            Err(ComputeError::Overflow { .. }) => Ordering::Greater,
            Err(other) => return Err(other),
        };
        trace!(steps, candidate = %mid, ?ordering, "super-root probe");
        match ordering {
            Ordering::Equal => return Ok(mid),
            Ordering::Less => lo = mid,
            Ordering::Greater => hi = mid,
        }
    }

    match tetrate(&hi, height, &probe, max_steps) {
        Ok(tower) if tower == value => Ok(hi),
        Ok(_) | Err(ComputeError::Overflow { .. }) => Err(no_root().into()),
        Err(other) => Err(other),
    }
}
