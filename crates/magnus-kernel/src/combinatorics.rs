//! Factorials and their relatives.
//!
//! All products are built iteratively and every multiplication passes the
//! overflow guard. [`Combinatorics`] owns the optional factorial cache, so
//! independent contexts never share memoized state.

use magnus_integers::{normalize, normalize_non_negative, Integer, NumericInput, ValidationError};
use num_traits::{One, Zero};
use tracing::{debug, trace};

use crate::arithmetic::{checked_add, checked_mul, pow_mod};
use crate::config::Config;
use crate::error::{ComputeError, Result};
use crate::guard::OverflowGuard;

/// Default ceiling on factorial-style arguments.
pub const DEFAULT_MAX_VALUE: u64 = 100_000;

/// Largest bound sieved eagerly by [`Combinatorics::primorial`].
const SIEVE_LIMIT: u64 = 1 << 20;

/// Witnesses that make Miller-Rabin deterministic for every `u64`.
const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// A combinatorics context: configuration, argument ceiling, and an
/// optional factorial cache.
#[derive(Clone, Debug)]
pub struct Combinatorics {
    config: Config,
    max_value: u64,
    // cache[n] == n!
    cache: Option<Vec<Integer>>,
}

impl Default for Combinatorics {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Combinatorics {
    /// Creates an uncached context.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            max_value: DEFAULT_MAX_VALUE,
            cache: None,
        }
    }

    /// Enables the factorial cache.
    #[must_use]
    pub fn with_cache(mut self) -> Self {
        self.cache.get_or_insert_with(|| vec![Integer::one()]);
        self
    }

    /// Sets the largest accepted argument.
    #[must_use]
    pub fn with_max_value(mut self, max_value: u64) -> Self {
        self.max_value = max_value;
        self
    }

    /// The configuration this context computes under.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The largest accepted argument.
    #[must_use]
    pub fn max_value(&self) -> u64 {
        self.max_value
    }

    /// Number of memoized factorials, 0 when caching is off.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.as_ref().map_or(0, Vec::len)
    }

    /// Drops every memoized factorial except `0!`.
    pub fn clear_cache(&mut self) {
        if let Some(cache) = &mut self.cache {
            cache.truncate(1);
        }
    }

    fn guard(&self) -> OverflowGuard {
        OverflowGuard::new(&self.config)
    }

    /// Normalizes a non-negative argument and enforces `max_value`.
    fn argument(
        &self,
        operation: &'static str,
        input: impl Into<NumericInput>,
        name: &'static str,
    ) -> Result<u64> {
        self.config.validate()?;
        let value = normalize_non_negative(input, name)?;
        match value.to_u64() {
            Some(v) if v <= self.max_value => Ok(v),
            _ => {
                debug!(operation, %value, max_value = self.max_value, "argument above ceiling");
                Err(ComputeError::Overflow {
                    operation,
                    limit: self.config.max_bits,
                    detail: format!("{name} = {value} exceeds the ceiling of {}", self.max_value),
                })
            }
        }
    }

    /// Computes `n!`.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::NegativeArgument`] for negative `n`
    /// - [`ComputeError::Overflow`] when `n` exceeds `max_value`, before any
    ///   work is done, or when the product exceeds the bound
    pub fn factorial(&mut self, n: impl Into<NumericInput>) -> Result<Integer> {
        let n = self.argument("factorial", n, "n")?;
        let guard = self.guard();

        let Some(cache) = &mut self.cache else {
            return product_range(1, n, 1, &guard);
        };
        if let Some(hit) = usize::try_from(n).ok().and_then(|i| cache.get(i)) {
            debug!(n, "factorial cache hit");
            return Ok(hit.clone());
        }

        // Stage new entries and commit them only once the product is known
        // to fit.
        let mut staged = Vec::new();
        let mut acc = cache.last().cloned().unwrap_or_else(Integer::one);
        for k in cache.len() as u64..=n {
            acc = checked_mul(&acc, &Integer::from(k), &guard)?;
            staged.push(acc.clone());
        }
        debug!(n, added = staged.len(), "factorial cache extended");
        cache.extend(staged);
        Ok(acc)
    }

    /// Computes `C(n, k)`, 0 when `k > n`.
    ///
    /// # Errors
    ///
    /// Fails for negative arguments, when the loop would run more than
    /// `max_computation_steps` times, or on overflow.
    pub fn binomial(
        &self,
        n: impl Into<NumericInput>,
        k: impl Into<NumericInput>,
    ) -> Result<Integer> {
        self.config.validate()?;
        let n = normalize_non_negative(n, "n")?;
        let k = normalize_non_negative(k, "k")?;
        if k > n {
            return Ok(Integer::zero());
        }
        let complement = &n - &k;
        let k = if complement < k { complement } else { k };

        let steps = self.step_count("binomial", &k)?;
        let guard = self.guard();
        let mut result = Integer::one();
        for i in 1..=steps {
            let i = Integer::from(i);
            // Multiply first: result * (n - i + 1) is divisible by i.
            let factor = &n - &i + Integer::one();
            result = checked_mul(&result, &factor, &guard)? / &i;
        }
        Ok(result)
    }

    /// Counts derangements of `n` elements.
    ///
    /// Uses `!n = n * !(n - 1) + (-1)^n` with `!0 = 1`.
    ///
    /// # Errors
    ///
    /// Fails like [`Combinatorics::factorial`].
    pub fn subfactorial(&self, n: impl Into<NumericInput>) -> Result<Integer> {
        let n = self.argument("subfactorial", n, "n")?;
        let guard = self.guard();
        let mut result = Integer::one();
        for k in 1..=n {
            let sign = if k % 2 == 0 { Integer::one() } else { -Integer::one() };
            let scaled = checked_mul(&result, &Integer::from(k), &guard)?;
            result = checked_add(&scaled, &sign, &guard)?;
        }
        Ok(result)
    }

    /// Computes the rising factorial `x (x + 1) ... (x + n - 1)`.
    ///
    /// # Errors
    ///
    /// Fails for negative `n`, `n` above `max_value`, or on overflow.
    pub fn rising_factorial(
        &self,
        x: impl Into<NumericInput>,
        n: impl Into<NumericInput>,
    ) -> Result<Integer> {
        let n = self.argument("rising_factorial", n, "n")?;
        let x = normalize(x)?;
        self.shifted_product(&x, n, &Integer::one())
    }

    /// Computes the falling factorial `x (x - 1) ... (x - n + 1)`.
    ///
    /// # Errors
    ///
    /// Fails for negative `n`, `n` above `max_value`, or on overflow.
    pub fn falling_factorial(
        &self,
        x: impl Into<NumericInput>,
        n: impl Into<NumericInput>,
    ) -> Result<Integer> {
        let n = self.argument("falling_factorial", n, "n")?;
        let x = normalize(x)?;
        self.shifted_product(&x, n, &-Integer::one())
    }

    fn shifted_product(&self, x: &Integer, count: u64, step: &Integer) -> Result<Integer> {
        let guard = self.guard();
        let mut result = Integer::one();
        let mut factor = x.clone();
        for _ in 0..count {
            if factor.is_zero() {
                return Ok(Integer::zero());
            }
            result = checked_mul(&result, &factor, &guard)?;
            factor = &factor + step;
        }
        Ok(result)
    }

    /// Computes the step-`k` factorial `n (n - k) (n - 2k) ...` over
    /// positive factors.
    ///
    /// # Errors
    ///
    /// Fails for negative `n`, `k < 1`, `n` above `max_value`, or on
    /// overflow.
    pub fn multi_factorial(
        &self,
        n: impl Into<NumericInput>,
        k: impl Into<NumericInput>,
    ) -> Result<Integer> {
        let n = self.argument("multi_factorial", n, "n")?;
        let k = normalize(k)?;
        let step = k
            .to_u64()
            .filter(|&s| s >= 1)
            .ok_or_else(|| ValidationError::parameter("k", format!("step {k} must be at least 1")))?;
        if n == 0 {
            return Ok(Integer::one());
        }
        // Lowest positive factor congruent to n modulo the step.
        let lowest = match n % step {
            0 => step,
            r => r,
        };
        product_range(lowest, n, step, &self.guard())
    }

    /// Computes the product of all primes `<= n`.
    ///
    /// # Errors
    ///
    /// Fails for negative `n`, `n` above `max_value`, or on overflow.
    pub fn primorial(&self, n: impl Into<NumericInput>) -> Result<Integer> {
        let n = self.argument("primorial", n, "n")?;
        let guard = self.guard();
        primes_up_to(n).try_fold(Integer::one(), |acc, p| {
            checked_mul(&acc, &Integer::from(p), &guard)
        })
    }

    /// Tests primality.
    ///
    /// Deterministic for every value that fits a `u64`; larger values get a
    /// strong probable-prime test over the same witnesses.
    ///
    /// # Errors
    ///
    /// Fails only for malformed input.
    pub fn is_prime(&self, n: impl Into<NumericInput>) -> Result<bool> {
        let n = normalize(n)?;
        Ok(match n.to_u64() {
            Some(small) => is_prime_u64(small),
            None if n.is_negative() => false,
            None => is_probable_prime(&n),
        })
    }

    fn step_count(&self, operation: &'static str, count: &Integer) -> Result<u64> {
        let limit = self.config.max_computation_steps;
        match count.to_usize() {
            Some(c) if c <= limit => Ok(c as u64),
            _ => Err(ComputeError::ComputationLimit { operation, limit }),
        }
    }
}

/// Product of `lo, lo + step, ..., <= hi`; 1 for an empty range.
fn product_range(lo: u64, hi: u64, step: u64, guard: &OverflowGuard) -> Result<Integer> {
    let mut result = Integer::one();
    let mut k = lo;
    while k <= hi {
        result = checked_mul(&result, &Integer::from(k), guard)?;
        trace!(k, bits = result.bit_len(), "product step");
        match k.checked_add(step) {
            Some(next) => k = next,
            None => break,
        }
    }
    Ok(result)
}

/// Primes up to and including `n`, in increasing order.
///
/// Only the range below [`SIEVE_LIMIT`] is sieved up front. Larger
/// candidates are tested lazily, so a consumer that stops early never
/// pays for the rest of the range.
fn primes_up_to(n: u64) -> impl Iterator<Item = u64> {
    let sieved = n.min(SIEVE_LIMIT);
    let small = sieve(usize::try_from(sieved).unwrap_or(0)).into_iter().map(|p| p as u64);
    let large = (sieved + 1..=n).filter(|&k| is_prime_u64(k));
    small.chain(large)
}

/// Primes up to and including `limit`.
fn sieve(limit: usize) -> Vec<usize> {
    if limit < 2 {
        return Vec::new();
    }
    let mut composite = vec![false; limit + 1];
    let mut primes = Vec::new();
    for i in 2..=limit {
        if composite[i] {
            continue;
        }
        primes.push(i);
        let mut j = i.saturating_mul(i);
        while j <= limit {
            composite[j] = true;
            j += i;
        }
    }
    primes
}

fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((u128::from(a) * u128::from(b)) % u128::from(m)) as u64
}

fn pow_mod_u64(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut result = 1 % m;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    result
}

fn is_prime_u64(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for &p in &WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }
    let s = (n - 1).trailing_zeros();
    let d = (n - 1) >> s;
    'witness: for &a in &WITNESSES {
        let mut x = pow_mod_u64(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

fn is_probable_prime(n: &Integer) -> bool {
    for &p in &WITNESSES {
        if (n % &Integer::from(p)).is_zero() {
            return false;
        }
    }
    let one = Integer::one();
    let two = Integer::new(2);
    let n_minus_one = n - &one;
    let mut d = n_minus_one.clone();
    let mut s = 0u32;
    while d.is_even() {
        d = &d / &two;
        s += 1;
    }
    'witness: for &a in &WITNESSES {
        let mut x = pow_mod(&Integer::from(a), &d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = (&x * &x).div_rem_floor(n).1;
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}
