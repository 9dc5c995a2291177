//! # magnus-kernel
//!
//! Overflow-aware arithmetic over unbounded integers.
//!
//! This crate provides:
//! - Per-call numeric policy (`Config`, `ConfigOverrides`)
//! - The overflow guard (`OverflowGuard`)
//! - Arithmetic and two's-complement bitwise operations (`arithmetic`)
//! - Powers, roots, tetration, and super-roots (`power`)
//! - Factorials, binomials, and primes (`Combinatorics`)
//!
//! ## Failure model
//!
//! Every operation returns [`ComputeError`]: `Validation` for bad input,
//! `Overflow` when the guard refuses a result, and `ComputationLimit` when
//! an iterative algorithm exhausts `max_computation_steps`. The last two are
//! recoverable by relaxing the configuration.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod arithmetic;
pub mod combinatorics;
pub mod config;
pub mod error;
pub mod guard;
pub mod power;

#[cfg(test)]
mod proptests;

pub use arithmetic::{
    abs, add, bit_and, bit_not, bit_or, bit_xor, checked_add, checked_mul, compare, divide,
    divide_decimal, gcd, lcm, mod_floor, mod_pow, modulo, multiply, negate, shift_left,
    shift_right, subtract, BitPolicy,
};
pub use combinatorics::{Combinatorics, DEFAULT_MAX_VALUE};
pub use config::{Config, ConfigOverrides};
pub use error::{ComputeError, Result};
pub use guard::OverflowGuard;
pub use power::{
    isqrt, nth_root, nth_root_decimal, power, power_integer, power_tower, sqrt_decimal,
    super_root, tetration,
};
