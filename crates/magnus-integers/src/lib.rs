//! # magnus-integers
//!
//! The numeric substrate for magnus.
//!
//! This crate wraps `dashu` to provide:
//! - Arbitrary precision integers (`Integer`)
//! - Normalization of text, machine numbers, and integers (`normalize`)
//! - Exact fixed-point decimals (`ScaledDecimal`)
//! - Seven rounding disciplines (`RoundingMode`)
//!
//! ## Invariants
//!
//! - Inputs are never silently truncated: conversion is exact or fails
//! - Decimal operands are brought to a common scale before combining

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod decimal;
pub mod error;
pub mod input;
pub mod integer;
pub mod rounding;

#[cfg(test)]
mod proptests;

pub use decimal::{normalize_precision, round, scaled_division, ScaledDecimal, MAX_DECIMAL_PRECISION};
pub use error::ValidationError;
pub use input::{normalize, normalize_non_negative, normalize_radix, normalize_u64, NumericInput};
pub use integer::Integer;
pub use rounding::{round_quotient, RoundingMode};
