//! # Magnus
//!
//! Exact and controllably-approximate computation over integers of
//! unbounded magnitude.
//!
//! Magnus computes exactly by default and refuses, with a typed error, any
//! operation whose result would exceed the configured size or step budget.
//!
//! ## Features
//!
//! - **Normalization**: text, machine numbers, and big integers in one type
//! - **Overflow Guard**: size checks before and after every operation
//! - **Fixed-Point Decimals**: seven rounding modes, exact tie detection
//! - **Powers and Roots**: square-and-multiply, Newton roots, tetration
//! - **Combinatorics**: factorials with context-scoped caching, primes
//! - **Data Structures**: segment-tree arrays, ordered trees, Ackermann memo
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use magnus::prelude::*;
//!
//! let config = Config::default().with_max_bits(64);
//! assert!(power(2, 1000, &config).unwrap_err().is_overflow());
//!
//! let exact = power(2, 1000, &config.with_overflow_checking(false))?;
//! assert_eq!(exact.decimal_digits(), 302);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use magnus_integers as integers;
pub use magnus_kernel as kernel;
pub use magnus_structures as structures;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use magnus_integers::{normalize, Integer, NumericInput, RoundingMode, ScaledDecimal, ValidationError};
    pub use magnus_kernel::arithmetic::{add, divide, modulo, multiply, subtract, BitPolicy};
    pub use magnus_kernel::power::{nth_root, power, super_root, tetration};
    pub use magnus_kernel::{Combinatorics, ComputeError, Config, ConfigOverrides};
    pub use magnus_structures::{
        AckermannStructure, AvlTree, BigArray, BigArrayConfig, NumberTree, OrderedTree, Shared,
    };
}
