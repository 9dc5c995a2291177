//! # magnus-structures
//!
//! Data structures built on magnus numeric semantics.
//!
//! - [`BigArray`]: growable array with O(log n) range min/max queries
//! - [`NumberTree`] / [`AvlTree`]: ordered trees behind [`OrderedTree`]
//! - [`AckermannStructure`]: memoized Ackermann evaluation under a step
//!   budget
//! - [`Shared`]: single-writer handle for cross-thread use
//!
//! ## Failure model
//!
//! A mutator that returns an error leaves its structure exactly as it was.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod ackermann;
pub mod big_array;
pub mod number_tree;
pub mod shared;

#[cfg(test)]
mod proptests;

pub use ackermann::{AckermannNode, AckermannStructure, Direction, GrowthSample, Key};
pub use big_array::{Aggregate, BigArray, BigArrayConfig, NumberHeap};
pub use number_tree::{
    AvlNode, AvlTree, BstNode, InOrder, NumberTree, OrderedTree, PostOrder, PreOrder, TreeNode,
};
pub use shared::Shared;
