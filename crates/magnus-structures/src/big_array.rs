//! A growable array of unbounded integers with range min/max queries.
//!
//! The array keeps an iterative segment tree over its capacity. Leaves live
//! at `tree[capacity + i]` and hold the index of element `i` (or `None` past
//! the end); every internal node holds the index of the winning element of
//! its two children. Point updates repair one leaf-to-root path.

use std::cmp::Ordering;

use magnus_integers::{normalize, Integer, NumericInput, ValidationError};
use tracing::debug;

/// Which extreme a [`BigArray`] aggregates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Aggregate {
    /// Smallest value wins.
    #[default]
    Min,
    /// Largest value wins.
    Max,
}

impl Aggregate {
    /// Returns true when `candidate` at `ci` beats `incumbent` at `ii`.
    /// Ties go to the lower index.
    fn prefers(self, candidate: &Integer, ci: usize, incumbent: &Integer, ii: usize) -> bool {
        let ordering = match self {
            Self::Min => incumbent.cmp(candidate),
            Self::Max => candidate.cmp(incumbent),
        };
        match ordering {
            Ordering::Greater => true,
            Ordering::Equal => ci < ii,
            Ordering::Less => false,
        }
    }
}

/// Construction parameters for a [`BigArray`].
#[derive(Clone, Debug, PartialEq)]
pub struct BigArrayConfig {
    /// Slots allocated up front. Must be at least 1.
    pub initial_capacity: usize,
    /// Multiplier applied to the capacity when it is exceeded. Must be
    /// greater than 1.
    pub growth_factor: f64,
    /// The comparator used by range queries.
    pub aggregate: Aggregate,
}

impl Default for BigArrayConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 16,
            growth_factor: 2.0,
            aggregate: Aggregate::Min,
        }
    }
}

impl BigArrayConfig {
    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidParameter`] for a zero initial
    /// capacity or a growth factor that is not a finite number above 1.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.initial_capacity == 0 {
            return Err(ValidationError::parameter("initial_capacity", "must be at least 1"));
        }
        if !self.growth_factor.is_finite() || self.growth_factor <= 1.0 {
            return Err(ValidationError::parameter(
                "growth_factor",
                format!("{} must be a finite number above 1", self.growth_factor),
            ));
        }
        Ok(())
    }

    fn grown(&self, capacity: usize) -> usize {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let scaled = (capacity as f64 * self.growth_factor).ceil() as usize;
        scaled.max(capacity + 1)
    }
}

/// A resizable sequence of integers with an embedded segment tree.
#[derive(Clone, Debug)]
pub struct BigArray {
    values: Vec<Integer>,
    capacity: usize,
    tree: Vec<Option<usize>>,
    config: BigArrayConfig,
}

impl Default for BigArray {
    fn default() -> Self {
        let config = BigArrayConfig::default();
        Self::with_valid_config(config)
    }
}

impl BigArray {
    /// Creates an empty array.
    ///
    /// # Errors
    ///
    /// Fails when `config` does not validate.
    pub fn new(config: BigArrayConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: BigArrayConfig) -> Self {
        let capacity = config.initial_capacity;
        Self {
            values: Vec::with_capacity(capacity),
            capacity,
            tree: vec![None; 2 * capacity],
            config,
        }
    }

    /// Creates an array holding `values`, in order.
    ///
    /// # Errors
    ///
    /// Fails when `config` does not validate or a value does not normalize.
    pub fn from_values<I, T>(values: I, config: BigArrayConfig) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = T>,
        T: Into<NumericInput>,
    {
        let mut array = Self::new(config)?;
        let values = values.into_iter().map(normalize).collect::<Result<Vec<_>, _>>()?;
        while array.capacity < values.len() {
            array.capacity = array.config.grown(array.capacity);
        }
        array.values = values;
        array.rebuild();
        Ok(array)
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of slots before the next growth.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the value at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Integer> {
        self.values.get(index)
    }

    /// Iterates over the values in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Integer> {
        self.values.iter()
    }

    /// Appends a value, growing the capacity when it is full.
    ///
    /// # Errors
    ///
    /// Fails when `value` does not normalize; the array is unchanged.
    pub fn push(&mut self, value: impl Into<NumericInput>) -> Result<(), ValidationError> {
        let value = normalize(value)?;
        if self.values.len() == self.capacity {
            let from = self.capacity;
            self.capacity = self.config.grown(from);
            debug!(from, to = self.capacity, "big array grew");
            self.values.push(value);
            self.rebuild();
        } else {
            self.values.push(value);
            self.update(self.values.len() - 1);
        }
        Ok(())
    }

    /// Removes and returns the last value.
    pub fn pop(&mut self) -> Option<Integer> {
        let last = self.values.len().checked_sub(1)?;
        self.tree[self.capacity + last] = None;
        self.repair(self.capacity + last);
        self.values.pop()
    }

    /// Replaces the value at `index`, returning the old one.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IndexOutOfRange`] for an index past the
    /// end, or a normalization error; the array is unchanged either way.
    pub fn set(
        &mut self,
        index: usize,
        value: impl Into<NumericInput>,
    ) -> Result<Integer, ValidationError> {
        let len = self.values.len();
        if index >= len {
            return Err(ValidationError::IndexOutOfRange { index, len });
        }
        let value = normalize(value)?;
        let old = std::mem::replace(&mut self.values[index], value);
        self.update(index);
        Ok(old)
    }

    /// Aggregate of the whole array.
    #[must_use]
    pub fn aggregate(&self) -> Option<&Integer> {
        self.tree
            .get(1)
            .copied()
            .flatten()
            .map(|i| &self.values[i])
    }

    /// Aggregate of the inclusive range `[lo, hi]`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRange`] when `lo > hi` or `hi` is
    /// not a valid index.
    pub fn query_range(&self, lo: usize, hi: usize) -> Result<&Integer, ValidationError> {
        self.query_index(lo, hi).map(|i| &self.values[i])
    }

    /// Index of the aggregate of `[lo, hi]`, ties resolved to the lowest
    /// index.
    ///
    /// # Errors
    ///
    /// Fails like [`BigArray::query_range`].
    pub fn query_index(&self, lo: usize, hi: usize) -> Result<usize, ValidationError> {
        let len = self.values.len();
        let invalid = || ValidationError::InvalidRange { lo, hi, len };
        if lo > hi || hi >= len {
            return Err(invalid());
        }

        let mut best = None;
        let mut l = lo + self.capacity;
        let mut r = hi + self.capacity + 1;
        while l < r {
            if l & 1 == 1 {
                best = self.pick(best, self.tree[l]);
                l += 1;
            }
            if r & 1 == 1 {
                r -= 1;
                best = self.pick(best, self.tree[r]);
            }
            l >>= 1;
            r >>= 1;
        }
        best.ok_or_else(invalid)
    }

    /// Copies the values into a heap ordered by `is_min`.
    #[must_use]
    pub fn to_heap(&self, is_min: bool) -> NumberHeap {
        NumberHeap::from_vec(self.values.clone(), is_min)
    }

    /// Returns the values sorted ascending or descending.
    #[must_use]
    pub fn to_sorted(&self, ascending: bool) -> Vec<Integer> {
        let mut sorted = self.values.clone();
        if ascending {
            sorted.sort_unstable();
        } else {
            sorted.sort_unstable_by(|a, b| b.cmp(a));
        }
        sorted
    }

    fn pick(&self, a: Option<usize>, b: Option<usize>) -> Option<usize> {
        match (a, b) {
            (Some(i), Some(j)) => {
                if self.config.aggregate.prefers(&self.values[j], j, &self.values[i], i) {
                    Some(j)
                } else {
                    Some(i)
                }
            }
            (x, None) | (None, x) => x,
        }
    }

    fn update(&mut self, index: usize) {
        let leaf = self.capacity + index;
        self.tree[leaf] = Some(index);
        self.repair(leaf);
    }

    /// Recomputes every ancestor of `node`.
    fn repair(&mut self, mut node: usize) {
        while node > 1 {
            node >>= 1;
            self.tree[node] = self.pick(self.tree[2 * node], self.tree[2 * node + 1]);
        }
    }

    fn rebuild(&mut self) {
        let capacity = self.capacity;
        self.tree = vec![None; 2 * capacity];
        for i in 0..self.values.len() {
            self.tree[capacity + i] = Some(i);
        }
        for node in (1..capacity).rev() {
            self.tree[node] = self.pick(self.tree[2 * node], self.tree[2 * node + 1]);
        }
    }
}

/// An array-backed binary heap of integers.
#[derive(Clone, Debug)]
pub struct NumberHeap {
    items: Vec<Integer>,
    is_min: bool,
}

impl NumberHeap {
    /// Creates an empty min- or max-heap.
    #[must_use]
    pub fn new(is_min: bool) -> Self {
        Self {
            items: Vec::new(),
            is_min,
        }
    }

    /// Heapifies `items` in linear time.
    #[must_use]
    pub fn from_vec(items: Vec<Integer>, is_min: bool) -> Self {
        let mut heap = Self { items, is_min };
        for i in (0..heap.items.len() / 2).rev() {
            heap.sift_down(i);
        }
        heap
    }

    /// Returns true for a min-heap.
    #[must_use]
    pub fn is_min(&self) -> bool {
        self.is_min
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The top item.
    #[must_use]
    pub fn peek(&self) -> Option<&Integer> {
        self.items.first()
    }

    /// Adds an item.
    pub fn push(&mut self, value: Integer) {
        self.items.push(value);
        self.sift_up(self.items.len() - 1);
    }

    /// Removes the top item.
    pub fn pop(&mut self) -> Option<Integer> {
        if self.items.is_empty() {
            return None;
        }
        let top = self.items.swap_remove(0);
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        Some(top)
    }

    /// Drains the heap in pop order.
    #[must_use]
    pub fn into_sorted_vec(mut self) -> Vec<Integer> {
        let mut out = Vec::with_capacity(self.items.len());
        while let Some(top) = self.pop() {
            out.push(top);
        }
        out
    }

    fn above(&self, a: usize, b: usize) -> bool {
        if self.is_min {
            self.items[a] < self.items[b]
        } else {
            self.items[a] > self.items[b]
        }
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.above(i, parent) {
                break;
            }
            self.items.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut top = i;
            if left < len && self.above(left, top) {
                top = left;
            }
            if right < len && self.above(right, top) {
                top = right;
            }
            if top == i {
                break;
            }
            self.items.swap(i, top);
            i = top;
        }
    }
}
