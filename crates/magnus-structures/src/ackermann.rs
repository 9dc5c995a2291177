//! A memoized Ackermann evaluator.
//!
//! The structure owns every node in one table keyed by `(m, n)`. Nodes do
//! not point at each other: the four grid neighbors of a node are keys,
//! resolved through the table on demand.
//!
//! Evaluation runs on an explicit work stack. Each pushed frame counts
//! against `max_computation_steps`, so requests that are too deep or too
//! wide end in [`ComputeError::ComputationLimit`] rather than a crashed
//! thread. New nodes are staged and committed only when the whole request
//! succeeds.

use magnus_integers::{normalize_u64, scaled_division, Integer, NumericInput, ScaledDecimal};
use magnus_kernel::{ComputeError, Config, OverflowGuard, Result};
use num_traits::One;
use rustc_hash::FxHashMap;
use tracing::debug;

/// A memo table key, `(m, n)`.
pub type Key = (u64, u64);

/// One of the four grid neighbors of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `(m - 1, n)`
    LowerM,
    /// `(m, n - 1)`
    LowerN,
    /// `(m + 1, n)`
    HigherM,
    /// `(m, n + 1)`
    HigherN,
}

impl Direction {
    /// All directions, in declaration order.
    pub const ALL: [Direction; 4] = [Self::LowerM, Self::LowerN, Self::HigherM, Self::HigherN];
}

/// A memoized value `A(m, n)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AckermannNode {
    m: u64,
    n: u64,
    value: Integer,
}

impl AckermannNode {
    /// The first argument.
    #[must_use]
    pub fn m(&self) -> u64 {
        self.m
    }

    /// The second argument.
    #[must_use]
    pub fn n(&self) -> u64 {
        self.n
    }

    /// `A(m, n)`.
    #[must_use]
    pub fn value(&self) -> &Integer {
        &self.value
    }

    /// The table key of this node.
    #[must_use]
    pub fn key(&self) -> Key {
        (self.m, self.n)
    }

    /// The key of the neighbor in `direction`, if it lies on the grid.
    #[must_use]
    pub fn neighbor_key(&self, direction: Direction) -> Option<Key> {
        let (m, n) = self.key();
        match direction {
            Direction::LowerM => Some((m.checked_sub(1)?, n)),
            Direction::LowerN => Some((m, n.checked_sub(1)?)),
            Direction::HigherM => Some((m.checked_add(1)?, n)),
            Direction::HigherN => Some((m, n.checked_add(1)?)),
        }
    }

    /// Neighbor keys in [`Direction::ALL`] order.
    #[must_use]
    pub fn neighbor_keys(&self) -> [Option<Key>; 4] {
        Direction::ALL.map(|d| self.neighbor_key(d))
    }
}

/// Change between consecutive values of one row, `A(m, n-1)` to `A(m, n)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrowthSample {
    /// The second argument of the later value.
    pub n: u64,
    /// `A(m, n)`.
    pub value: Integer,
    /// `A(m, n) - A(m, n - 1)`.
    pub absolute_increase: Integer,
    /// `A(m, n) / A(m, n - 1)` at the configured precision.
    pub ratio: ScaledDecimal,
}

/// What a frame on the work stack needs next.
enum Step {
    Done(Integer),
    Need(Key),
}

/// Memo table plus the evaluation state of one request.
struct Evaluation<'t> {
    committed: Option<&'t FxHashMap<Key, AckermannNode>>,
    staged: FxHashMap<Key, Integer>,
    // Completion order of staged keys.
    order: Vec<Key>,
    guard: OverflowGuard,
    max_steps: usize,
    pushes: usize,
}

impl<'t> Evaluation<'t> {
    fn new(committed: Option<&'t FxHashMap<Key, AckermannNode>>, config: &Config) -> Self {
        Self {
            committed,
            staged: FxHashMap::default(),
            order: Vec::new(),
            guard: OverflowGuard::new(config),
            max_steps: config.max_computation_steps,
            pushes: 0,
        }
    }

    fn lookup(&self, key: Key) -> Option<&Integer> {
        self.committed
            .and_then(|table| table.get(&key))
            .map(AckermannNode::value)
            .or_else(|| self.staged.get(&key))
    }

    fn step(&self, (m, n): Key) -> Result<Step> {
        if m == 0 {
            return Ok(Step::Done(Integer::from(n) + Integer::one()));
        }
        if n == 0 {
            return Ok(match self.lookup((m - 1, 1)) {
                Some(v) => Step::Done(v.clone()),
                None => Step::Need((m - 1, 1)),
            });
        }
        let Some(inner) = self.lookup((m, n - 1)) else {
            return Ok(Step::Need((m, n - 1)));
        };
        let inner = inner.to_u64().ok_or_else(|| ComputeError::Overflow {
            operation: "ackermann",
            limit: 64,
            detail: format!("A({m}, {}) = {inner} is too large to use as an argument", n - 1),
        })?;
        Ok(match self.lookup((m - 1, inner)) {
            Some(v) => Step::Done(v.clone()),
            None => Step::Need((m - 1, inner)),
        })
    }

    fn push(&mut self, stack: &mut Vec<Key>, key: Key) -> Result<()> {
        self.pushes += 1;
        if self.pushes > self.max_steps {
            debug!(pushes = self.pushes, depth = stack.len(), "ackermann work stack exhausted");
            return Err(ComputeError::ComputationLimit {
                operation: "ackermann",
                limit: self.max_steps,
            });
        }
        stack.push(key);
        Ok(())
    }

    fn run(&mut self, target: Key) -> Result<Integer> {
        if let Some(value) = self.lookup(target) {
            return Ok(value.clone());
        }
        let mut stack = Vec::new();
        self.push(&mut stack, target)?;
        while let Some(&key) = stack.last() {
            if self.lookup(key).is_some() {
                stack.pop();
                continue;
            }
            match self.step(key)? {
                Step::Done(value) => {
                    self.guard.check_result("ackermann", &value)?;
                    stack.pop();
                    self.staged.insert(key, value);
                    self.order.push(key);
                }
                Step::Need(dependency) => self.push(&mut stack, dependency)?,
            }
        }
        self.lookup(target).cloned().ok_or(ComputeError::ComputationLimit {
            operation: "ackermann",
            limit: self.max_steps,
        })
    }

    fn into_staged(self) -> (FxHashMap<Key, Integer>, Vec<Key>) {
        (self.staged, self.order)
    }
}

/// A memoized, grid-linked Ackermann table.
#[derive(Clone, Debug, Default)]
pub struct AckermannStructure {
    config: Config,
    table: FxHashMap<Key, AckermannNode>,
    largest: Option<Key>,
}

impl AckermannStructure {
    /// Creates an empty table.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            table: FxHashMap::default(),
            largest: None,
        }
    }

    /// The configuration used for evaluation.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns `A(m, n)`, computing and memoizing it and every intermediate
    /// value if needed.
    ///
    /// # Errors
    ///
    /// - a validation error for negative or oversized arguments
    /// - [`ComputeError::ComputationLimit`] when more than
    ///   `max_computation_steps` frames are pushed
    /// - [`ComputeError::Overflow`] when an intermediate exceeds the bound
    ///
    /// On error the table is unchanged.
    pub fn add_node(
        &mut self,
        m: impl Into<NumericInput>,
        n: impl Into<NumericInput>,
    ) -> Result<&AckermannNode> {
        self.config.validate()?;
        let key = (normalize_u64(m, "m")?, normalize_u64(n, "n")?);
        if self.table.contains_key(&key) {
            debug!(m = key.0, n = key.1, "ackermann memo hit");
        } else {
            let mut evaluation = Evaluation::new(Some(&self.table), &self.config);
            evaluation.run(key)?;
            let (staged, order) = evaluation.into_staged();
            self.commit(staged, &order);
        }
        self.table.get(&key).ok_or(ComputeError::ComputationLimit {
            operation: "ackermann",
            limit: self.config.max_computation_steps,
        })
    }

    /// Memoizes `A(m, n)` for every `m <= m_max`, `n <= n_max`, by
    /// increasing `m` then increasing `n`. Returns how many nodes were
    /// added.
    ///
    /// # Errors
    ///
    /// Fails like [`AckermannStructure::add_node`]; on error nothing from
    /// the range is committed. The step budget applies per cell.
    pub fn build_range(
        &mut self,
        m_max: impl Into<NumericInput>,
        n_max: impl Into<NumericInput>,
    ) -> Result<usize> {
        self.config.validate()?;
        let m_max = normalize_u64(m_max, "m_max")?;
        let n_max = normalize_u64(n_max, "n_max")?;

        let mut evaluation = Evaluation::new(Some(&self.table), &self.config);
        for m in 0..=m_max {
            for n in 0..=n_max {
                evaluation.pushes = 0;
                evaluation.run((m, n))?;
            }
        }
        let (staged, order) = evaluation.into_staged();
        let added = order.len();
        self.commit(staged, &order);
        Ok(added)
    }

    fn commit(&mut self, mut staged: FxHashMap<Key, Integer>, order: &[Key]) {
        for &(m, n) in order {
            let Some(value) = staged.remove(&(m, n)) else {
                continue;
            };
            let larger = self
                .largest_node()
                .map_or(true, |current| value > current.value);
            self.table.insert((m, n), AckermannNode { m, n, value });
            if larger {
                self.largest = Some((m, n));
            }
        }
        debug!(added = order.len(), total = self.table.len(), "ackermann nodes committed");
    }

    /// Keys evaluated to produce `A(m, n)` from an empty table, in
    /// completion order. The target comes last. The table is not consulted
    /// or modified.
    ///
    /// # Errors
    ///
    /// Fails like [`AckermannStructure::add_node`].
    pub fn get_computation_path(
        &self,
        m: impl Into<NumericInput>,
        n: impl Into<NumericInput>,
    ) -> Result<Vec<Key>> {
        self.config.validate()?;
        let key = (normalize_u64(m, "m")?, normalize_u64(n, "n")?);
        let mut evaluation = Evaluation::new(None, &self.config);
        evaluation.run(key)?;
        Ok(evaluation.into_staged().1)
    }

    /// Growth between consecutive memoized values of row `m`.
    ///
    /// One sample per `n` for which both `A(m, n)` and `A(m, n - 1)` are
    /// memoized, ordered by `n`.
    ///
    /// # Errors
    ///
    /// Fails only for a negative or oversized `m`.
    pub fn analyze_growth_rate(&self, m: impl Into<NumericInput>) -> Result<Vec<GrowthSample>> {
        let m = normalize_u64(m, "m")?;
        let mut row: Vec<&AckermannNode> = self.table.values().filter(|node| node.m == m).collect();
        row.sort_unstable_by_key(|node| node.n);

        let mut samples = Vec::new();
        for pair in row.windows(2) {
            let (previous, current) = (pair[0], pair[1]);
            if current.n != previous.n + 1 {
                continue;
            }
            let ratio = scaled_division(
                &current.value,
                &previous.value,
                self.config.decimal_precision,
                self.config.rounding_mode,
            )?;
            samples.push(GrowthSample {
                n: current.n,
                value: current.value.clone(),
                absolute_increase: &current.value - &previous.value,
                ratio,
            });
        }
        Ok(samples)
    }

    /// The memoized node at `(m, n)`.
    #[must_use]
    pub fn get(&self, m: u64, n: u64) -> Option<&AckermannNode> {
        self.table.get(&(m, n))
    }

    /// The memoized neighbor of `key` in `direction`.
    #[must_use]
    pub fn neighbor(&self, key: Key, direction: Direction) -> Option<&AckermannNode> {
        let node = self.table.get(&key)?;
        self.table.get(&node.neighbor_key(direction)?)
    }

    /// Number of memoized nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true when nothing is memoized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Drops every memoized node.
    pub fn clear(&mut self) {
        self.table.clear();
        self.largest = None;
    }

    /// The largest memoized value.
    #[must_use]
    pub fn get_largest_value(&self) -> Option<&Integer> {
        self.largest_node().map(AckermannNode::value)
    }

    /// The node holding the largest memoized value. Ties keep the node
    /// that was memoized first.
    #[must_use]
    pub fn largest_node(&self) -> Option<&AckermannNode> {
        self.table.get(&self.largest?)
    }
}
