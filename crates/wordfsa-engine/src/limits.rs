//! Resource limits, engine options and cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use wordfsa_core::DEFAULT_MAX_WORD_LENGTH;

/// Resource limits for a completion run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Longest word the engine will hold (default: 1,024).
    pub(crate) max_word_length: usize,
    /// Live equations allowed before completion stops (default: 250,000).
    pub(crate) max_equations: usize,
    /// Overlaps with a longer combined word are deferred (default: unlimited).
    pub(crate) max_overlap_length: usize,
    /// Work items per `expand_machine` call (default: 256).
    pub(crate) step_budget: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_word_length: DEFAULT_MAX_WORD_LENGTH,
            max_equations: 250_000,
            max_overlap_length: usize::MAX,
            step_budget: 256,
        }
    }
}

impl Limits {
    /// Create new limits with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the word length bound.
    pub fn max_word_length(mut self, max: usize) -> Self {
        self.max_word_length = max;
        self
    }

    /// Set the live equation bound.
    pub fn max_equations(mut self, max: usize) -> Self {
        self.max_equations = max;
        self
    }

    /// Set the overlap length above which overlaps are deferred.
    pub fn max_overlap_length(mut self, max: usize) -> Self {
        self.max_overlap_length = max;
        self
    }

    /// Set the number of work items per step. Zero is treated as one.
    pub fn step_budget(mut self, budget: u32) -> Self {
        self.step_budget = budget.max(1);
        self
    }

    pub fn get_max_word_length(&self) -> usize {
        self.max_word_length
    }
    pub fn get_max_equations(&self) -> usize {
        self.max_equations
    }
    pub fn get_max_overlap_length(&self) -> usize {
        self.max_overlap_length
    }
    pub fn get_step_budget(&self) -> u32 {
        self.step_budget
    }
}

/// Storage for the children of trie nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableKind {
    /// One slot per generator.
    Dense,
    /// Sorted `(generator, child)` list.
    Sparse,
    /// Dense up to [`TableKind::AUTO_DENSE_LIMIT`] generators, sparse above.
    #[default]
    Auto,
}

impl TableKind {
    pub const AUTO_DENSE_LIMIT: usize = 16;

    /// Whether nodes over `generators` letters get dense tables.
    pub fn is_dense(self, generators: usize) -> bool {
        match self {
            TableKind::Dense => true,
            TableKind::Sparse => false,
            TableKind::Auto => generators <= Self::AUTO_DENSE_LIMIT,
        }
    }
}

/// Behavioural switches of the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    /// Track word differences (ignored for monoid presentations).
    pub(crate) track_differences: bool,
    /// Keep equations whose left-hand side gained a reducible suffix.
    pub(crate) keep_secondary: bool,
    pub(crate) transition_table: TableKind,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            track_differences: true,
            keep_secondary: false,
            transition_table: TableKind::Auto,
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_differences(mut self, on: bool) -> Self {
        self.track_differences = on;
        self
    }

    pub fn keep_secondary(mut self, on: bool) -> Self {
        self.keep_secondary = on;
        self
    }

    pub fn transition_table(mut self, kind: TableKind) -> Self {
        self.transition_table = kind;
        self
    }

    pub fn get_track_differences(&self) -> bool {
        self.track_differences
    }
    pub fn get_keep_secondary(&self) -> bool {
        self.keep_secondary
    }
    pub fn get_transition_table(&self) -> TableKind {
        self.transition_table
    }
}

/// Shared flag polled between completion steps.
///
/// Clones share the flag, so a token handed to another thread can stop a
/// run in progress.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
