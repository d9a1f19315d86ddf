#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the wordfsa crates.
//!
//! Three layers:
//! - **Alphabet layer**: generators, inverses, word orderings
//! - **Reduction layer**: the generic rewrite loop driven by any [`Rewriter`]
//! - **Interchange layer**: the serialized rewriting system and the
//!   word-difference automaton snapshot handed to external consumers

mod alphabet;
mod colors;
mod format;
mod order;
mod reduce;
mod serialized;
mod snapshot;
mod word;

#[cfg(test)]
mod alphabet_tests;
#[cfg(test)]
mod order_tests;
#[cfg(test)]
mod serialized_tests;

pub use alphabet::{Alphabet, AlphabetError, Symbol};
pub use colors::Colors;
pub use format::width_for_count;
pub use order::WordOrder;
pub use reduce::{ReduceFlags, Rewriter, Step, reduce_with};
pub use serialized::{Presentation, SerializedError, SerializedSystem};
pub use snapshot::{DifferenceAutomaton, SnapshotError, SnapshotTable};
pub use word::{Word, WordError, check_length};

/// Generator index.
///
/// Generators are numbered `0..k` in alphabet order. The two sentinels of the
/// interchange formats (identity/padding and "not invertible") are modelled
/// as `Option<Gen>` rather than reserved values.
pub type Gen = u16;

/// Default bound on word length used when callers do not configure one.
pub const DEFAULT_MAX_WORD_LENGTH: usize = 1024;
