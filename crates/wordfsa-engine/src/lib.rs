#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Incremental Knuth–Bendix completion for finitely presented groups and
//! monoids.
//!
//! The [`Engine`] owns a live rewrite trie ([`arena`]), a FIFO of equations
//! awaiting adoption ([`queue`]) and, for group presentations, a tracker of
//! word differences ([`differences`]). Completion is driven in resumable
//! steps; a finished run compiles into a frozen
//! [`wordfsa_rws::RewritingSystem`] or exports the difference automaton.

pub mod arena;
pub mod differences;
mod engine;
mod error;
mod invariants;
mod limits;
mod overlap;
pub mod queue;
mod trace;

#[cfg(test)]
mod engine_tests;
#[cfg(test)]
mod queue_tests;
#[cfg(test)]
mod trace_tests;

pub use arena::{NodeArena, NodeId};
pub use differences::{DifferenceTracker, LearnFlags, StateId, WdFlags};
pub use engine::{Engine, Progress, Stats};
pub use error::{EngineError, InternalError};
pub use limits::{CancelToken, EngineOptions, Limits, TableKind};
pub use queue::{EquationQueue, QueueKind};
pub use trace::{Derivation, NoopTracer, PrintTracer, Tracer, Verbosity};
