//! Errors that can occur during completion.

use wordfsa_core::{AlphabetError, SerializedError, WordError};
use wordfsa_rws::BuildError;

/// A broken internal invariant.
///
/// Raised through one channel so the engine can stop at the first one
/// instead of continuing on corrupted state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{context}: {detail}")]
pub struct InternalError {
    pub context: &'static str,
    pub detail: String,
}

impl InternalError {
    pub fn new(context: &'static str, detail: impl Into<String>) -> Self {
        Self {
            context,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Word(#[from] WordError),

    #[error(transparent)]
    Alphabet(#[from] AlphabetError),

    #[error(transparent)]
    Serialized(#[from] SerializedError),

    #[error("compiling the rewriting system failed: {0}")]
    Build(#[from] BuildError),

    /// The cancel token was set between two steps.
    #[error("completion cancelled")]
    Cancelled,

    /// A configured resource limit was reached.
    #[error("{what} limit of {limit} exceeded")]
    LimitExceeded { what: &'static str, limit: usize },

    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}
