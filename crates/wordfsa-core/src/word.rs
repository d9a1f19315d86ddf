//! Words over an alphabet.

use crate::Gen;

/// A finite sequence of generators. The empty word is the identity.
pub type Word = Vec<Gen>;

/// Errors raised for words that cannot be handled as given.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WordError {
    /// The word (or an intermediate rewrite of it) outgrew the configured bound.
    #[error("word length {len} exceeds the maximum of {max}")]
    TooLong { len: usize, max: usize },

    /// A letter that is not a generator of the alphabet.
    #[error("generator index {0} is out of range")]
    BadGenerator(Gen),

    /// Inversion was requested for a word containing a non-invertible generator.
    #[error("generator index {0} has no inverse")]
    NotInvertible(Gen),
}

/// Reject a word longer than `max`.
///
/// Words are never truncated: a truncated word would denote a different
/// element and silently break every equation derived from it.
#[inline]
pub fn check_length(len: usize, max: usize) -> Result<(), WordError> {
    if len > max {
        return Err(WordError::TooLong { len, max });
    }
    Ok(())
}
