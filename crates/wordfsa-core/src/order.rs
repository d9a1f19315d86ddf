//! Reduction orderings on words.
//!
//! Every ordering here is a well-ordering compatible with concatenation, so a
//! rule `lhs -> rhs` with `rhs < lhs` can be applied anywhere in a word and
//! repeated rewriting terminates.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::Gen;

/// How two words are compared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum WordOrder {
    /// Shorter words first; equal lengths compare lexicographically by
    /// generator index.
    #[default]
    ShortLex,
    /// Smaller total weight first, then shortlex. One weight per generator.
    WeightedLex { weights: Vec<u32> },
}

impl WordOrder {
    pub fn compare(&self, a: &[Gen], b: &[Gen]) -> Ordering {
        match self {
            WordOrder::ShortLex => shortlex(a, b),
            WordOrder::WeightedLex { weights } => {
                let wa = weight(weights, a);
                let wb = weight(weights, b);
                wa.cmp(&wb).then_with(|| shortlex(a, b))
            }
        }
    }

    /// `true` when `a` sorts strictly before `b`.
    #[inline]
    pub fn less(&self, a: &[Gen], b: &[Gen]) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// Whether reduced words are guaranteed to be shortest representatives.
    pub fn is_geodesic(&self) -> bool {
        match self {
            WordOrder::ShortLex => true,
            WordOrder::WeightedLex { weights } => weights.windows(2).all(|w| w[0] == w[1]),
        }
    }

    /// Check that the ordering is usable with `generators` letters.
    pub fn fits(&self, generators: usize) -> bool {
        match self {
            WordOrder::ShortLex => true,
            WordOrder::WeightedLex { weights } => {
                weights.len() == generators && weights.iter().all(|&w| w > 0)
            }
        }
    }
}

fn shortlex(a: &[Gen], b: &[Gen]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn weight(weights: &[u32], word: &[Gen]) -> u64 {
    word.iter().map(|&g| weights[g as usize] as u64).sum()
}
