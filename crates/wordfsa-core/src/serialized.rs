//! Serialized rewriting systems.
//!
//! One JSON record carries both presentations (input) and computed
//! rewriting systems (output):
//!
//! ```json
//! {
//!   "generatorOrder": ["a", "A", "b", "B"],
//!   "inverses": ["A", "a", "B", "b"],
//!   "equations": [["aa", ""], ["bb", ""]],
//!   "isConfluent": false
//! }
//! ```
//!
//! Words are written with generator names (see [`Alphabet::parse_word`]);
//! the empty string is the identity.

use serde::{Deserialize, Serialize};

use crate::alphabet::{Alphabet, AlphabetError};
use crate::order::WordOrder;
use crate::word::Word;
use crate::Gen;

/// Error while reading or interpreting a serialized system.
#[derive(Debug, thiserror::Error)]
pub enum SerializedError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Alphabet(#[from] AlphabetError),
    #[error("equation {index}: {source}")]
    Equation {
        index: usize,
        #[source]
        source: AlphabetError,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The serialized record, field for field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedSystem {
    pub generator_order: Vec<String>,
    #[serde(default)]
    pub inverses: Vec<Option<String>>,
    #[serde(default)]
    pub equations: Vec<[String; 2]>,
    #[serde(default)]
    pub is_confluent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<WordOrder>,
}

/// Presentations use the same record; `isConfluent` is ignored on input.
pub type Presentation = SerializedSystem;

impl SerializedSystem {
    pub fn from_json(json: &str) -> Result<Self, SerializedError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, SerializedError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("serialization should not fail")
    }

    /// Build a record from an alphabet and word pairs.
    pub fn from_parts<'a, I>(alphabet: &Alphabet, equations: I, is_confluent: bool) -> Self
    where
        I: IntoIterator<Item = (&'a [Gen], &'a [Gen])>,
    {
        let generator_order = alphabet.generators().map(|g| alphabet.name(g).to_owned()).collect();
        let inverses = alphabet
            .generators()
            .map(|g| alphabet.inverse(g).map(|ig| alphabet.name(ig).to_owned()))
            .collect();
        let equations = equations
            .into_iter()
            .map(|(lhs, rhs)| [alphabet.format_word(lhs), alphabet.format_word(rhs)])
            .collect();
        let ordering = match alphabet.order() {
            WordOrder::ShortLex => None,
            other => Some(other.clone()),
        };
        Self {
            generator_order,
            inverses,
            equations,
            is_confluent,
            ordering,
        }
    }

    /// The alphabet described by the record. A missing inverse table means a
    /// monoid presentation.
    pub fn alphabet(&self) -> Result<Alphabet, SerializedError> {
        let alphabet = if self.inverses.is_empty() {
            Alphabet::new(self.generator_order.iter().cloned())?
        } else {
            let refs: Vec<Option<&str>> = self.inverses.iter().map(|i| i.as_deref()).collect();
            Alphabet::with_inverses(self.generator_order.iter().cloned(), &refs)?
        };
        Ok(match &self.ordering {
            Some(order) => alphabet.with_order(order.clone())?,
            None => alphabet,
        })
    }

    /// Parse every equation against `alphabet`.
    pub fn word_pairs(&self, alphabet: &Alphabet) -> Result<Vec<(Word, Word)>, SerializedError> {
        self.equations
            .iter()
            .enumerate()
            .map(|(index, [lhs, rhs])| {
                let parse = |text: &str| {
                    alphabet
                        .parse_word(text)
                        .map_err(|source| SerializedError::Equation { index, source })
                };
                Ok((parse(lhs)?, parse(rhs)?))
            })
            .collect()
    }
}
