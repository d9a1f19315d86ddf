//! Word-difference automaton snapshots.
//!
//! A snapshot is the read-only form of the difference automaton handed to
//! acceptor and multiplier construction. States are numbered `1..=N`; `0`
//! means "no transition". The alphabet is every product symbol of the
//! generator alphabet (see [`crate::Alphabet::symbol`]). Only state 1, the
//! identity difference, accepts.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::alphabet::{Alphabet, Symbol};
use crate::word::Word;

/// Error while decoding a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("binary decode error: {0}")]
    Binary(#[from] postcard::Error),
}

/// Transition storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotTable {
    /// Row-major, `N` rows of `symbol_count` targets.
    Dense(Vec<u32>),
    /// One sorted `(symbol, target)` list per state.
    Sparse(Vec<Vec<(Symbol, u32)>>),
}

/// The word-difference automaton snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferenceAutomaton {
    /// Number of generators `k`; there are `(k+1)²` product symbols.
    pub generators: usize,
    pub state_count: usize,
    /// Reduced word of each state's difference, index `state - 1`.
    pub words: Vec<Word>,
    pub table: SnapshotTable,
}

impl DifferenceAutomaton {
    #[inline]
    pub fn symbol_count(&self) -> usize {
        (self.generators + 1) * (self.generators + 1)
    }

    #[inline]
    pub fn initial(&self) -> u32 {
        1
    }

    #[inline]
    pub fn is_accepting(&self, state: u32) -> bool {
        state == 1
    }

    /// Target of `state` on `symbol`, if any.
    pub fn target(&self, state: u32, symbol: Symbol) -> Option<u32> {
        if state == 0 || state as usize > self.state_count {
            return None;
        }
        let row = state as usize - 1;
        let target = match &self.table {
            SnapshotTable::Dense(cells) => cells[row * self.symbol_count() + symbol as usize],
            SnapshotTable::Sparse(rows) => rows[row]
                .binary_search_by_key(&symbol, |&(s, _)| s)
                .map_or(0, |i| rows[row][i].1),
        };
        (target != 0).then_some(target)
    }

    /// Total number of transitions.
    pub fn transition_count(&self) -> usize {
        match &self.table {
            SnapshotTable::Dense(cells) => cells.iter().filter(|&&t| t != 0).count(),
            SnapshotTable::Sparse(rows) => rows.iter().map(Vec::len).sum(),
        }
    }

    /// Run a padded word pair from the initial state.
    pub fn run(&self, symbols: impl IntoIterator<Item = Symbol>) -> Option<u32> {
        symbols
            .into_iter()
            .try_fold(self.initial(), |state, symbol| self.target(state, symbol))
    }

    /// Convert to the sparse representation.
    pub fn to_sparse(&self) -> Self {
        let rows = (1..=self.state_count as u32)
            .map(|state| {
                (0..self.symbol_count() as Symbol)
                    .filter_map(|s| self.target(state, s).map(|t| (s, t)))
                    .collect()
            })
            .collect();
        Self {
            table: SnapshotTable::Sparse(rows),
            ..self.clone()
        }
    }

    pub fn to_binary(&self) -> Vec<u8> {
        postcard::to_allocvec(self).expect("serialization should not fail")
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(postcard::from_bytes(bytes)?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialization should not fail")
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// One line per state: `S1 [ε]*: (a,a)→S1 …`. Accepting states carry `*`.
    pub fn dump(&self, alphabet: &Alphabet) -> String {
        let mut out = String::new();
        for state in 1..=self.state_count as u32 {
            let word = alphabet.display_word(&self.words[state as usize - 1]);
            let accept = if self.is_accepting(state) { "*" } else { "" };
            let _ = write!(out, "S{state} [{word}]{accept}:");
            for symbol in 0..self.symbol_count() as Symbol {
                if let Some(target) = self.target(state, symbol) {
                    let _ = write!(out, " {}→S{target}", alphabet.display_symbol(symbol));
                }
            }
            out.push('\n');
        }
        out
    }
}
