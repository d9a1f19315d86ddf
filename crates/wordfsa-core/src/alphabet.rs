//! Generator alphabets.
//!
//! An [`Alphabet`] owns the generator names (in ordering sequence), the
//! inverse table and the word ordering. Generator `g` is the `g`-th name.
//!
//! Product symbols pair two generators read in lock-step by the
//! word-difference automaton. With `k` generators the padding letter is
//! encoded as index `k`, so a pair `(left, right)` becomes
//! `left·(k+1) + right`. The pair `(padding, padding)` never labels a
//! transition.

use std::cmp::Ordering;
use std::fmt::Write;

use indexmap::IndexMap;

use crate::order::WordOrder;
use crate::word::{Word, WordError};
use crate::Gen;

/// Index of a product symbol, see the module docs.
pub type Symbol = u32;

/// Errors raised while building an alphabet or parsing words against it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlphabetError {
    #[error("alphabet has no generators")]
    Empty,
    #[error("too many generators: {0}")]
    TooLarge(usize),
    #[error("duplicate generator name `{0}`")]
    Duplicate(String),
    #[error("unknown generator `{0}`")]
    Unknown(String),
    #[error("inverse table has {got} entries for {expected} generators")]
    InverseCount { expected: usize, got: usize },
    #[error("inverse of `{0}` is not consistent (inverse must be an involution)")]
    InverseMismatch(String),
    #[error("ordering does not fit an alphabet of {0} generators")]
    BadOrder(usize),
}

/// Generators, their inverses and the word ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    names: IndexMap<String, Gen>,
    inverses: Vec<Option<Gen>>,
    order: WordOrder,
    single_char: bool,
}

impl Alphabet {
    /// Alphabet of a monoid presentation: no generator is invertible.
    pub fn new<I, S>(names: I) -> Result<Self, AlphabetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = IndexMap::new();
        for name in names {
            let name = name.into();
            let next = map.len();
            if next > Gen::MAX as usize - 1 {
                return Err(AlphabetError::TooLarge(next + 1));
            }
            if map.insert(name.clone(), next as Gen).is_some() {
                return Err(AlphabetError::Duplicate(name));
            }
        }
        if map.is_empty() {
            return Err(AlphabetError::Empty);
        }
        let single_char = map.keys().all(|n| n.chars().count() == 1);
        let count = map.len();
        Ok(Self {
            names: map,
            inverses: vec![None; count],
            order: WordOrder::default(),
            single_char,
        })
    }

    /// Alphabet with an explicit inverse table, one entry per generator.
    pub fn with_inverses<I, S>(names: I, inverses: &[Option<&str>]) -> Result<Self, AlphabetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut alphabet = Self::new(names)?;
        if inverses.len() != alphabet.len() {
            return Err(AlphabetError::InverseCount {
                expected: alphabet.len(),
                got: inverses.len(),
            });
        }
        for (g, inverse) in inverses.iter().enumerate() {
            let Some(name) = inverse else { continue };
            let ig = alphabet.index(name)?;
            alphabet.inverses[g] = Some(ig);
        }
        alphabet.validate_inverses()?;
        Ok(alphabet)
    }

    /// Group alphabet where every generator name in `pairs` is followed by its
    /// inverse, e.g. `["a", "A", "b", "B"]`. Self-inverse generators may be
    /// listed alone via [`Alphabet::with_inverses`].
    pub fn group<I, S>(pairs: I) -> Result<Self, AlphabetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = pairs.into_iter().map(Into::into).collect();
        let mut inverses = Vec::with_capacity(names.len());
        for chunk in names.chunks(2) {
            match chunk {
                [a, b] => {
                    inverses.push(Some(b.as_str()));
                    inverses.push(Some(a.as_str()));
                }
                [a] => inverses.push(Some(a.as_str())),
                _ => unreachable!("chunks(2) yields one or two items"),
            }
        }
        Self::with_inverses(names.iter().cloned(), &inverses)
    }

    /// Replace the word ordering.
    pub fn with_order(mut self, order: WordOrder) -> Result<Self, AlphabetError> {
        if !order.fits(self.len()) {
            return Err(AlphabetError::BadOrder(self.len()));
        }
        self.order = order;
        Ok(self)
    }

    fn validate_inverses(&self) -> Result<(), AlphabetError> {
        for (g, inverse) in self.inverses.iter().enumerate() {
            if let Some(ig) = inverse
                && self.inverses[*ig as usize] != Some(g as Gen)
            {
                return Err(AlphabetError::InverseMismatch(self.name(g as Gen).to_owned()));
            }
        }
        Ok(())
    }

    /// Number of generators `k`.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false: construction rejects empty alphabets.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    pub fn generators(&self) -> impl Iterator<Item = Gen> + '_ {
        0..self.len() as Gen
    }

    /// Name of generator `g`.
    ///
    /// # Panics
    /// Panics if `g` is out of range.
    pub fn name(&self, g: Gen) -> &str {
        self.names
            .get_index(g as usize)
            .map(|(name, _)| name.as_str())
            .unwrap_or_else(|| panic!("generator {g} out of range"))
    }

    pub fn index(&self, name: &str) -> Result<Gen, AlphabetError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| AlphabetError::Unknown(name.to_owned()))
    }

    #[inline]
    pub fn inverse(&self, g: Gen) -> Option<Gen> {
        self.inverses[g as usize]
    }

    pub fn inverses(&self) -> &[Option<Gen>] {
        &self.inverses
    }

    /// True when every generator has an inverse.
    pub fn is_group(&self) -> bool {
        self.inverses.iter().all(Option::is_some)
    }

    #[inline]
    pub fn order(&self) -> &WordOrder {
        &self.order
    }

    #[inline]
    pub fn compare(&self, a: &[Gen], b: &[Gen]) -> Ordering {
        self.order.compare(a, b)
    }

    /// Formal inverse of a word: reversed, each letter inverted.
    pub fn invert(&self, word: &[Gen]) -> Result<Word, WordError> {
        word.iter()
            .rev()
            .map(|&g| self.inverse(g).ok_or(WordError::NotInvertible(g)))
            .collect()
    }

    /// Check every letter is a generator of this alphabet.
    pub fn check_word(&self, word: &[Gen]) -> Result<(), WordError> {
        match word.iter().find(|&&g| g as usize >= self.len()) {
            Some(&g) => Err(WordError::BadGenerator(g)),
            None => Ok(()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Product symbols
    // ─────────────────────────────────────────────────────────────────────

    /// Number of product symbols, padding pair included.
    #[inline]
    pub fn symbol_count(&self) -> usize {
        let k = self.len() + 1;
        k * k
    }

    /// Encode a generator pair; `None` is the padding letter.
    #[inline]
    pub fn symbol(&self, left: Option<Gen>, right: Option<Gen>) -> Symbol {
        let k = self.len() as Symbol;
        let l = left.map_or(k, Symbol::from);
        let r = right.map_or(k, Symbol::from);
        l * (k + 1) + r
    }

    /// Decode a product symbol into its generator pair.
    #[inline]
    pub fn split_symbol(&self, symbol: Symbol) -> (Option<Gen>, Option<Gen>) {
        let k = self.len() as Symbol;
        let l = symbol / (k + 1);
        let r = symbol % (k + 1);
        let pick = |x: Symbol| (x < k).then_some(x as Gen);
        (pick(l), pick(r))
    }

    /// Every product symbol except `(padding, padding)`, in index order.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        let last = self.symbol(None, None);
        (0..self.symbol_count() as Symbol).filter(move |&s| s != last)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Text forms
    // ─────────────────────────────────────────────────────────────────────

    /// Parse a word written with generator names.
    ///
    /// Accepted forms: names separated by whitespace or `*`; for alphabets
    /// whose names are all one character, the plain concatenation (`"aAb"`).
    /// The empty string, `"1"` and `"IdWord"` denote the identity.
    pub fn parse_word(&self, text: &str) -> Result<Word, AlphabetError> {
        let text = text.trim();
        if text.is_empty() || text == "IdWord" || (text == "1" && self.names.get("1").is_none())
        {
            return Ok(Word::new());
        }
        if text.contains(|c: char| c.is_whitespace() || c == '*') {
            return text
                .split(|c: char| c.is_whitespace() || c == '*')
                .filter(|part| !part.is_empty())
                .map(|part| self.index(part))
                .collect();
        }
        if let Ok(g) = self.index(text) {
            return Ok(vec![g]);
        }
        if self.single_char {
            let mut buf = [0u8; 4];
            return text
                .chars()
                .map(|c| self.index(c.encode_utf8(&mut buf)))
                .collect();
        }
        Err(AlphabetError::Unknown(text.to_owned()))
    }

    /// Format a word so that [`Alphabet::parse_word`] reads it back.
    /// The identity formats as the empty string.
    pub fn format_word(&self, word: &[Gen]) -> String {
        let mut out = String::new();
        for (i, &g) in word.iter().enumerate() {
            if i > 0 && !self.single_char {
                out.push('*');
            }
            out.push_str(self.name(g));
        }
        out
    }

    /// Human-readable form for dumps: like `format_word`, but the identity
    /// shows as `ε`.
    pub fn display_word(&self, word: &[Gen]) -> String {
        if word.is_empty() {
            return "ε".to_owned();
        }
        self.format_word(word)
    }

    /// Human-readable form of a product symbol, e.g. `(a,B)` or `(a,_)`.
    pub fn display_symbol(&self, symbol: Symbol) -> String {
        let (l, r) = self.split_symbol(symbol);
        let mut out = String::from("(");
        let side = |g: Option<Gen>| g.map_or("_", |g| self.name(g));
        let _ = write!(out, "{},{})", side(l), side(r));
        out
    }
}
