//! The compiled rewriting system.
//!
//! Rules are compiled into an Aho–Corasick style automaton over the
//! generator alphabet. State 0 is the empty word; every other state is a
//! proper prefix of some left-hand side that has no left-hand side as a
//! suffix. Each slot of the dense transition table holds either a successor
//! state (`slot >= 0`) or a rule to apply (`slot = -(rule + 1)`). Rule
//! letters live out of band in one packed letter array.

use wordfsa_core::{
    Alphabet, DEFAULT_MAX_WORD_LENGTH, Gen, ReduceFlags, Rewriter, SerializedError,
    SerializedSystem, Step, Word, WordError, check_length, reduce_with,
};

/// Dense state index; 0 is the initial state.
pub type StateId = u32;
/// Index into the rule table.
pub type RuleId = u32;

const NO_CHILD: u32 = u32::MAX;

/// Error while compiling rules.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("rule {index}: left-hand side is empty")]
    EmptyLhs { index: usize },
    #[error("rule {index}: right-hand side does not sort before the left-hand side")]
    Unoriented { index: usize },
    #[error("rule {index}: {source}")]
    Word {
        index: usize,
        #[source]
        source: WordError,
    },
    #[error("automaton needs more states than a transition slot can address")]
    TooManyStates,
    #[error(transparent)]
    Serialized(#[from] SerializedError),
}

/// Packed rule record: left-hand letters at `offset`, right-hand letters
/// immediately after.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PackedRule {
    pub offset: u32,
    pub lhs_len: u32,
    pub rhs_len: u32,
}

/// A frozen rewriting system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewritingSystem {
    pub(crate) alphabet: Alphabet,
    /// Row-major, `alphabet.len()` slots per state.
    pub(crate) slots: Vec<i32>,
    pub(crate) rules: Vec<PackedRule>,
    pub(crate) letters: Vec<Gen>,
    pub(crate) is_confluent: bool,
    pub(crate) max_word_length: usize,
}

impl RewritingSystem {
    /// Compile `rules` over `alphabet`.
    ///
    /// Every rule must be oriented (`rhs` sorts before `lhs` in the alphabet's
    /// ordering) so that reduction terminates. A rule whose left-hand side
    /// contains an earlier left-hand side is kept in the rule table but never
    /// fires; the earlier rule always matches first.
    pub fn from_rules(
        alphabet: Alphabet,
        rules: &[(Word, Word)],
        is_confluent: bool,
    ) -> Result<Self, BuildError> {
        let max_word_length = DEFAULT_MAX_WORD_LENGTH;
        let mut packed = Vec::with_capacity(rules.len());
        let mut letters = Vec::new();

        for (index, (lhs, rhs)) in rules.iter().enumerate() {
            if lhs.is_empty() {
                return Err(BuildError::EmptyLhs { index });
            }
            let check = |word: &[Gen]| -> Result<(), WordError> {
                alphabet.check_word(word)?;
                check_length(word.len(), max_word_length)
            };
            check(lhs)
                .and_then(|()| check(rhs))
                .map_err(|source| BuildError::Word { index, source })?;
            if !alphabet.order().less(rhs, lhs) {
                return Err(BuildError::Unoriented { index });
            }
            packed.push(PackedRule {
                offset: letters.len() as u32,
                lhs_len: lhs.len() as u32,
                rhs_len: rhs.len() as u32,
            });
            letters.extend_from_slice(lhs);
            letters.extend_from_slice(rhs);
        }

        let slots = build_automaton(alphabet.len(), rules)?;

        Ok(Self {
            alphabet,
            slots,
            rules: packed,
            letters,
            is_confluent,
            max_word_length,
        })
    }

    /// Load a serialized rewriting system.
    pub fn from_serialized(record: &SerializedSystem) -> Result<Self, BuildError> {
        let alphabet = record.alphabet()?;
        let rules = record.word_pairs(&alphabet)?;
        Self::from_rules(alphabet, &rules, record.is_confluent)
    }

    /// The serialized form: generator order, inverses and every rule.
    pub fn to_serialized(&self) -> SerializedSystem {
        SerializedSystem::from_parts(&self.alphabet, self.rules(), self.is_confluent)
    }

    /// Bound applied to every word during reduction.
    pub fn with_max_word_length(mut self, max: usize) -> Self {
        self.max_word_length = max;
        self
    }

    #[inline]
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    #[inline]
    pub fn is_confluent(&self) -> bool {
        self.is_confluent
    }

    #[inline]
    pub fn max_word_length(&self) -> usize {
        self.max_word_length
    }

    pub fn state_count(&self) -> usize {
        self.slots.len() / self.alphabet.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Left- and right-hand side of rule `id`.
    pub fn rule(&self, id: RuleId) -> (&[Gen], &[Gen]) {
        let rule = self.rules[id as usize];
        let start = rule.offset as usize;
        let mid = start + rule.lhs_len as usize;
        let end = mid + rule.rhs_len as usize;
        (&self.letters[start..mid], &self.letters[mid..end])
    }

    pub fn rules(&self) -> impl Iterator<Item = (&[Gen], &[Gen])> + '_ {
        (0..self.rules.len() as RuleId).map(|id| self.rule(id))
    }

    /// Read letter `g` in `state`.
    #[inline]
    pub fn transition(&self, state: StateId, g: Gen) -> Step<StateId, RuleId> {
        let slot = self.slots[state as usize * self.alphabet.len() + g as usize];
        if slot >= 0 {
            Step::State(slot as StateId)
        } else {
            Step::Rule((-(slot + 1)) as RuleId)
        }
    }

    /// Reduce `word` in place. Returns whether any rule applied.
    pub fn reduce(&self, word: &mut Word, flags: ReduceFlags) -> Result<bool, WordError> {
        self.alphabet.check_word(word)?;
        let mut rw = self;
        reduce_with(&mut rw, word, flags, self.max_word_length)
    }

    /// Reduced copy of `word`.
    pub fn reduced(&self, word: &[Gen]) -> Result<Word, WordError> {
        let mut out = word.to_vec();
        self.reduce(&mut out, ReduceFlags::NONE)?;
        Ok(out)
    }

    /// Whether some rule applies to `word`.
    pub fn is_reducible(&self, word: &[Gen]) -> Result<bool, WordError> {
        let mut copy = word.to_vec();
        self.reduce(&mut copy, ReduceFlags::CHECK_ONLY)
    }
}

impl Rewriter for &RewritingSystem {
    type State = StateId;
    type Rule = RuleId;

    fn initial(&self) -> StateId {
        0
    }

    #[inline]
    fn step(&mut self, state: StateId, g: Gen) -> Step<StateId, RuleId> {
        self.transition(state, g)
    }

    fn lhs_len(&self, rule: RuleId) -> usize {
        self.rules[rule as usize].lhs_len as usize
    }

    fn rhs_into(&mut self, rule: RuleId, out: &mut Word) {
        out.clear();
        out.extend_from_slice(self.rule(rule).1);
    }
}

/// Build the dense transition table for the left-hand sides of `rules`.
///
/// Trie nodes are numbered as states in breadth-first order, so a node's
/// failure state always has its row filled in before the node is expanded.
/// A trie node whose failure target is a rule never becomes a state: the
/// slot leading to it fires that rule instead.
fn build_automaton(k: usize, rules: &[(Word, Word)]) -> Result<Vec<i32>, BuildError> {
    let mut children = vec![NO_CHILD; k];
    let mut terminal: Vec<Option<RuleId>> = vec![None];

    for (index, (lhs, _)) in rules.iter().enumerate() {
        let mut node = 0usize;
        let mut shadowed = false;
        for &g in lhs {
            if terminal[node].is_some() {
                shadowed = true;
                break;
            }
            let slot = node * k + g as usize;
            if children[slot] == NO_CHILD {
                children[slot] = terminal.len() as u32;
                terminal.push(None);
                children.extend(std::iter::repeat_n(NO_CHILD, k));
            }
            node = children[slot] as usize;
        }
        if !shadowed && terminal[node].is_none() {
            terminal[node] = Some(index as RuleId);
        }
    }

    let mut order = vec![0usize];
    let mut fail: Vec<StateId> = vec![0];
    let mut slots: Vec<i32> = Vec::with_capacity(order.len() * k);
    let mut next = 0usize;

    while next < order.len() {
        let node = order[next];
        for g in 0..k {
            let fallback = if next == 0 {
                0
            } else {
                slots[fail[next] as usize * k + g]
            };
            let child = children[node * k + g];
            let slot = if child == NO_CHILD {
                fallback
            } else if let Some(rule) = terminal[child as usize] {
                -(rule as i32) - 1
            } else if fallback < 0 {
                fallback
            } else {
                let id = i32::try_from(order.len()).map_err(|_| BuildError::TooManyStates)?;
                order.push(child as usize);
                fail.push(fallback as StateId);
                id
            };
            slots.push(slot);
        }
        next += 1;
    }

    Ok(slots)
}
