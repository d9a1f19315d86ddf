//! Word-difference tracking.
//!
//! For an equation `u = v` in a group, the word difference after `i` letters
//! is `u[..i]⁻¹·v[..i]`. Reading the two words in lock-step one product
//! symbol `(x, y)` at a time moves from difference `d` to `x⁻¹·d·y`; the walk
//! starts and ends at the identity. The tracker keeps one state per
//! difference seen so far, keyed by the reduced word of the difference, and
//! the transitions proved between them.
//!
//! Reduced words are only canonical once the rewriting system is
//! confluent. Until then two states may denote the same element; when the
//! tracker finds out (two targets for one transition, or a key word that
//! reduces onto another state's key) it merges them with a union-find and
//! emits the two key words as a new equation.
//!
//! Monoid presentations have no differences; the tracker is then disabled
//! and every operation is a no-op.

mod learn;
mod merge;
mod snapshot;


use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use wordfsa_core::{Gen, Symbol, Word};

use crate::arena::{NodeArena, NodeId};

/// Difference state handle. State 1 is the identity.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(u32);

impl StateId {
    pub const IDENTITY: StateId = StateId(1);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

macro_rules! flag_set {
    ($(#[$meta:meta])* $name:ident { $($(#[$fmeta:meta])* $flag:ident = $bit:expr;)* }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $name(u8);

        impl $name {
            pub const NONE: Self = Self(0);
            $($(#[$fmeta])* pub const $flag: Self = Self($bit);)*

            #[inline]
            pub fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            #[inline]
            pub fn is_empty(self) -> bool {
                self.0 == 0
            }

            #[inline]
            pub fn bits(self) -> u8 {
                self.0
            }

            #[inline]
            pub const fn from_bits(bits: u8) -> Self {
                Self(bits)
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}

flag_set! {
    /// Properties of a difference state.
    StateFlags {
        /// Key is a single generator or the identity.
        MULTIPLIER = 0x01;
        /// Reached while walking some equation.
        REDUCTION = 0x02;
        /// Created while walking the right half of an equation.
        HALF = 0x04;
        /// Reached while walking a primary equation.
        PRIMARY = 0x08;
        /// The identity.
        INITIAL = 0x10;
    }
}

flag_set! {
    /// What learning an equation changed.
    LearnFlags {
        NEW_STATE = 0x01;
        NEW_PRIMARY_STATE = 0x02;
        NEW_TRANSITION = 0x04;
        MERGED = 0x08;
        /// Merges produced equations, see [`DifferenceTracker::take_equations`].
        NEW_EQUATION = 0x10;
    }
}

flag_set! {
    /// Filters for [`DifferenceTracker::grow_wd`].
    WdFlags {
        /// Only states reached by primary equations.
        PRIMARY_ONLY = 0x01;
        /// Only transitions proved by an equation walk.
        KNOWN_ONLY = 0x02;
        /// Emit a sparse table.
        SPARSE = 0x04;
    }
}

/// The equation whose walk reached a state or proved a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Witness {
    pub eq: NodeId,
    pub lhs_len: u32,
    pub rhs_len: u32,
}

impl Witness {
    /// Shorter total first, then shorter left-hand side, then older node.
    pub fn is_better_than(&self, other: &Witness) -> bool {
        let key = |w: &Witness| (w.lhs_len + w.rhs_len, w.lhs_len, w.eq);
        key(self) < key(other)
    }
}

/// Why a transition exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proof {
    /// Proved by walking an equation; the best witness is kept.
    Rule(Witness),
    /// Computed by reducing `x⁻¹·d·y`.
    Computed,
}

impl Proof {
    pub fn is_better_than(&self, other: &Proof) -> bool {
        match (self, other) {
            (Proof::Rule(a), Proof::Rule(b)) => a.is_better_than(b),
            (Proof::Rule(_), Proof::Computed) => true,
            (Proof::Computed, _) => false,
        }
    }

    pub fn is_rule(&self) -> bool {
        matches!(self, Proof::Rule(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub target: StateId,
    pub proof: Proof,
}

#[derive(Debug, Clone)]
struct DiffState {
    /// Holds a reference while set.
    key: Option<NodeId>,
    parent: StateId,
    /// States whose parent link points here.
    merged: u32,
    flags: StateFlags,
    best: Option<Witness>,
    best_primary: Option<Witness>,
    transitions: BTreeMap<Symbol, Transition>,
    discarded: bool,
}

impl DiffState {
    fn new(id: StateId, key: NodeId, flags: StateFlags) -> Self {
        Self {
            key: Some(key),
            parent: id,
            merged: 0,
            flags,
            best: None,
            best_primary: None,
            transitions: BTreeMap::new(),
            discarded: false,
        }
    }
}

/// The difference states and their transitions.
#[derive(Debug)]
pub struct DifferenceTracker {
    enabled: bool,
    states: Vec<DiffState>,
    pending: VecDeque<(StateId, StateId)>,
    equations: Vec<(Word, Word)>,
    dirty: usize,
}

impl DifferenceTracker {
    /// Tracker with the identity state keyed by the trie root. Disabled
    /// unless `enabled` and the alphabet is a group alphabet.
    pub fn new(arena: &mut NodeArena, enabled: bool) -> Self {
        let enabled = enabled && arena.alphabet().is_group();
        let identity = StateId::IDENTITY;
        arena.attach(NodeId::ROOT);
        arena.set_difference(NodeId::ROOT, Some(identity));
        let flags = StateFlags::INITIAL | StateFlags::MULTIPLIER;
        Self {
            enabled,
            states: vec![DiffState::new(identity, NodeId::ROOT, flags)],
            pending: VecDeque::new(),
            equations: Vec::new(),
            dirty: 0,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// States created since the last [`DifferenceTracker::clear_dirty`].
    pub fn dirty(&self) -> usize {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = 0;
    }

    /// Live states: union-find roots that were not discarded.
    pub fn state_count(&self) -> usize {
        self.roots().len()
    }

    /// Every state ever created, merged and discarded ones included.
    pub fn capacity(&self) -> usize {
        self.states.len()
    }

    pub(crate) fn roots(&self) -> Vec<StateId> {
        (1..=self.states.len() as u32)
            .map(StateId::new)
            .filter(|&s| self.find(s) == s && !self.state(s).discarded)
            .collect()
    }

    #[inline]
    fn state(&self, s: StateId) -> &DiffState {
        &self.states[s.index()]
    }

    #[inline]
    fn state_mut(&mut self, s: StateId) -> &mut DiffState {
        &mut self.states[s.index()]
    }

    /// Union-find root of `s`.
    pub fn find(&self, s: StateId) -> StateId {
        let mut at = s;
        while self.state(at).parent != at {
            at = self.state(at).parent;
        }
        at
    }

    /// Union-find root of `s`, pointing every state on the way straight at
    /// the root.
    pub(crate) fn find_mut(&mut self, s: StateId) -> StateId {
        let root = self.find(s);
        let mut at = s;
        while at != root {
            let next = self.state(at).parent;
            self.set_parent(at, root);
            at = next;
        }
        root
    }

    fn set_parent(&mut self, s: StateId, parent: StateId) {
        let old = self.state(s).parent;
        if old == parent {
            return;
        }
        if old != s {
            self.state_mut(old).merged -= 1;
        }
        self.state_mut(s).parent = parent;
        if parent != s {
            self.state_mut(parent).merged += 1;
        }
    }

    pub fn flags(&self, s: StateId) -> StateFlags {
        self.state(self.find(s)).flags
    }

    pub fn key(&self, s: StateId) -> Option<NodeId> {
        self.state(self.find(s)).key
    }

    pub fn key_word(&self, arena: &NodeArena, s: StateId) -> Word {
        self.key(s).map(|k| arena.word(k)).unwrap_or_default()
    }

    pub fn best_witness(&self, s: StateId) -> Option<Witness> {
        self.state(self.find(s)).best
    }

    pub fn best_primary_witness(&self, s: StateId) -> Option<Witness> {
        self.state(self.find(s)).best_primary
    }

    fn is_live(&self, s: StateId) -> bool {
        !self.state(self.find(s)).discarded
    }

    /// Target of `s` on `symbol`, resolved to a live root.
    pub fn transition(&self, s: StateId, symbol: Symbol) -> Option<StateId> {
        self.proved(s, symbol).map(|t| t.target)
    }

    /// Transition of `s` on `symbol` with its proof, resolved to a live root.
    pub fn proved(&self, s: StateId, symbol: Symbol) -> Option<Transition> {
        let tr = self.state(self.find(s)).transitions.get(&symbol)?;
        let target = self.find(tr.target);
        self.is_live(target).then_some(Transition {
            target,
            proof: tr.proof,
        })
    }

    /// Run a padded word pair from the identity.
    pub fn run(&self, symbols: impl IntoIterator<Item = Symbol>) -> Option<StateId> {
        symbols
            .into_iter()
            .try_fold(StateId::IDENTITY, |s, symbol| self.transition(s, symbol))
    }

    /// Equations produced by merges since the last call.
    pub fn take_equations(&mut self) -> Vec<(Word, Word)> {
        std::mem::take(&mut self.equations)
    }

    fn offer_witness(&mut self, s: StateId, witness: Witness, primary: bool) {
        let s = self.find(s);
        let state = self.state_mut(s);
        state.flags |= StateFlags::REDUCTION;
        if state.best.is_none_or(|b| witness.is_better_than(&b)) {
            state.best = Some(witness);
        }
        if primary {
            state.flags |= StateFlags::PRIMARY;
            if state.best_primary.is_none_or(|b| witness.is_better_than(&b)) {
                state.best_primary = Some(witness);
            }
        }
    }
}

/// Product symbol letters, shared by the walks.
pub(crate) fn letters(lhs: &[Gen], rhs: &[Gen], i: usize) -> (Option<Gen>, Option<Gen>) {
    (lhs.get(i).copied(), rhs.get(i).copied())
}
