//! Learning differences from equations.

use wordfsa_core::{Gen, ReduceFlags, Symbol, Word, WordError};

use super::{DifferenceTracker, LearnFlags, Proof, StateFlags, StateId, Transition, Witness, letters};
use crate::arena::{NodeArena, NodeId};
use crate::error::{EngineError, InternalError};
use crate::trace::Tracer;

impl DifferenceTracker {
    /// Walk equation `eq` and record the differences it proves.
    pub fn learn_equation<T: Tracer>(
        &mut self,
        arena: &mut NodeArena,
        eq: NodeId,
        tracer: &mut T,
    ) -> Result<LearnFlags, EngineError> {
        if !self.enabled || !arena.is_equation(eq) {
            return Ok(LearnFlags::NONE);
        }
        let lhs = arena.word(eq);
        let rhs = arena.rhs_word(eq);
        let primary = arena.equation(eq).is_some_and(|e| e.is_primary());
        let witness = Witness {
            eq,
            lhs_len: lhs.len() as u32,
            rhs_len: rhs.len() as u32,
        };
        let flags = self.learn_walk(arena, &lhs, &rhs, witness, primary, tracer)?;
        arena.mark_learnt(eq);
        Ok(flags)
    }

    /// Walk `lhs = rhs` from both ends: forward from the identity over the
    /// first half of the padded pair, backward from the identity over the
    /// second half. The two walks meet at the same element, so their end
    /// states are merged.
    pub(crate) fn learn_walk<T: Tracer>(
        &mut self,
        arena: &mut NodeArena,
        lhs: &[Gen],
        rhs: &[Gen],
        witness: Witness,
        primary: bool,
        tracer: &mut T,
    ) -> Result<LearnFlags, EngineError> {
        let n = lhs.len().max(rhs.len());
        let mid = n / 2;
        let symbols: Vec<Symbol> = (0..n)
            .map(|i| {
                let (l, r) = letters(lhs, rhs, i);
                arena.alphabet().symbol(l, r)
            })
            .collect();
        let equations_before = self.equations.len();

        let mut flags = LearnFlags::NONE;
        self.offer_witness(StateId::IDENTITY, witness, primary);

        let mut front = StateId::IDENTITY;
        for &symbol in &symbols[..mid] {
            let (next, f) = self.learn_transition(arena, front, symbol, witness, primary, tracer)?;
            flags |= f;
            front = next;
        }

        let mut back = StateId::IDENTITY;
        for &symbol in symbols[mid..].iter().rev() {
            let (prev, f) = self.learn_predecessor(arena, back, symbol, witness, primary, tracer)?;
            flags |= f;
            back = prev;
        }

        if self.merge_states(arena, front, back, tracer)? {
            flags |= LearnFlags::MERGED;
        }
        if self.equations.len() > equations_before {
            flags |= LearnFlags::NEW_EQUATION;
        }
        Ok(flags)
    }

    fn learn_transition<T: Tracer>(
        &mut self,
        arena: &mut NodeArena,
        from: StateId,
        symbol: Symbol,
        witness: Witness,
        primary: bool,
        tracer: &mut T,
    ) -> Result<(StateId, LearnFlags), EngineError> {
        let from = self.find_mut(from);
        let word = self.successor_word(arena, from, symbol)?;
        let (to, created) = self.state_for_word(arena, &word, StateFlags::NONE, tracer)?;
        let mut flags = created_flags(created, primary);
        self.offer_witness(to, witness, primary);
        flags |= self.record(arena, from, symbol, to, Proof::Rule(witness), tracer)?;
        Ok((self.find(to), flags))
    }

    fn learn_predecessor<T: Tracer>(
        &mut self,
        arena: &mut NodeArena,
        to: StateId,
        symbol: Symbol,
        witness: Witness,
        primary: bool,
        tracer: &mut T,
    ) -> Result<(StateId, LearnFlags), EngineError> {
        let to = self.find_mut(to);
        let word = self.predecessor_word(arena, to, symbol)?;
        let (from, created) = self.state_for_word(arena, &word, StateFlags::HALF, tracer)?;
        let mut flags = created_flags(created, primary);
        self.offer_witness(from, witness, primary);
        flags |= self.record(arena, from, symbol, to, Proof::Rule(witness), tracer)?;
        Ok((self.find(from), flags))
    }

    /// Add `from --symbol--> to`. A different existing target is merged
    /// with `to`; the better proof is kept either way.
    pub(crate) fn record<T: Tracer>(
        &mut self,
        arena: &mut NodeArena,
        from: StateId,
        symbol: Symbol,
        to: StateId,
        proof: Proof,
        tracer: &mut T,
    ) -> Result<LearnFlags, EngineError> {
        let (from, to) = (self.find_mut(from), self.find_mut(to));
        let mut flags = LearnFlags::NONE;

        if let Some(existing) = self.proved(from, symbol) {
            if existing.target != to && self.merge_states(arena, existing.target, to, tracer)? {
                flags |= LearnFlags::MERGED;
            }
        }

        let from = self.find(from);
        let target = self.find(to);
        let live = self.proved(from, symbol).is_some();
        let transitions = &mut self.state_mut(from).transitions;
        match transitions.get_mut(&symbol) {
            Some(entry) if live => {
                if proof.is_better_than(&entry.proof) {
                    entry.proof = proof;
                }
            }
            _ => {
                transitions.insert(symbol, Transition { target, proof });
                if proof.is_rule() {
                    tracer.trace_transition_proved(from, symbol, target);
                }
                flags |= LearnFlags::NEW_TRANSITION;
            }
        }
        Ok(flags)
    }

    // ─────────────────────────────────────────────────────────────────────
    // States
    // ─────────────────────────────────────────────────────────────────────

    /// State keyed by the irreducible `word`, created if missing. `flags` are
    /// only applied to a new state.
    pub(crate) fn state_for_word<T: Tracer>(
        &mut self,
        arena: &mut NodeArena,
        word: &[Gen],
        flags: StateFlags,
        tracer: &mut T,
    ) -> Result<(StateId, bool), EngineError> {
        let node = arena.insert(word)?;
        if let Some(s) = arena.difference(node) {
            let root = self.find(s);
            if !self.state(root).discarded {
                return Ok((root, false));
            }
            self.release_key(arena, s);
        }
        Ok((self.create_difference(arena, node, flags, tracer)?, true))
    }

    /// Live state keyed by `word`, without creating one.
    pub(crate) fn existing_state(&self, arena: &NodeArena, word: &[Gen]) -> Option<StateId> {
        let s = arena.lookup(word).and_then(|node| arena.difference(node))?;
        let root = self.find(s);
        (!self.state(root).discarded).then_some(root)
    }

    fn create_difference<T: Tracer>(
        &mut self,
        arena: &mut NodeArena,
        node: NodeId,
        flags: StateFlags,
        tracer: &mut T,
    ) -> Result<StateId, EngineError> {
        let id = StateId::new(self.states.len() as u32 + 1);
        let word = arena.word(node);
        let mut flags = flags;
        if word.len() <= 1 {
            flags |= StateFlags::MULTIPLIER;
        }
        arena.attach(node);
        arena.set_difference(node, Some(id));
        self.states.push(super::DiffState::new(id, node, flags));
        self.dirty += 1;
        tracer.trace_state_created(id, &word);
        self.refresh_state(arena, id, tracer)?;
        Ok(id)
    }

    /// Add computed transitions between `s` and the states that already
    /// exist, in both directions.
    pub fn refresh_state<T: Tracer>(
        &mut self,
        arena: &mut NodeArena,
        s: StateId,
        tracer: &mut T,
    ) -> Result<LearnFlags, EngineError> {
        if !self.enabled {
            return Ok(LearnFlags::NONE);
        }
        let symbols: Vec<Symbol> = arena.alphabet().symbols().collect();
        let mut flags = LearnFlags::NONE;
        for symbol in symbols {
            let s = self.find(s);
            if self.state(s).discarded || self.state(s).key.is_none() {
                break;
            }
            let next = self.successor_word(arena, s, symbol)?;
            if let Some(t) = self.existing_state(arena, &next) {
                flags |= self.record(arena, s, symbol, t, Proof::Computed, tracer)?;
            }
            let s = self.find(s);
            let prev = self.predecessor_word(arena, s, symbol)?;
            if let Some(p) = self.existing_state(arena, &prev) {
                flags |= self.record(arena, p, symbol, s, Proof::Computed, tracer)?;
            }
        }
        Ok(flags)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Difference words
    // ─────────────────────────────────────────────────────────────────────

    /// Reduced `x⁻¹·d·y`, where `d` is the difference of `s` and padding
    /// stands for the identity.
    pub(crate) fn successor_word(
        &self,
        arena: &mut NodeArena,
        s: StateId,
        symbol: Symbol,
    ) -> Result<Word, EngineError> {
        let key = self.require_key(s, "successor_word")?;
        let (x, y) = arena.alphabet().split_symbol(symbol);
        let mut word = match x {
            Some(x) => {
                let half = half_node(arena, key, x)?;
                arena.word(half)
            }
            None => arena.word(key),
        };
        if let Some(y) = y {
            word.push(y);
            arena.reduce(&mut word, ReduceFlags::NONE)?;
        }
        Ok(word)
    }

    /// Reduced `x·d·y⁻¹`: the difference one step before `s`.
    pub(crate) fn predecessor_word(
        &self,
        arena: &mut NodeArena,
        s: StateId,
        symbol: Symbol,
    ) -> Result<Word, EngineError> {
        let key = self.require_key(s, "predecessor_word")?;
        let (x, y) = arena.alphabet().split_symbol(symbol);
        let mut word = Word::with_capacity(arena.node(key).len() + 2);
        word.extend(x);
        word.extend(arena.word(key));
        if let Some(y) = y {
            word.push(invert_letter(arena, y)?);
        }
        arena.reduce(&mut word, ReduceFlags::NONE)?;
        Ok(word)
    }

    pub(super) fn require_key(&self, s: StateId, context: &'static str) -> Result<NodeId, InternalError> {
        self.key(s)
            .ok_or_else(|| InternalError::new(context, format!("{s} has no key")))
    }
}

/// Node of the reduced `x⁻¹·word(key)`, through the half-difference cache.
fn half_node(arena: &mut NodeArena, key: NodeId, x: Gen) -> Result<NodeId, EngineError> {
    if let Some(node) = arena.half_difference(key, x)
        && arena.is_irreducible(node)
    {
        return Ok(node);
    }
    let mut word = Word::with_capacity(arena.node(key).len() + 1);
    word.push(invert_letter(arena, x)?);
    word.extend(arena.word(key));
    arena.reduce(&mut word, ReduceFlags::NONE)?;
    let node = arena.insert(&word)?;
    arena.set_half_difference(key, x, node);
    Ok(node)
}

fn invert_letter(arena: &NodeArena, g: Gen) -> Result<Gen, WordError> {
    arena.alphabet().inverse(g).ok_or(WordError::NotInvertible(g))
}

fn created_flags(created: bool, primary: bool) -> LearnFlags {
    match (created, primary) {
        (false, _) => LearnFlags::NONE,
        (true, false) => LearnFlags::NEW_STATE,
        (true, true) => LearnFlags::NEW_STATE | LearnFlags::NEW_PRIMARY_STATE,
    }
}
