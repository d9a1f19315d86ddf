//! Merging coincident states and moving keys.

use std::cmp::Ordering;

use super::{DifferenceTracker, StateFlags, StateId};
use crate::arena::{NodeArena, NodeId};
use crate::error::EngineError;
use crate::trace::Tracer;

impl DifferenceTracker {
    /// Declare `a` and `b` the same element.
    ///
    /// Conflicting transitions found while combining the two states are
    /// merged in turn, from a queue rather than by recursion. Each merge
    /// emits the pair of key words as an equation. Returns whether anything
    /// was merged.
    pub fn merge_states<T: Tracer>(
        &mut self,
        arena: &mut NodeArena,
        a: StateId,
        b: StateId,
        tracer: &mut T,
    ) -> Result<bool, EngineError> {
        if self.find_mut(a) == self.find_mut(b) {
            return Ok(false);
        }
        self.pending.push_back((a, b));
        let mut merged = false;

        while let Some((a, b)) = self.pending.pop_front() {
            let (a, b) = (self.find_mut(a), self.find_mut(b));
            if a == b || self.state(a).discarded || self.state(b).discarded {
                continue;
            }
            let (survivor, loser) = self.pick_survivor(arena, a, b);
            self.set_parent(loser, survivor);
            merged = true;
            tracer.trace_states_merged(survivor, loser);

            let loser_word = self.state(loser).key.map(|k| arena.word(k)).unwrap_or_default();
            let survivor_word = self.state(survivor).key.map(|k| arena.word(k)).unwrap_or_default();
            if loser_word != survivor_word {
                self.equations.push((loser_word, survivor_word));
            }

            let taken = std::mem::take(&mut self.state_mut(loser).transitions);
            let (flags, best, best_primary) = {
                let l = self.state(loser);
                (l.flags, l.best, l.best_primary)
            };
            {
                let s = self.state_mut(survivor);
                s.flags |= flags;
                if let Some(w) = best
                    && s.best.is_none_or(|b| w.is_better_than(&b))
                {
                    s.best = Some(w);
                }
                if let Some(w) = best_primary
                    && s.best_primary.is_none_or(|b| w.is_better_than(&b))
                {
                    s.best_primary = Some(w);
                }
            }

            for (symbol, tr) in taken {
                let target = self.find_mut(tr.target);
                let existing = self.state(survivor).transitions.get(&symbol).copied();
                match existing {
                    None => {
                        self.state_mut(survivor)
                            .transitions
                            .insert(symbol, super::Transition { target, proof: tr.proof });
                    }
                    Some(existing) => {
                        let other = self.find_mut(existing.target);
                        if other != target {
                            self.pending.push_back((other, target));
                        }
                        if tr.proof.is_better_than(&existing.proof)
                            && let Some(entry) = self.state_mut(survivor).transitions.get_mut(&symbol)
                        {
                            entry.proof = tr.proof;
                        }
                    }
                }
            }
        }
        Ok(merged)
    }

    /// The identity always survives; otherwise the state whose key sorts
    /// first, then the older state.
    fn pick_survivor(&self, arena: &NodeArena, a: StateId, b: StateId) -> (StateId, StateId) {
        if a == StateId::IDENTITY {
            return (a, b);
        }
        if b == StateId::IDENTITY {
            return (b, a);
        }
        let aw = self.state(a).key.map(|k| arena.word(k)).unwrap_or_default();
        let bw = self.state(b).key.map(|k| arena.word(k)).unwrap_or_default();
        match arena.alphabet().compare(&aw, &bw) {
            Ordering::Less => (a, b),
            Ordering::Greater => (b, a),
            Ordering::Equal if a < b => (a, b),
            Ordering::Equal => (b, a),
        }
    }

    /// `node`, the key of `state`, left the trie or became reducible.
    ///
    /// A merged state just lets go of the key. A root moves to the node of
    /// the reduced word, merging with the state already keyed there; a root
    /// with nothing worth keeping is discarded instead.
    pub fn relabel_difference<T: Tracer>(
        &mut self,
        arena: &mut NodeArena,
        node: NodeId,
        state: StateId,
        tracer: &mut T,
    ) -> Result<(), EngineError> {
        if self.state(state).key != Some(node) {
            return Ok(());
        }
        if self.find(state) != state || self.state(state).discarded {
            self.release_key(arena, state);
            return Ok(());
        }

        let word = arena.word(node);
        let reduced = arena.reduced(&word)?;
        let target = arena.insert(&reduced)?;
        if target == node {
            return Ok(());
        }

        let other = arena
            .difference(target)
            .map(|s| self.find(s))
            .filter(|&s| !self.state(s).discarded);
        match other {
            Some(other) => {
                self.merge_states(arena, state, other, tracer)?;
                if self.find(state) == state {
                    self.move_key(arena, state, target, tracer);
                } else {
                    self.release_key(arena, state);
                }
            }
            None if self.is_discardable(state) => {
                self.state_mut(state).discarded = true;
                self.release_key(arena, state);
                tracer.trace_state_discarded(state);
            }
            None => self.move_key(arena, state, target, tracer),
        }
        Ok(())
    }

    fn is_discardable(&self, s: StateId) -> bool {
        let state = self.state(s);
        !state.flags.contains(StateFlags::INITIAL)
            && state.best.is_none()
            && state.transitions.is_empty()
            && state.merged == 0
    }

    /// Re-key `state` to `target`, taking the key from whoever held it.
    fn move_key<T: Tracer>(
        &mut self,
        arena: &mut NodeArena,
        state: StateId,
        target: NodeId,
        tracer: &mut T,
    ) {
        if let Some(holder) = arena.difference(target)
            && holder != state
        {
            self.release_key(arena, holder);
        }
        arena.attach(target);
        arena.set_difference(target, Some(state));
        let old = self.state_mut(state).key.replace(target);
        if let Some(old) = old {
            if arena.difference(old) == Some(state) {
                arena.set_difference(old, None);
            }
            arena.detach(old);
        }

        let word = arena.word(target);
        let s = self.state_mut(state);
        if word.len() <= 1 {
            s.flags |= StateFlags::MULTIPLIER;
        } else {
            s.flags = StateFlags::from_bits(s.flags.bits() & !StateFlags::MULTIPLIER.bits());
        }
        tracer.trace_state_relabelled(state, &word);
    }

    /// Drop the key reference of `s`.
    pub(crate) fn release_key(&mut self, arena: &mut NodeArena, s: StateId) {
        if s == StateId::IDENTITY {
            return;
        }
        let Some(key) = self.state_mut(s).key.take() else {
            return;
        };
        if arena.difference(key) == Some(s) {
            arena.set_difference(key, None);
        }
        arena.detach(key);
    }
}
