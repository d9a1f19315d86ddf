//! Exporting the automaton and the inverse-closure sweep.

use std::fmt::Write as _;

use wordfsa_core::{Colors, DifferenceAutomaton, ReduceFlags, SnapshotTable, Symbol, width_for_count};

use super::{DifferenceTracker, LearnFlags, Proof, StateFlags, StateId, WdFlags, Witness};
use crate::arena::NodeArena;
use crate::error::{EngineError, InternalError};
use crate::trace::Tracer;

/// Rounds of inverse repair per sweep.
const MAX_REPAIR_ROUNDS: usize = 8;

impl DifferenceTracker {
    /// Snapshot of the live states: the identity is state 1, the other
    /// roots follow in creation order.
    pub fn grow_wd(
        &self,
        arena: &NodeArena,
        flags: WdFlags,
    ) -> Result<DifferenceAutomaton, InternalError> {
        let generators = arena.alphabet().len();
        let symbol_count = arena.alphabet().symbol_count();
        self.check_consistency()?;

        let roots: Vec<StateId> = if self.enabled {
            self.roots()
                .into_iter()
                .filter(|&s| {
                    s == StateId::IDENTITY
                        || !flags.contains(WdFlags::PRIMARY_ONLY)
                        || self.state(s).flags.contains(StateFlags::PRIMARY)
                })
                .collect()
        } else {
            vec![StateId::IDENTITY]
        };

        let mut number = vec![0u32; self.states.len()];
        for (i, &s) in roots.iter().enumerate() {
            number[s.index()] = i as u32 + 1;
        }

        let mut cells = vec![0u32; roots.len() * symbol_count];
        if self.enabled {
            for (row, &s) in roots.iter().enumerate() {
                for (&symbol, tr) in &self.state(s).transitions {
                    if flags.contains(WdFlags::KNOWN_ONLY) && !tr.proof.is_rule() {
                        continue;
                    }
                    let target = self.find(tr.target);
                    let n = number[target.index()];
                    if n != 0 {
                        cells[row * symbol_count + symbol as usize] = n;
                    }
                }
            }
        }

        let automaton = DifferenceAutomaton {
            generators,
            state_count: roots.len(),
            words: roots.iter().map(|&s| self.key_word(arena, s)).collect(),
            table: SnapshotTable::Dense(cells),
        };
        Ok(if flags.contains(WdFlags::SPARSE) {
            automaton.to_sparse()
        } else {
            automaton
        })
    }

    /// Structural checks on the union-find and the transition maps.
    pub fn check_consistency(&self) -> Result<(), InternalError> {
        let identity = self.state(StateId::IDENTITY);
        if identity.parent != StateId::IDENTITY || identity.discarded {
            return Err(InternalError::new("differences", "identity is not a live root"));
        }
        if !self.pending.is_empty() {
            return Err(InternalError::new(
                "differences",
                format!("{} merges still pending", self.pending.len()),
            ));
        }
        for (i, state) in self.states.iter().enumerate() {
            let id = StateId::new(i as u32 + 1);
            let is_root = state.parent == id;
            if is_root && !state.discarded && state.key.is_none() {
                return Err(InternalError::new("differences", format!("{id} has no key")));
            }
            if !is_root && !state.transitions.is_empty() {
                return Err(InternalError::new(
                    "differences",
                    format!("merged {id} still owns transitions"),
                ));
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Scan support
    // ─────────────────────────────────────────────────────────────────────

    /// Recompute computed transitions of every live state.
    pub fn recompute_all<T: Tracer>(
        &mut self,
        arena: &mut NodeArena,
        tracer: &mut T,
    ) -> Result<LearnFlags, EngineError> {
        let mut flags = LearnFlags::NONE;
        if !self.enabled {
            return Ok(flags);
        }
        for s in self.roots() {
            if self.find(s) == s && !self.state(s).discarded {
                flags |= self.refresh_state(arena, s, tracer)?;
            }
        }
        Ok(flags)
    }

    /// Step through every live key so that keys which became reducible
    /// show up as stale nodes.
    pub fn validate_keys(&self, arena: &mut NodeArena) -> Result<(), EngineError> {
        for s in self.roots() {
            let Some(key) = self.state(s).key else { continue };
            if arena.is_irreducible(key) {
                let mut word = arena.word(key);
                arena.reduce(&mut word, ReduceFlags::CHECK_ONLY)?;
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Inverses
    // ─────────────────────────────────────────────────────────────────────

    fn witnessed_roots(&self) -> Vec<StateId> {
        self.roots()
            .into_iter()
            .filter(|&s| self.state(s).flags.contains(StateFlags::REDUCTION))
            .collect()
    }

    /// Whether every witnessed state has its inverse state, and every proved
    /// transition `s --(x,y)--> t` is mirrored by `s⁻¹ --(y,x)--> t⁻¹`.
    pub fn is_inverse_complete(&mut self, arena: &mut NodeArena) -> Result<bool, EngineError> {
        Ok(self.first_open_inverse(arena)?.is_none())
    }

    /// First witnessed state that misses its inverse state or the mirror of
    /// one of its proved transitions.
    pub fn first_open_inverse(&mut self, arena: &mut NodeArena) -> Result<Option<StateId>, EngineError> {
        if !self.enabled {
            return Ok(None);
        }
        for s in self.witnessed_roots() {
            if !self.is_state_inverse_complete(arena, s)? {
                return Ok(Some(s));
            }
        }
        Ok(None)
    }

    fn is_state_inverse_complete(
        &mut self,
        arena: &mut NodeArena,
        s: StateId,
    ) -> Result<bool, EngineError> {
        let Some(inverse) = self.find_inverse(arena, s)? else {
            return Ok(false);
        };
        for (symbol, target, _) in self.rule_transitions(s) {
            if !self.is_mirrored(arena, inverse, symbol, target)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn is_mirrored(
        &mut self,
        arena: &mut NodeArena,
        inverse: StateId,
        symbol: Symbol,
        target: StateId,
    ) -> Result<bool, EngineError> {
        let Some(target_inverse) = self.find_inverse(arena, target)? else {
            return Ok(false);
        };
        Ok(self.transition(inverse, swap(arena, symbol)) == Some(target_inverse))
    }

    fn rule_transitions(&self, s: StateId) -> Vec<(Symbol, StateId, Proof)> {
        self.state(self.find(s))
            .transitions
            .iter()
            .filter(|(_, tr)| tr.proof.is_rule())
            .map(|(&symbol, tr)| (symbol, self.find(tr.target), tr.proof))
            .filter(|&(_, t, _)| !self.state(t).discarded)
            .collect()
    }

    /// Existing state of the reduced formal inverse of `s`'s key.
    fn find_inverse(
        &mut self,
        arena: &mut NodeArena,
        s: StateId,
    ) -> Result<Option<StateId>, EngineError> {
        let key = self.require_key(s, "inverse")?;
        if let Some(node) = arena.cached_inverse(key)
            && let Some(inverse) = arena.difference(node)
        {
            let root = self.find(inverse);
            if !self.state(root).discarded {
                return Ok(Some(root));
            }
        }
        let word = arena.alphabet().invert(&arena.word(key))?;
        let reduced = arena.reduced(&word)?;
        let Some(node) = arena.lookup(&reduced) else {
            return Ok(None);
        };
        arena.set_cached_inverse(key, node);
        Ok(self.existing_state(arena, &reduced))
    }

    fn inverse_or_create<T: Tracer>(
        &mut self,
        arena: &mut NodeArena,
        s: StateId,
        tracer: &mut T,
    ) -> Result<StateId, EngineError> {
        if let Some(inverse) = self.find_inverse(arena, s)? {
            return Ok(inverse);
        }
        let key = self.require_key(s, "inverse")?;
        let word = arena.alphabet().invert(&arena.word(key))?;
        let reduced = arena.reduced(&word)?;
        let (inverse, _) = self.state_for_word(arena, &reduced, StateFlags::NONE, tracer)?;
        if let Some(key) = self.key(s)
            && let Some(node) = arena.lookup(&reduced)
        {
            arena.set_cached_inverse(key, node);
        }
        Ok(inverse)
    }

    /// Make the automaton closed under inversion by learning again, sides
    /// swapped, the equation that witnesses each open state and the
    /// equations that proved its unmirrored transitions. Returns the number
    /// of repairs.
    pub fn repair_inverses<T: Tracer>(
        &mut self,
        arena: &mut NodeArena,
        tracer: &mut T,
    ) -> Result<usize, EngineError> {
        if !self.enabled {
            return Ok(0);
        }
        let mut repaired = 0;
        for _ in 0..MAX_REPAIR_ROUNDS {
            let mut round = 0;
            for s in self.witnessed_roots() {
                if self.find(s) != s
                    || self.state(s).discarded
                    || self.is_state_inverse_complete(arena, s)?
                {
                    continue;
                }
                round += 1;
                tracer.trace_inverse_repair(s);

                for witness in self.open_witnesses(arena, s)? {
                    self.relearn_swapped(arena, witness, tracer)?;
                }

                let s = self.find(s);
                if !self.state(s).discarded && !self.is_state_inverse_complete(arena, s)? {
                    self.create_inverse_states(arena, s, tracer)?;
                }
            }
            repaired += round;
            if round == 0 {
                break;
            }
        }
        Ok(repaired)
    }

    /// The best witness of `s`, then the witnesses of its proved transitions
    /// that have no mirror yet.
    fn open_witnesses(&mut self, arena: &mut NodeArena, s: StateId) -> Result<Vec<Witness>, EngineError> {
        let mut out: Vec<Witness> = self.state(s).best.into_iter().collect();
        let inverse = self.find_inverse(arena, s)?;
        for (symbol, target, proof) in self.rule_transitions(s) {
            let Proof::Rule(witness) = proof else { continue };
            let mirrored = match inverse {
                Some(inverse) => self.is_mirrored(arena, inverse, symbol, target)?,
                None => false,
            };
            if !mirrored && !out.contains(&witness) {
                out.push(witness);
            }
        }
        Ok(out)
    }

    /// Walk the witnessing equation right side first. Equations that left
    /// the trie have nothing left to walk.
    fn relearn_swapped<T: Tracer>(
        &mut self,
        arena: &mut NodeArena,
        witness: Witness,
        tracer: &mut T,
    ) -> Result<(), EngineError> {
        let Some(eq) = arena.equation(witness.eq) else {
            return Ok(());
        };
        let primary = eq.is_primary();
        let lhs = arena.word(witness.eq);
        let rhs = arena.rhs_word(witness.eq);
        let witness = Witness {
            eq: witness.eq,
            lhs_len: lhs.len() as u32,
            rhs_len: rhs.len() as u32,
        };
        self.learn_walk(arena, &rhs, &lhs, witness, primary, tracer)?;
        Ok(())
    }

    /// Create the states of the reduced inverses of `s` and of its proved
    /// targets. Their computed transitions close what no walk covered.
    fn create_inverse_states<T: Tracer>(
        &mut self,
        arena: &mut NodeArena,
        s: StateId,
        tracer: &mut T,
    ) -> Result<(), EngineError> {
        self.inverse_or_create(arena, s, tracer)?;
        for (_, target, _) in self.rule_transitions(s) {
            self.inverse_or_create(arena, target, tracer)?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Dump
    // ─────────────────────────────────────────────────────────────────────

    /// One line per live state: key word, flags, then transitions. Proved
    /// transitions use `→`, computed ones `⇢`.
    pub fn dump(&self, arena: &NodeArena, colors: Colors) -> String {
        let c = &colors;
        let alphabet = arena.alphabet();
        let roots = if self.enabled {
            self.roots()
        } else {
            vec![StateId::IDENTITY]
        };
        let w = width_for_count(self.states.len() + 1);
        let mut out = String::new();

        let _ = writeln!(out, "{}[differences]{}", c.blue, c.reset);
        let _ = writeln!(out, "states {}, dirty {}", roots.len(), self.dirty);
        for s in roots {
            let state = self.state(s);
            let word = alphabet.display_word(&self.key_word(arena, s));
            let accept = if s == StateId::IDENTITY { "*" } else { "" };
            let _ = write!(
                out,
                "{}S{:<w$}{} {}[{word}]{}{accept}",
                c.blue,
                s.as_u32(),
                c.reset,
                c.green,
                c.reset
            );
            let _ = write!(out, "{}{}{}", c.dim, flag_letters(state.flags), c.reset);
            for (&symbol, tr) in &state.transitions {
                let target = self.find(tr.target);
                if self.state(target).discarded {
                    continue;
                }
                let arrow = if tr.proof.is_rule() { "→" } else { "⇢" };
                let _ = write!(out, " {}{arrow}{target}", alphabet.display_symbol(symbol));
            }
            out.push('\n');
        }
        out
    }
}

fn swap(arena: &NodeArena, symbol: Symbol) -> Symbol {
    let (x, y) = arena.alphabet().split_symbol(symbol);
    arena.alphabet().symbol(y, x)
}

fn flag_letters(flags: StateFlags) -> String {
    let mut out = String::new();
    for (flag, letter) in [
        (StateFlags::MULTIPLIER, 'm'),
        (StateFlags::REDUCTION, 'r'),
        (StateFlags::HALF, 'h'),
        (StateFlags::PRIMARY, 'p'),
    ] {
        if flags.contains(flag) {
            out.push(letter);
        }
    }
    if out.is_empty() {
        out
    } else {
        format!(" {out}")
    }
}
