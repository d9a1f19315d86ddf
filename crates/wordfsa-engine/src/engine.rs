//! The completion driver.
//!
//! Completion alternates two phases. [`Engine::expand_machine`] inserts
//! pending pairs and adopts queued equations, turning overlaps into new
//! pairs; it runs a bounded number of work items per call so callers can
//! interleave other work and cancel between calls.
//! [`Engine::scan_all_differences`] is the housekeeping pass: interreduction,
//! difference-state recomputation, leaf pruning and the inverse sweep.

use std::collections::VecDeque;
use std::fmt::Write as _;

use wordfsa_core::{
    Alphabet, Colors, DifferenceAutomaton, Gen, Presentation, ReduceFlags, SerializedSystem, Word,
    check_length,
};
use wordfsa_rws::RewritingSystem;

use crate::arena::{NodeArena, NodeId, Stage};
use crate::differences::{DifferenceTracker, StateId, WdFlags};
use crate::error::{EngineError, InternalError};
use crate::limits::{CancelToken, EngineOptions, Limits};
use crate::overlap::{critical_pair, overlap_length, overlaps};
use crate::queue::{EquationQueue, QueueKind};
use crate::trace::{Derivation, NoopTracer, Tracer};

/// Outcome of one [`Engine::expand_machine`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// The step budget ran out with work left.
    Working,
    /// Nothing pending and nothing queued.
    Complete,
    /// The cancel token was set.
    Cancelled,
}

/// Counters describing the current run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Equations in the trie.
    pub equations: usize,
    /// Equations adopted so far, re-adoptions included.
    pub adopted: usize,
    pub queued: usize,
    pub pending: usize,
    pub deferred: usize,
    pub overlaps: usize,
    pub nodes: usize,
    pub free_nodes: usize,
    /// Live difference states.
    pub states: usize,
}

#[derive(Debug)]
struct PendingPair {
    lhs: Word,
    rhs: Word,
    derivation: Option<Derivation>,
}

/// An overlap put aside because its word was too long.
#[derive(Debug, Clone)]
struct DeferredOverlap {
    left: (Word, Word),
    right: (Word, Word),
    overlap: usize,
}

impl DeferredOverlap {
    fn length(&self) -> usize {
        overlap_length(&self.left.0, &self.right.0, self.overlap)
    }
}

/// Incremental Knuth–Bendix completion over one presentation.
#[derive(Debug)]
pub struct Engine {
    arena: NodeArena,
    tracker: DifferenceTracker,
    adopt: EquationQueue,
    /// Equations whose right-hand node left the trie.
    revisit: EquationQueue,
    /// Adopted equations; each entry holds a node reference.
    adopted: Vec<NodeId>,
    pending: VecDeque<PendingPair>,
    deferred: Vec<DeferredOverlap>,
    limits: Limits,
    options: EngineOptions,
    cancel: Option<CancelToken>,
    confluent: bool,
    adopted_total: usize,
    overlap_total: usize,
}

impl Engine {
    /// Engine for a parsed presentation record.
    pub fn new(
        presentation: &Presentation,
        limits: Limits,
        options: EngineOptions,
    ) -> Result<Self, EngineError> {
        let alphabet = presentation.alphabet()?;
        let relations = presentation.word_pairs(&alphabet)?;
        Self::from_relations(alphabet, &relations, limits, options)
    }

    /// Engine seeded with `g·g⁻¹ = ε` for every invertible generator, then
    /// `relations`.
    pub fn from_relations(
        alphabet: Alphabet,
        relations: &[(Word, Word)],
        limits: Limits,
        options: EngineOptions,
    ) -> Result<Self, EngineError> {
        let axioms: Vec<(Word, Word)> = alphabet
            .generators()
            .filter_map(|g| alphabet.inverse(g).map(|ig| (vec![g, ig], Word::new())))
            .collect();

        let mut arena = NodeArena::new(alphabet, options.transition_table, limits.max_word_length);
        let tracker = DifferenceTracker::new(&mut arena, options.track_differences);
        let adopt = EquationQueue::new(QueueKind::Adopt);
        let revisit = EquationQueue::new(QueueKind::Revisit);
        let mut engine = Self {
            arena,
            tracker,
            adopt,
            revisit,
            adopted: Vec::new(),
            pending: VecDeque::new(),
            deferred: Vec::new(),
            limits,
            options,
            cancel: None,
            confluent: false,
            adopted_total: 0,
            overlap_total: 0,
        };

        let tracer = &mut NoopTracer;
        for (lhs, rhs) in axioms.iter().chain(relations) {
            engine.insert_pair(lhs, rhs, None, tracer)?;
        }
        engine.maintain(tracer)?;
        engine
            .tracker
            .refresh_state(&mut engine.arena, StateId::IDENTITY, tracer)?;
        engine.maintain(tracer)?;
        Ok(engine)
    }

    /// Poll `token` at the top of every step.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn set_cancel_token(&mut self, token: Option<CancelToken>) {
        self.cancel = token;
    }

    /// Replace the limits. Deferred overlaps that now fit are retried on
    /// the next scan.
    pub fn set_limits(&mut self, limits: Limits) {
        self.arena.set_max_word_length(limits.max_word_length);
        self.limits = limits;
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn alphabet(&self) -> &Alphabet {
        self.arena.alphabet()
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn tracker(&self) -> &DifferenceTracker {
        &self.tracker
    }

    /// Whether the last [`Engine::complete`] finished with nothing deferred.
    pub fn is_confluent(&self) -> bool {
        self.confluent
    }

    pub fn stats(&self) -> Stats {
        Stats {
            equations: self.arena.equation_count(),
            adopted: self.adopted_total,
            queued: self.adopt.len(),
            pending: self.pending.len(),
            deferred: self.deferred.len(),
            overlaps: self.overlap_total,
            nodes: self.arena.live_count(),
            free_nodes: self.arena.free_count(),
            states: self.tracker.state_count(),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Equations
    // ─────────────────────────────────────────────────────────────────────

    /// Insert `lhs = rhs`. Both sides are reduced and the pair is oriented
    /// by the word order; a pair that reduces to a trivial one is dropped
    /// and `None` returned.
    pub fn add_equation(&mut self, lhs: &[Gen], rhs: &[Gen]) -> Result<Option<NodeId>, EngineError> {
        self.add_equation_with(lhs, rhs, &mut NoopTracer)
    }

    pub fn add_equation_with<T: Tracer>(
        &mut self,
        lhs: &[Gen],
        rhs: &[Gen],
        tracer: &mut T,
    ) -> Result<Option<NodeId>, EngineError> {
        self.confluent = false;
        let eq = self.insert_pair(lhs, rhs, None, tracer)?;
        self.maintain(tracer)?;
        Ok(eq.filter(|&eq| self.arena.is_equation(eq)))
    }

    fn insert_pair<T: Tracer>(
        &mut self,
        lhs: &[Gen],
        rhs: &[Gen],
        derivation: Option<Derivation>,
        tracer: &mut T,
    ) -> Result<Option<NodeId>, EngineError> {
        let max = self.arena.max_word_length();
        for side in [lhs, rhs] {
            self.arena.alphabet().check_word(side)?;
            check_length(side.len(), max)?;
        }

        let mut lhs = lhs.to_vec();
        let mut rhs = rhs.to_vec();
        self.arena.reduce(&mut lhs, ReduceFlags::NONE)?;
        self.arena.reduce(&mut rhs, ReduceFlags::NONE)?;
        if lhs == rhs {
            return Ok(None);
        }
        if self.arena.alphabet().order().less(&lhs, &rhs) {
            std::mem::swap(&mut lhs, &mut rhs);
        }

        let rhs_node = self.arena.insert(&rhs)?;
        let (last, prefix) = crate::invariants::ensure_oriented_lhs(&lhs);
        let prefix_node = self.arena.insert(prefix)?;
        let eq = self.arena.make_equation(prefix_node, last, rhs_node, true)?;
        if self.arena.equation(eq).is_some_and(|e| e.stage() == Stage::New) {
            self.arena.set_stage(eq, Stage::Queued);
            self.adopt.push_back(&mut self.arena, eq);
        }

        tracer.trace_equation_created(eq, &lhs, &rhs);
        if let Some(derivation) = derivation {
            tracer.trace_derivation(eq, &derivation);
        }

        let limit = self.limits.max_equations;
        if self.arena.equation_count() > limit {
            return Err(EngineError::LimitExceeded {
                what: "equations",
                limit,
            });
        }
        Ok(Some(eq))
    }

    /// Every equation in the trie as `(lhs, rhs)`, secondary ones included.
    pub fn equations(&mut self) -> Vec<(Word, Word)> {
        let ids: Vec<NodeId> = self.arena.equations().collect();
        ids.into_iter()
            .map(|eq| (self.arena.word(eq), self.arena.rhs_word(eq)))
            .collect()
    }

    /// Reduce `word` with the live rules.
    pub fn reduce(&mut self, word: &[Gen]) -> Result<Word, EngineError> {
        Ok(self.arena.reduced(word)?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Maintenance
    // ─────────────────────────────────────────────────────────────────────

    /// Drain the arena's outboxes until it is quiet.
    fn maintain<T: Tracer>(&mut self, tracer: &mut T) -> Result<(), EngineError> {
        loop {
            self.check_fault()?;
            if !self.arena.has_notices() && self.revisit.is_empty() {
                return Ok(());
            }

            for node in self.arena.take_stale() {
                if self.arena.is_irreducible(node) {
                    self.arena.remove(node);
                }
            }
            for (node, state) in self.arena.take_relabels() {
                self.tracker
                    .relabel_difference(&mut self.arena, node, state, tracer)?;
            }
            for (lhs, rhs) in self.arena.take_pairs() {
                self.pending.push_back(PendingPair { lhs, rhs, derivation: None });
            }
            for (lhs, rhs) in self.tracker.take_equations() {
                self.pending.push_back(PendingPair { lhs, rhs, derivation: None });
            }
            for eq in self.arena.take_orphans() {
                if self.arena.is_equation(eq) && !self.revisit.push_back(&mut self.arena, eq) {
                    self.resolve_rhs(eq)?;
                }
            }
            while let Some(eq) = self.revisit.pop_front(&mut self.arena) {
                self.resolve_rhs(eq)?;
            }
        }
    }

    /// Point `eq` at the node of its reduced right-hand side.
    fn resolve_rhs(&mut self, eq: NodeId) -> Result<(), EngineError> {
        if !self.arena.is_equation(eq) {
            return Ok(());
        }
        let rhs = self.arena.rhs_word(eq);
        let reduced = self.arena.reduced(&rhs)?;
        let node = self.arena.insert(&reduced)?;
        self.arena.set_rhs(eq, node);
        Ok(())
    }

    fn check_fault(&mut self) -> Result<(), EngineError> {
        match self.arena.take_fault() {
            Some(fault) => Err(fault.into()),
            None => Ok(()),
        }
    }

    /// Forget adopted entries that left the trie.
    fn prune_adopted(&mut self) {
        let entries = std::mem::take(&mut self.adopted);
        for eq in entries {
            if self.arena.is_equation(eq) {
                self.adopted.push(eq);
            } else {
                self.arena.detach(eq);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expansion
    // ─────────────────────────────────────────────────────────────────────

    /// Run up to the step budget of work items.
    pub fn expand_machine(&mut self) -> Result<Progress, EngineError> {
        self.expand_machine_with(&mut NoopTracer)
    }

    pub fn expand_machine_with<T: Tracer>(&mut self, tracer: &mut T) -> Result<Progress, EngineError> {
        let mut budget = self.limits.step_budget;
        while budget > 0 {
            if self.is_cancelled() {
                return Ok(Progress::Cancelled);
            }
            self.maintain(tracer)?;

            if let Some(pair) = self.pending.pop_front() {
                self.insert_pair(&pair.lhs, &pair.rhs, pair.derivation, tracer)?;
                budget -= 1;
                continue;
            }

            match self.adopt.pop_front(&mut self.arena) {
                Some(eq) if self.arena.is_equation(eq) => {
                    self.adopt_equation(eq, tracer)?;
                    budget -= 1;
                }
                Some(_) => {}
                None => {
                    self.maintain(tracer)?;
                    if self.pending.is_empty() && self.adopt.is_empty() {
                        return Ok(Progress::Complete);
                    }
                }
            }
        }
        self.maintain(tracer)?;
        Ok(Progress::Working)
    }

    /// Learn `eq` and queue the critical pairs of its overlaps with every
    /// adopted equation, itself included.
    fn adopt_equation<T: Tracer>(&mut self, eq: NodeId, tracer: &mut T) -> Result<(), EngineError> {
        self.arena.set_stage(eq, Stage::Adopted);
        tracer.trace_equation_adopted(eq);
        self.prune_adopted();
        self.arena.attach(eq);
        self.adopted.push(eq);
        self.adopted_total += 1;

        self.tracker.learn_equation(&mut self.arena, eq, tracer)?;
        self.maintain(tracer)?;
        if !self.arena.is_equation(eq) {
            return Ok(());
        }

        let this = (self.arena.word(eq), self.arena.rhs_word(eq));
        let partners = self.adopted.clone();
        for other in partners {
            if !self.arena.is_equation(other) {
                continue;
            }
            let that = (self.arena.word(other), self.arena.rhs_word(other));
            self.collect_overlaps((eq, &this), (other, &that), tracer);
            if other != eq {
                self.collect_overlaps((other, &that), (eq, &this), tracer);
            }
        }
        Ok(())
    }

    fn collect_overlaps<T: Tracer>(
        &mut self,
        (left_id, left): (NodeId, &(Word, Word)),
        (right_id, right): (NodeId, &(Word, Word)),
        tracer: &mut T,
    ) {
        for m in overlaps(&left.0, &right.0) {
            let length = overlap_length(&left.0, &right.0, m);
            if length > self.limits.max_overlap_length {
                tracer.trace_overlap_deferred(left_id, right_id, length);
                self.deferred.push(DeferredOverlap {
                    left: left.clone(),
                    right: right.clone(),
                    overlap: m,
                });
                continue;
            }
            self.overlap_total += 1;
            let (lhs, rhs) = critical_pair((&left.0, &left.1), (&right.0, &right.1), m);
            let derivation = tracer.wants_derivations().then_some(Derivation {
                left: left_id,
                right: right_id,
                overlap: m,
            });
            self.pending.push_back(PendingPair { lhs, rhs, derivation });
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Scan
    // ─────────────────────────────────────────────────────────────────────

    /// Housekeeping pass. Returns whether it queued new work.
    pub fn scan_all_differences(&mut self) -> Result<bool, EngineError> {
        self.scan_all_differences_with(&mut NoopTracer)
    }

    pub fn scan_all_differences_with<T: Tracer>(&mut self, tracer: &mut T) -> Result<bool, EngineError> {
        self.maintain(tracer)?;

        let mut removed = 0;
        let ids: Vec<NodeId> = self.arena.equations().collect();
        for eq in ids {
            if !self.arena.is_equation(eq) || self.arena.is_minimal(eq) {
                continue;
            }
            if self.options.keep_secondary {
                self.arena.demote(eq);
            } else {
                let lhs = self.arena.word(eq);
                let rhs = self.arena.rhs_word(eq);
                tracer.trace_equation_removed(eq, &lhs, &rhs);
                self.arena.remove(eq);
                removed += 1;
            }
        }
        self.maintain(tracer)?;

        let ids: Vec<NodeId> = self.arena.equations().collect();
        for eq in ids {
            let rhs = self.arena.rhs_word(eq);
            if self.arena.is_equation(eq) && self.arena.is_reducible(&rhs)? {
                self.resolve_rhs(eq)?;
            }
        }
        self.maintain(tracer)?;

        self.tracker.validate_keys(&mut self.arena)?;
        self.maintain(tracer)?;
        self.tracker.recompute_all(&mut self.arena, tracer)?;
        self.maintain(tracer)?;

        self.prune_adopted();
        self.prune_leaves();

        self.tracker.repair_inverses(&mut self.arena, tracer)?;
        self.maintain(tracer)?;

        let max = self.limits.max_overlap_length;
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.deferred)
            .into_iter()
            .partition(|d| d.length() <= max);
        self.deferred = waiting;
        for d in ready {
            self.overlap_total += 1;
            let left = (d.left.0.as_slice(), d.left.1.as_slice());
            let right = (d.right.0.as_slice(), d.right.1.as_slice());
            let (lhs, rhs) = critical_pair(left, right, d.overlap);
            self.pending.push_back(PendingPair { lhs, rhs, derivation: None });
        }

        let more = !self.pending.is_empty() || !self.adopt.is_empty();
        if !more
            && self.deferred.is_empty()
            && let Some(s) = self.tracker.first_open_inverse(&mut self.arena)?
        {
            return Err(InternalError::new(
                "inverse_sweep",
                format!("{s} is still not closed under inversion"),
            )
            .into());
        }

        self.tracker.clear_dirty();
        tracer.trace_scan_finished(removed, self.tracker.state_count());
        Ok(more)
    }

    /// Free irreducible leaves nothing refers to, repeating while parents
    /// become leaves in turn.
    fn prune_leaves(&mut self) {
        loop {
            let ids: Vec<NodeId> = self.arena.irreducibles().collect();
            let pruned = ids.into_iter().filter(|&id| self.arena.prune_leaf(id)).count();
            if pruned == 0 {
                break;
            }
        }
    }

    /// Alternate expansion and scans until nothing is left to do.
    pub fn complete(&mut self) -> Result<(), EngineError> {
        self.complete_with(&mut NoopTracer)
    }

    pub fn complete_with<T: Tracer>(&mut self, tracer: &mut T) -> Result<(), EngineError> {
        self.confluent = false;
        loop {
            match self.expand_machine_with(tracer)? {
                Progress::Cancelled => return Err(EngineError::Cancelled),
                Progress::Working => continue,
                Progress::Complete => {}
            }
            if !self.scan_all_differences_with(tracer)? {
                break;
            }
        }
        self.confluent = self.deferred.is_empty();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────────────────────────────────

    /// Minimal equations with fully reduced right-hand sides.
    fn minimal_rules(&mut self) -> Result<Vec<(Word, Word)>, EngineError> {
        loop {
            self.maintain(&mut NoopTracer)?;
            let ids: Vec<NodeId> = self.arena.equations().collect();
            let mut rules = Vec::with_capacity(ids.len());
            for eq in ids {
                if !self.arena.is_minimal(eq) {
                    continue;
                }
                let lhs = self.arena.word(eq);
                let rhs = self.arena.rhs_word(eq);
                let rhs = self.arena.reduced(&rhs)?;
                rules.push((lhs, rhs));
            }
            if !self.arena.has_notices() {
                return Ok(rules);
            }
        }
    }

    /// Freeze the minimal rules into a [`RewritingSystem`].
    pub fn compile(&mut self) -> Result<RewritingSystem, EngineError> {
        self.compile_with(&mut NoopTracer)
    }

    pub fn compile_with<T: Tracer>(&mut self, tracer: &mut T) -> Result<RewritingSystem, EngineError> {
        let rules = self.minimal_rules()?;
        let compiled = RewritingSystem::from_rules(self.alphabet().clone(), &rules, self.confluent)?
            .with_max_word_length(self.limits.max_word_length);

        if self.confluent {
            for (lhs, _) in &rules {
                let live = self.arena.reduced(lhs)?;
                let frozen = compiled.reduced(lhs)?;
                if live != frozen {
                    let alphabet = self.alphabet();
                    return Err(InternalError::new(
                        "compile",
                        format!(
                            "`{}` reduces to `{}` live but `{}` compiled",
                            alphabet.display_word(lhs),
                            alphabet.display_word(&live),
                            alphabet.display_word(&frozen)
                        ),
                    )
                    .into());
                }
            }
        }

        tracer.trace_compiled(compiled.state_count(), compiled.rule_count());
        Ok(compiled)
    }

    /// The serialized record of the minimal rules.
    pub fn to_serialized(&mut self) -> Result<SerializedSystem, EngineError> {
        let rules = self.minimal_rules()?;
        Ok(SerializedSystem::from_parts(
            self.arena.alphabet(),
            rules.iter().map(|(l, r)| (l.as_slice(), r.as_slice())),
            self.confluent,
        ))
    }

    /// Snapshot of the word-difference automaton.
    pub fn grow_wd(&mut self, flags: WdFlags) -> Result<DifferenceAutomaton, EngineError> {
        self.maintain(&mut NoopTracer)?;
        Ok(self.tracker.grow_wd(&self.arena, flags)?)
    }

    pub fn is_inverse_complete(&mut self) -> Result<bool, EngineError> {
        self.maintain(&mut NoopTracer)?;
        self.tracker.is_inverse_complete(&mut self.arena)
    }

    /// Arena, differences and queue counters.
    pub fn dump(&self, colors: Colors) -> String {
        let mut out = self.arena.dump(colors);
        out.push('\n');
        out.push_str(&self.tracker.dump(&self.arena, colors));
        let _ = writeln!(out, "\n{}[queues]{}", colors.blue, colors.reset);
        let _ = writeln!(
            out,
            "adopt {}, pending {}, deferred {}",
            self.adopt.len(),
            self.pending.len(),
            self.deferred.len()
        );
        out
    }
}
