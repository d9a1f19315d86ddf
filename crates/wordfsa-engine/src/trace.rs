//! Tracing infrastructure for completion runs.
//!
//! # Design: Zero-Cost Abstraction
//!
//! The tracer is a zero-cost abstraction. When [`NoopTracer`] is used every
//! trait method is an `#[inline(always)]` empty function, so the calls and
//! the work that builds their arguments are compiled away.
//!
//! # Design: Tracer-Owned State
//!
//! Diagnostic provenance ([`Derivation`]: which two rules and which overlap
//! produced an equation) is handed to the tracer and never stored in the
//! arena or the tracker. It is only built when the tracer asks for it.

use wordfsa_core::{Alphabet, Colors, Gen, Symbol};

use crate::arena::NodeId;
use crate::differences::StateId;

/// Verbosity level for trace output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Default: equations created and removed, merges, deferrals.
    #[default]
    Default,
    /// Verbose (-v): adoptions, difference states, scans.
    Verbose,
    /// Very verbose (-vv): every proved transition and derivation.
    VeryVerbose,
}

/// How a critical pair came about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Derivation {
    /// Rule whose left-hand side ends with the overlap.
    pub left: NodeId,
    /// Rule whose left-hand side starts with the overlap.
    pub right: NodeId,
    /// Number of overlapping letters.
    pub overlap: usize,
}

/// Tracer trait for completion instrumentation.
///
/// All methods receive raw data (ids, words) the engine already has.
/// Formatting and name resolution happen in the tracer implementation.
pub trait Tracer {
    /// A new equation entered the trie.
    fn trace_equation_created(&mut self, eq: NodeId, lhs: &[Gen], rhs: &[Gen]);

    /// A queued equation was adopted and its overlaps computed.
    fn trace_equation_adopted(&mut self, eq: NodeId);

    /// An equation left the trie; its pair was re-queued for reduction.
    fn trace_equation_removed(&mut self, eq: NodeId, lhs: &[Gen], rhs: &[Gen]);

    /// Whether [`Tracer::trace_derivation`] records anything. The engine
    /// only builds provenance for tracers that do.
    fn wants_derivations(&self) -> bool;

    /// Provenance of the equation just created.
    fn trace_derivation(&mut self, eq: NodeId, derivation: &Derivation);

    /// An overlap was longer than the configured bound.
    fn trace_overlap_deferred(&mut self, left: NodeId, right: NodeId, length: usize);

    fn trace_state_created(&mut self, state: StateId, word: &[Gen]);

    /// Two states were found to be the same group element.
    fn trace_states_merged(&mut self, survivor: StateId, loser: StateId);

    /// A state's key word became reducible and moved to `word`.
    fn trace_state_relabelled(&mut self, state: StateId, word: &[Gen]);

    fn trace_state_discarded(&mut self, state: StateId);

    /// A transition was proved by walking an equation.
    fn trace_transition_proved(&mut self, from: StateId, symbol: Symbol, to: StateId);

    /// The inverse sweep had to re-learn an equation.
    fn trace_inverse_repair(&mut self, state: StateId);

    /// A full scan finished.
    fn trace_scan_finished(&mut self, removed: usize, states: usize);

    fn trace_compiled(&mut self, states: usize, rules: usize);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_equation_created(&mut self, _eq: NodeId, _lhs: &[Gen], _rhs: &[Gen]) {}

    #[inline(always)]
    fn trace_equation_adopted(&mut self, _eq: NodeId) {}

    #[inline(always)]
    fn trace_equation_removed(&mut self, _eq: NodeId, _lhs: &[Gen], _rhs: &[Gen]) {}

    #[inline(always)]
    fn wants_derivations(&self) -> bool {
        false
    }

    #[inline(always)]
    fn trace_derivation(&mut self, _eq: NodeId, _derivation: &Derivation) {}

    #[inline(always)]
    fn trace_overlap_deferred(&mut self, _left: NodeId, _right: NodeId, _length: usize) {}

    #[inline(always)]
    fn trace_state_created(&mut self, _state: StateId, _word: &[Gen]) {}

    #[inline(always)]
    fn trace_states_merged(&mut self, _survivor: StateId, _loser: StateId) {}

    #[inline(always)]
    fn trace_state_relabelled(&mut self, _state: StateId, _word: &[Gen]) {}

    #[inline(always)]
    fn trace_state_discarded(&mut self, _state: StateId) {}

    #[inline(always)]
    fn trace_transition_proved(&mut self, _from: StateId, _symbol: Symbol, _to: StateId) {}

    #[inline(always)]
    fn trace_inverse_repair(&mut self, _state: StateId) {}

    #[inline(always)]
    fn trace_scan_finished(&mut self, _removed: usize, _states: usize) {}

    #[inline(always)]
    fn trace_compiled(&mut self, _states: usize, _rules: usize) {}
}

/// Tracer that collects a readable log of the run.
pub struct PrintTracer {
    alphabet: Alphabet,
    verbosity: Verbosity,
    lines: Vec<String>,
    colors: Colors,
}

impl PrintTracer {
    pub fn new(alphabet: &Alphabet, verbosity: Verbosity, colors: Colors) -> Self {
        Self {
            alphabet: alphabet.clone(),
            verbosity,
            lines: Vec::new(),
            colors,
        }
    }

    /// Collected lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Print all trace lines to stderr.
    pub fn print(&self) {
        for line in &self.lines {
            eprintln!("{line}");
        }
    }

    fn verbose(&self) -> bool {
        self.verbosity != Verbosity::Default
    }

    fn very_verbose(&self) -> bool {
        self.verbosity == Verbosity::VeryVerbose
    }

    fn word(&self, word: &[Gen]) -> String {
        let c = &self.colors;
        format!("{}{}{}", c.green, self.alphabet.display_word(word), c.reset)
    }

    fn push(&mut self, symbol: &str, content: String) {
        self.lines.push(format!("  {symbol} {content}"));
    }
}

impl Tracer for PrintTracer {
    fn trace_equation_created(&mut self, eq: NodeId, lhs: &[Gen], rhs: &[Gen]) {
        let content = format!("{eq} {} → {}", self.word(lhs), self.word(rhs));
        self.push("+", content);
    }

    fn trace_equation_adopted(&mut self, eq: NodeId) {
        if !self.verbose() {
            return;
        }
        self.push("●", format!("{eq} adopted"));
    }

    fn trace_equation_removed(&mut self, eq: NodeId, lhs: &[Gen], rhs: &[Gen]) {
        let c = self.colors;
        let content = format!(
            "{}{eq}{} {} → {}",
            c.dim,
            c.reset,
            self.word(lhs),
            self.word(rhs)
        );
        self.push("-", content);
    }

    fn wants_derivations(&self) -> bool {
        self.very_verbose()
    }

    fn trace_derivation(&mut self, eq: NodeId, derivation: &Derivation) {
        if !self.very_verbose() {
            return;
        }
        let Derivation {
            left,
            right,
            overlap,
        } = derivation;
        self.push("↳", format!("{eq} from {left} ⋈ {right} over {overlap}"));
    }

    fn trace_overlap_deferred(&mut self, left: NodeId, right: NodeId, length: usize) {
        self.push("…", format!("{left} ⋈ {right} deferred (length {length})"));
    }

    fn trace_state_created(&mut self, state: StateId, word: &[Gen]) {
        if !self.verbose() {
            return;
        }
        let c = self.colors;
        let content = format!("{}{state}{} [{}]", c.blue, c.reset, self.word(word));
        self.push("◆", content);
    }

    fn trace_states_merged(&mut self, survivor: StateId, loser: StateId) {
        let c = self.colors;
        let content = format!("{}{loser}{} into {}{survivor}{}", c.blue, c.reset, c.blue, c.reset);
        self.push("=", content);
    }

    fn trace_state_relabelled(&mut self, state: StateId, word: &[Gen]) {
        if !self.verbose() {
            return;
        }
        let content = format!("{state} now [{}]", self.word(word));
        self.push("◆", content);
    }

    fn trace_state_discarded(&mut self, state: StateId) {
        if !self.verbose() {
            return;
        }
        self.push("◇", format!("{state} discarded"));
    }

    fn trace_transition_proved(&mut self, from: StateId, symbol: Symbol, to: StateId) {
        if !self.very_verbose() {
            return;
        }
        let symbol = self.alphabet.display_symbol(symbol);
        self.push("→", format!("{from} {symbol} {to}"));
    }

    fn trace_inverse_repair(&mut self, state: StateId) {
        if !self.verbose() {
            return;
        }
        self.push("↺", format!("{state} inverse re-learned"));
    }

    fn trace_scan_finished(&mut self, removed: usize, states: usize) {
        if !self.verbose() {
            return;
        }
        let c = self.colors;
        let content = format!(
            "{}scan: {removed} equations removed, {states} states{}",
            c.dim, c.reset
        );
        self.push("#", content);
    }

    fn trace_compiled(&mut self, states: usize, rules: usize) {
        self.push("◼", format!("compiled {rules} rules into {states} states"));
    }
}
