//! Stepping through the live trie.
//!
//! A reduction state is an irreducible node: the longest suffix of the text
//! read so far that the trie spells. Reading a letter follows the child slot
//! when there is one and otherwise falls back along suffix links, the way an
//! Aho–Corasick automaton does. Suffix links are computed on demand and
//! cached together with the arena epoch; any change that can invalidate a
//! link (a new rule, a node leaving the trie) bumps the epoch.
//!
//! A child that the trie still marks irreducible may already be reducible
//! because a newer rule matches one of its suffixes. Validating the child's
//! suffix link finds that rule: the node is reported as stale and the step
//! yields the rule.

use wordfsa_core::{Gen, ReduceFlags, Rewriter, Step, Word, WordError, reduce_with};

use super::node::{NodeBody, SuffixLink};
use super::{NodeArena, NodeId};
use crate::error::InternalError;

impl NodeArena {
    /// Read letter `g` in reduction state `state`.
    pub fn transition(&mut self, state: NodeId, g: Gen) -> Step<NodeId, NodeId> {
        if let Some(child) = self.child(state, g) {
            match self.node(child).body {
                NodeBody::Equation(_) => return Step::Rule(child),
                NodeBody::Irreducible(_) => {
                    return match self.suffix_link(child) {
                        Step::State(_) => Step::State(child),
                        Step::Rule(rule) => {
                            self.stale.push(child);
                            Step::Rule(rule)
                        }
                    };
                }
                NodeBody::Removed | NodeBody::Free { .. } => {
                    self.fault(InternalError::new(
                        "transition",
                        format!("{child} is in a child slot but not in the trie"),
                    ));
                    return Step::State(NodeId::ROOT);
                }
            }
        }

        if state == NodeId::ROOT {
            return Step::State(NodeId::ROOT);
        }
        match self.suffix_link(state) {
            Step::State(fallback) => self.transition(fallback, g),
            Step::Rule(_) => {
                self.fault(InternalError::new(
                    "transition",
                    format!("stepped from {state}, which is reducible"),
                ));
                Step::State(NodeId::ROOT)
            }
        }
    }

    /// Step from the longest proper suffix of `id`'s word: the state reached
    /// by that suffix, or the rule matching it.
    pub(crate) fn suffix_link(&mut self, id: NodeId) -> Step<NodeId, NodeId> {
        let epoch = self.epoch;
        if let NodeBody::Irreducible(irr) = &self.node(id).body
            && let Some(link) = irr.suffix
            && link.epoch == epoch
        {
            return link.step;
        }

        let node = self.node(id);
        let (prefix, g) = (node.prefix, node.last);
        let step = match prefix {
            None | Some(NodeId::ROOT) => Step::State(NodeId::ROOT),
            Some(parent) => match self.suffix_link(parent) {
                Step::State(fallback) => self.transition(fallback, g),
                Step::Rule(rule) => {
                    self.fault(InternalError::new(
                        "suffix_link",
                        format!("{id} hangs below reducible {parent}"),
                    ));
                    Step::Rule(rule)
                }
            },
        };

        // The epoch cannot move while stepping, so the link is still current.
        if let Some(irr) = self.irreducible_mut(id) {
            irr.suffix = Some(SuffixLink { step, epoch });
        }
        step
    }

    /// Reduce `word` in place with the live rules.
    pub fn reduce(&mut self, word: &mut Word, flags: ReduceFlags) -> Result<bool, WordError> {
        self.alphabet().check_word(word)?;
        let max = self.max_word_length();
        reduce_with(self, word, flags, max)
    }

    /// Reduced copy of `word`.
    pub fn reduced(&mut self, word: &[Gen]) -> Result<Word, WordError> {
        let mut out = word.to_vec();
        self.reduce(&mut out, ReduceFlags::NONE)?;
        Ok(out)
    }

    /// Whether some live rule applies to `word`.
    pub fn is_reducible(&mut self, word: &[Gen]) -> Result<bool, WordError> {
        let mut copy = word.to_vec();
        self.reduce(&mut copy, ReduceFlags::CHECK_ONLY)
    }

    /// Whether equation `eq` is minimal: no other rule matches a proper
    /// subword of its left-hand side.
    pub fn is_minimal(&mut self, eq: NodeId) -> bool {
        self.is_equation(eq) && self.subword_rule(eq).is_none()
    }

    /// The left-hand side of `eq` with one rule other than `eq` applied to a
    /// proper subword, or `None` when `eq` is minimal.
    pub fn rewrite_below(&mut self, eq: NodeId) -> Option<Word> {
        let (rule, end) = self.subword_rule(eq)?;
        let lhs = self.word(eq);
        let start = end - self.node(rule).len();
        let mut out = lhs[..start].to_vec();
        out.extend(self.rhs_word(rule));
        out.extend_from_slice(&lhs[end..]);
        Some(out)
    }

    /// First rule matching a proper subword of `eq`'s left-hand side, with
    /// the position just past the match.
    fn subword_rule(&mut self, eq: NodeId) -> Option<(NodeId, usize)> {
        if !self.is_equation(eq) {
            return None;
        }
        let lhs = self.word(eq);
        let (&last, prefix) = lhs.split_last()?;

        let mut state = NodeId::ROOT;
        for (at, &g) in prefix.iter().enumerate() {
            match self.transition(state, g) {
                Step::State(next) => state = next,
                Step::Rule(rule) => return Some((rule, at + 1)),
            }
        }
        if prefix.is_empty() {
            return None;
        }
        // The longest proper suffix of `lhs`. The child slot of `state`
        // holds `eq` itself, so step from the fallback.
        let fallback = match self.suffix_link(state) {
            Step::State(fallback) => fallback,
            Step::Rule(rule) => return Some((rule, prefix.len())),
        };
        match self.transition(fallback, last) {
            Step::State(_) => None,
            Step::Rule(rule) => Some((rule, lhs.len())),
        }
    }
}

impl Rewriter for NodeArena {
    type State = NodeId;
    type Rule = NodeId;

    fn initial(&self) -> NodeId {
        NodeId::ROOT
    }

    #[inline]
    fn step(&mut self, state: NodeId, g: Gen) -> Step<NodeId, NodeId> {
        self.transition(state, g)
    }

    fn lhs_len(&self, rule: NodeId) -> usize {
        self.node(rule).len()
    }

    fn rhs_into(&mut self, rule: NodeId, out: &mut Word) {
        let rhs = self.chase(rule);
        *out = self.word(rhs);
    }
}
