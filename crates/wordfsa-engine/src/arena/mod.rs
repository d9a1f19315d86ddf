//! Node arena and the live rewrite trie.
//!
//! Every word the engine holds is a path in one trie rooted at the empty
//! word. A trie node is either irreducible (no known rule applies to it) or
//! an equation (its word is the left-hand side of a rule). Nodes that leave
//! the trie but are still referenced become `Removed`: their word stays
//! readable through the prefix chain until the last reference goes.
//!
//! # Ownership
//!
//! Nodes refer to each other by [`NodeId`] and every structural reference is
//! counted explicitly with [`NodeArena::attach`] / [`NodeArena::detach`]:
//!
//! - the parent's child slot (while the node is in the trie),
//! - an equation's right-hand side,
//! - a difference state's key,
//! - queue membership,
//! - inverse and half-difference cache entries,
//! - a removed child's prefix link.
//!
//! A node is freed exactly when its count reaches zero; its handle then goes
//! back to the free list.
//!
//! # Notices
//!
//! Mutations that the arena cannot finish on its own are reported through
//! outboxes the engine drains between steps: stale nodes found while
//! stepping, equation pairs that must be re-inserted, difference states
//! whose key became reducible, and equations whose right-hand node left the
//! trie.

mod dump;
mod equations;
mod node;
mod trie;

#[cfg(test)]
mod trie_tests;

pub use node::{Equation, Irreducible, Node, NodeBody, NodeId, Stage};
pub(crate) use node::QueueLink;

use wordfsa_core::{Alphabet, Gen, Word, check_length};

use crate::differences::StateId;
use crate::error::{EngineError, InternalError};
use crate::limits::TableKind;

/// Storage for all trie nodes.
#[derive(Debug)]
pub struct NodeArena {
    alphabet: Alphabet,
    nodes: Vec<Node>,
    free: Option<NodeId>,
    free_count: usize,
    dense: bool,
    /// Bumped whenever a rule appears or a node leaves the trie.
    epoch: u64,
    max_word_length: usize,
    equation_count: usize,

    stale: Vec<NodeId>,
    pairs: Vec<(Word, Word)>,
    relabels: Vec<(NodeId, StateId)>,
    orphans: Vec<NodeId>,
    fault: Option<InternalError>,
}

impl NodeArena {
    pub fn new(alphabet: Alphabet, table: TableKind, max_word_length: usize) -> Self {
        let dense = table.is_dense(alphabet.len());
        let root = Node::new(
            None,
            0,
            0,
            NodeBody::Irreducible(Irreducible::new(dense, alphabet.len())),
        );
        Self {
            alphabet,
            nodes: vec![root],
            free: None,
            free_count: 0,
            dense,
            epoch: 0,
            max_word_length,
            equation_count: 0,
            stale: Vec::new(),
            pairs: Vec::new(),
            relabels: Vec::new(),
            orphans: Vec::new(),
            fault: None,
        }
    }

    #[inline]
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    #[inline]
    pub fn max_word_length(&self) -> usize {
        self.max_word_length
    }

    pub(crate) fn set_max_word_length(&mut self, max: usize) {
        self.max_word_length = max;
    }

    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Slots ever allocated, live or free.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn live_count(&self) -> usize {
        self.nodes.len() - self.free_count
    }

    pub fn free_count(&self) -> usize {
        self.free_count
    }

    /// Equations currently in the trie.
    pub fn equation_count(&self) -> usize {
        self.equation_count
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn irreducible(&self, id: NodeId) -> Option<&Irreducible> {
        match &self.node(id).body {
            NodeBody::Irreducible(irr) => Some(irr),
            _ => None,
        }
    }

    pub(crate) fn irreducible_mut(&mut self, id: NodeId) -> Option<&mut Irreducible> {
        match &mut self.node_mut(id).body {
            NodeBody::Irreducible(irr) => Some(irr),
            _ => None,
        }
    }

    pub fn equation(&self, id: NodeId) -> Option<&Equation> {
        match &self.node(id).body {
            NodeBody::Equation(eq) => Some(eq),
            _ => None,
        }
    }

    pub(crate) fn equation_mut(&mut self, id: NodeId) -> Option<&mut Equation> {
        match &mut self.node_mut(id).body {
            NodeBody::Equation(eq) => Some(eq),
            _ => None,
        }
    }

    #[inline]
    pub fn is_irreducible(&self, id: NodeId) -> bool {
        self.irreducible(id).is_some()
    }

    #[inline]
    pub fn is_equation(&self, id: NodeId) -> bool {
        self.equation(id).is_some()
    }

    /// Every equation node in the trie, in handle order.
    pub fn equations(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(n.body, NodeBody::Equation(_)))
            .map(|(i, _)| NodeId::new(i as u32))
    }

    /// Every irreducible node in the trie, in handle order.
    pub fn irreducibles(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(n.body, NodeBody::Irreducible(_)))
            .map(|(i, _)| NodeId::new(i as u32))
    }

    /// The node's word, read back through the prefix chain.
    pub fn word(&self, id: NodeId) -> Word {
        let mut word = Word::with_capacity(self.node(id).len());
        let mut at = id;
        while let Some(prefix) = self.node(at).prefix {
            word.push(self.node(at).last);
            at = prefix;
        }
        word.reverse();
        word
    }

    #[inline]
    pub fn child(&self, id: NodeId, g: Gen) -> Option<NodeId> {
        self.irreducible(id).and_then(|irr| irr.table.get(g))
    }

    /// Node spelling `word`, if the trie has one.
    pub fn lookup(&self, word: &[Gen]) -> Option<NodeId> {
        word.iter()
            .try_fold(NodeId::ROOT, |at, &g| self.child(at, g))
    }

    /// Node spelling `word`, creating irreducible nodes along the way.
    ///
    /// `word` must be irreducible: meeting an equation on the path is an
    /// internal error.
    pub fn insert(&mut self, word: &[Gen]) -> Result<NodeId, EngineError> {
        self.alphabet.check_word(word)?;
        check_length(word.len(), self.max_word_length)?;

        let mut at = NodeId::ROOT;
        for (depth, &g) in word.iter().enumerate() {
            at = match self.child(at, g) {
                Some(next) => next,
                None if self.is_irreducible(at) => self.add_child(at, g, depth as u32 + 1),
                None => {
                    return Err(InternalError::new(
                        "insert",
                        format!(
                            "word `{}` passes through equation {at}",
                            self.alphabet.display_word(word)
                        ),
                    )
                    .into());
                }
            };
        }
        if !self.is_irreducible(at) {
            return Err(InternalError::new(
                "insert",
                format!("word `{}` is a left-hand side", self.alphabet.display_word(word)),
            )
            .into());
        }
        Ok(at)
    }

    fn add_child(&mut self, parent: NodeId, g: Gen, length: u32) -> NodeId {
        let body = NodeBody::Irreducible(Irreducible::new(self.dense, self.alphabet.len()));
        let child = self.alloc(Node::new(Some(parent), g, length, body));
        self.hook(parent, g, child);
        child
    }

    /// Put `child` in `parent`'s slot for `g`. The slot owns the child's
    /// initial reference.
    pub(crate) fn hook(&mut self, parent: NodeId, g: Gen, child: NodeId) {
        if let Some(irr) = self.irreducible_mut(parent) {
            irr.table.set(g, Some(child));
            irr.children += 1;
        }
    }

    /// Take `id` out of its parent's slot. From here on the prefix link
    /// holds its own reference, and the slot's reference is dropped.
    pub(crate) fn unhook(&mut self, id: NodeId) {
        let node = self.node(id);
        let (Some(parent), g) = (node.prefix, node.last) else {
            self.fault(InternalError::new("unhook", "root cannot leave the trie"));
            return;
        };
        if let Some(irr) = self.irreducible_mut(parent)
            && irr.table.get(g) == Some(id)
        {
            irr.table.set(g, None);
            irr.children -= 1;
        }
        self.attach(parent);
        self.node_mut(id).owns_prefix = true;
        self.epoch += 1;
        self.detach(id);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Allocation and reference counting
    // ─────────────────────────────────────────────────────────────────────

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free {
            Some(id) => {
                self.free = match self.node(id).body {
                    NodeBody::Free { next } => next,
                    _ => None,
                };
                self.free_count -= 1;
                self.nodes[id.index()] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId::new(self.nodes.len() as u32 - 1)
            }
        }
    }

    /// Add a reference to `id`.
    #[inline]
    pub fn attach(&mut self, id: NodeId) {
        self.node_mut(id).refs += 1;
    }

    /// Drop a reference to `id`, freeing it (and whatever only it kept
    /// alive) when the count reaches zero.
    pub fn detach(&mut self, id: NodeId) {
        let mut work = vec![id];
        while let Some(id) = work.pop() {
            if self.node(id).refs == 0 {
                self.fault(InternalError::new("detach", format!("{id} has no references")));
                continue;
            }
            let node = self.node_mut(id);
            node.refs -= 1;
            if node.refs > 0 || id == NodeId::ROOT {
                continue;
            }

            let next = self.free;
            let node = self.node_mut(id);
            let body = std::mem::replace(&mut node.body, NodeBody::Free { next });
            if node.owns_prefix
                && let Some(prefix) = node.prefix
            {
                work.push(prefix);
            }
            node.prefix = None;
            node.owns_prefix = false;
            node.rhs_of = None;
            node.link = QueueLink::default();
            self.free = Some(id);
            self.free_count += 1;
            self.epoch += 1;

            match body {
                NodeBody::Irreducible(irr) => {
                    if !irr.table.is_empty() {
                        self.fault(InternalError::new(
                            "detach",
                            format!("{id} freed with children"),
                        ));
                    }
                    work.extend(irr.inverse);
                    work.extend(irr.half.iter().flat_map(|h| h.iter().flatten().copied()));
                }
                NodeBody::Equation(eq) => {
                    self.fault(InternalError::new(
                        "detach",
                        format!("equation {id} freed without leaving the trie"),
                    ));
                    work.push(eq.rhs);
                }
                NodeBody::Removed | NodeBody::Free { .. } => {}
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Caches
    // ─────────────────────────────────────────────────────────────────────

    /// Cached node of the reduced inverse of `id`'s word.
    pub fn cached_inverse(&self, id: NodeId) -> Option<NodeId> {
        self.irreducible(id).and_then(|irr| irr.inverse)
    }

    pub fn set_cached_inverse(&mut self, id: NodeId, inverse: NodeId) {
        let Some(irr) = self.irreducible_mut(id) else { return };
        let old = irr.inverse.replace(inverse);
        self.attach(inverse);
        if let Some(old) = old {
            self.detach(old);
        }
    }

    /// Cached node of the reduced `x⁻¹·word(id)`.
    pub fn half_difference(&self, id: NodeId, x: Gen) -> Option<NodeId> {
        self.irreducible(id)
            .and_then(|irr| irr.half.as_ref())
            .and_then(|half| half[x as usize])
    }

    pub fn set_half_difference(&mut self, id: NodeId, x: Gen, target: NodeId) {
        let k = self.alphabet.len();
        let Some(irr) = self.irreducible_mut(id) else { return };
        let half = irr
            .half
            .get_or_insert_with(|| vec![None; k].into_boxed_slice());
        let old = half[x as usize].replace(target);
        self.attach(target);
        if let Some(old) = old {
            self.detach(old);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Difference keys
    // ─────────────────────────────────────────────────────────────────────

    pub fn difference(&self, id: NodeId) -> Option<StateId> {
        self.irreducible(id).and_then(|irr| irr.difference)
    }

    /// Record `state` as keyed by `id` (or clear it). The caller holds the
    /// key reference.
    pub fn set_difference(&mut self, id: NodeId, state: Option<StateId>) {
        if let Some(irr) = self.irreducible_mut(id) {
            irr.difference = state;
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Outboxes
    // ─────────────────────────────────────────────────────────────────────

    /// Record the first internal error; later ones are dropped.
    pub(crate) fn fault(&mut self, error: InternalError) {
        if self.fault.is_none() {
            self.fault = Some(error);
        }
    }

    pub fn take_fault(&mut self) -> Option<InternalError> {
        self.fault.take()
    }

    /// Irreducible nodes found to be reducible while stepping.
    pub fn take_stale(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.stale)
    }

    /// Equation pairs that left the trie and must be inserted again.
    pub fn take_pairs(&mut self) -> Vec<(Word, Word)> {
        std::mem::take(&mut self.pairs)
    }

    /// Nodes whose difference state needs a new key, with that state.
    pub fn take_relabels(&mut self) -> Vec<(NodeId, StateId)> {
        std::mem::take(&mut self.relabels)
    }

    /// Equations whose right-hand node left the trie.
    pub fn take_orphans(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.orphans)
    }

    /// Whether any outbox has entries.
    pub fn has_notices(&self) -> bool {
        !(self.stale.is_empty()
            && self.pairs.is_empty()
            && self.relabels.is_empty()
            && self.orphans.is_empty())
    }
}
