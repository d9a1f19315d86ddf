//! Creating, retiring and resolving equations.

use wordfsa_core::{Gen, Word};

use super::node::{Equation, Irreducible, NodeBody, Stage};
use super::{Node, NodeArena, NodeId};
use crate::error::InternalError;

impl NodeArena {
    /// Make `word(prefix)·last → word(rhs)` an equation and return its node.
    ///
    /// The node is created as a new leaf, or an irreducible node is promoted
    /// (its subtree leaves the trie and the equations in it are re-queued).
    /// If the node already is an equation the shorter right-hand side wins,
    /// then the one that sorts first; a true tie keeps the existing rule. The
    /// losing pair is queued as a consequence.
    pub fn make_equation(
        &mut self,
        prefix: NodeId,
        last: Gen,
        rhs: NodeId,
        primary: bool,
    ) -> Result<NodeId, InternalError> {
        if !self.is_irreducible(prefix) {
            return Err(InternalError::new(
                "make_equation",
                format!("prefix {prefix} is not irreducible"),
            ));
        }
        if !self.node(rhs).in_trie() {
            return Err(InternalError::new(
                "make_equation",
                format!("right-hand side {rhs} is not in the trie"),
            ));
        }

        let eq = match self.child(prefix, last) {
            None => {
                let length = self.node(prefix).length + 1;
                let body = NodeBody::Equation(Self::fresh_equation(rhs, primary));
                let eq = self.alloc(Node::new(Some(prefix), last, length, body));
                self.hook(prefix, last, eq);
                eq
            }
            Some(existing) if self.is_irreducible(existing) => {
                self.promote(existing, rhs, primary);
                existing
            }
            Some(existing) => {
                self.settle_tie(existing, rhs);
                self.epoch += 1;
                return Ok(existing);
            }
        };

        self.link_rhs(eq, rhs);
        self.equation_count += 1;
        self.epoch += 1;
        Ok(eq)
    }

    fn fresh_equation(rhs: NodeId, primary: bool) -> Equation {
        Equation {
            rhs,
            stage: Stage::New,
            sibling: None,
            primary,
            interest: false,
        }
    }

    fn promote(&mut self, id: NodeId, rhs: NodeId, primary: bool) {
        let children: Vec<NodeId> = self
            .irreducible(id)
            .map(|irr| irr.table.children().into_iter().map(|(_, c)| c).collect())
            .unwrap_or_default();
        for child in children {
            self.remove(child);
        }
        let body = std::mem::replace(
            &mut self.node_mut(id).body,
            NodeBody::Equation(Self::fresh_equation(rhs, primary)),
        );
        if let NodeBody::Irreducible(irr) = body {
            self.release_caches(id, irr);
        }
    }

    fn settle_tie(&mut self, existing: NodeId, rhs: NodeId) {
        let old_node = self.chase(existing);
        if old_node == rhs {
            return;
        }
        let old = self.word(old_node);
        let new = self.word(rhs);
        let new_wins = new.len() < old.len()
            || (new.len() == old.len() && self.alphabet.order().less(&new, &old));
        if new_wins {
            self.set_rhs(existing, rhs);
            self.pairs.push((old, new));
        } else if new != old {
            self.pairs.push((new, old));
        }
    }

    /// Release what an irreducible body owned: caches and the difference
    /// key notice. Equations pointing at `id` keep pointing at it.
    fn release_caches(&mut self, id: NodeId, irr: Irreducible) {
        if let Some(state) = irr.difference {
            self.relabels.push((id, state));
        }
        if let Some(inverse) = irr.inverse {
            self.detach(inverse);
        }
        for target in irr.half.iter().flat_map(|h| h.iter().flatten().copied()) {
            self.detach(target);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Right-hand sides
    // ─────────────────────────────────────────────────────────────────────

    fn link_rhs(&mut self, eq: NodeId, rhs: NodeId) {
        self.attach(rhs);
        let head = self.node(rhs).rhs_of;
        if let Some(e) = self.equation_mut(eq) {
            e.rhs = rhs;
            e.sibling = head;
        }
        self.node_mut(rhs).rhs_of = Some(eq);
    }

    fn unlink_rhs(&mut self, eq: NodeId) -> Option<NodeId> {
        let (rhs, next) = {
            let e = self.equation(eq)?;
            (e.rhs, e.sibling)
        };
        if self.node(rhs).rhs_of == Some(eq) {
            self.node_mut(rhs).rhs_of = next;
        } else {
            let mut at = self.node(rhs).rhs_of;
            while let Some(cur) = at {
                let sibling = self.equation(cur).and_then(|e| e.sibling);
                if sibling == Some(eq) {
                    if let Some(e) = self.equation_mut(cur) {
                        e.sibling = next;
                    }
                    break;
                }
                at = sibling;
            }
        }
        if let Some(e) = self.equation_mut(eq) {
            e.sibling = None;
        }
        Some(rhs)
    }

    /// Point `eq` at a new right-hand node.
    pub fn set_rhs(&mut self, eq: NodeId, rhs: NodeId) {
        let Some(old) = self.unlink_rhs(eq) else { return };
        self.link_rhs(eq, rhs);
        self.detach(old);
    }

    /// Equations whose right-hand node is `id`.
    pub fn siblings(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut at = self.node(id).rhs_of;
        while let Some(eq) = at {
            out.push(eq);
            at = self.equation(eq).and_then(|e| e.sibling);
        }
        out
    }

    /// Follow right-hand links from `eq` to the first node that is not an
    /// equation, shortening the chain on the way.
    pub fn chase(&mut self, eq: NodeId) -> NodeId {
        let mut at = eq;
        let mut hops = 0usize;
        while let Some(e) = self.equation(at) {
            at = e.rhs;
            hops += 1;
            if hops > self.nodes.len() {
                self.fault(InternalError::new("chase", format!("cycle through {eq}")));
                return at;
            }
        }
        if hops > 1 {
            self.set_rhs(eq, at);
        }
        at
    }

    /// Current right-hand word of `eq`.
    pub fn rhs_word(&mut self, eq: NodeId) -> Word {
        let rhs = self.chase(eq);
        self.word(rhs)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Leaving the trie
    // ─────────────────────────────────────────────────────────────────────

    /// Take `id` and its whole subtree out of the trie.
    ///
    /// Equations in the subtree go to the pair outbox, difference keys to
    /// the relabel outbox and equations pointing at removed nodes to the
    /// orphan outbox. Anything else that still names a removed node notices
    /// through the epoch.
    pub fn remove(&mut self, id: NodeId) {
        if id == NodeId::ROOT || !self.node(id).in_trie() {
            return;
        }
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(at) = stack.pop() {
            order.push(at);
            if let Some(irr) = self.irreducible(at) {
                stack.extend(irr.table.children().into_iter().map(|(_, c)| c));
            }
        }
        for at in order.into_iter().rev() {
            match self.node(at).body {
                NodeBody::Equation(_) => self.retire(at),
                NodeBody::Irreducible(_) => {
                    let orphans = self.siblings(at);
                    self.orphans.extend(orphans);
                    let body = std::mem::replace(&mut self.node_mut(at).body, NodeBody::Removed);
                    if let NodeBody::Irreducible(irr) = body {
                        self.release_caches(at, irr);
                    }
                }
                NodeBody::Removed | NodeBody::Free { .. } => continue,
            }
            self.unhook(at);
        }
    }

    fn retire(&mut self, eq: NodeId) {
        let lhs = self.word(eq);
        let rhs = self.rhs_word(eq);
        self.pairs.push((lhs, rhs));
        if let Some(old) = self.unlink_rhs(eq) {
            self.node_mut(eq).body = NodeBody::Removed;
            self.detach(old);
        }
        self.equation_count -= 1;
    }

    /// Mark `eq` secondary and queue its pair, leaving it in the trie.
    ///
    /// `eq` still fires during reduction, so the queued left-hand side is
    /// first rewritten by the rule that made `eq` redundant.
    pub fn demote(&mut self, eq: NodeId) {
        let Some(e) = self.equation_mut(eq) else { return };
        if !e.primary {
            return;
        }
        e.primary = false;
        let lhs = match self.rewrite_below(eq) {
            Some(rewritten) => rewritten,
            None => self.word(eq),
        };
        let rhs = self.rhs_word(eq);
        self.pairs.push((lhs, rhs));
    }

    /// Free irreducible leaf `id` if nothing but its parent slot refers to
    /// it. Returns whether the node was freed.
    pub fn prune_leaf(&mut self, id: NodeId) -> bool {
        if id == NodeId::ROOT {
            return false;
        }
        let node = self.node(id);
        let prunable = match &node.body {
            NodeBody::Irreducible(irr) => {
                irr.children == 0
                    && irr.difference.is_none()
                    && irr.inverse.is_none()
                    && irr.half.is_none()
            }
            _ => false,
        };
        if !prunable || node.refs != 1 || node.rhs_of.is_some() || node.link.kind.is_some() {
            return false;
        }
        self.unhook(id);
        true
    }

    pub fn set_stage(&mut self, eq: NodeId, stage: Stage) {
        if let Some(e) = self.equation_mut(eq) {
            e.stage = stage;
        }
    }

    pub fn mark_learnt(&mut self, eq: NodeId) {
        if let Some(e) = self.equation_mut(eq) {
            e.interest = true;
        }
    }
}
