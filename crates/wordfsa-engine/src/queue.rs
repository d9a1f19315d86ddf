//! Intrusive FIFO queues of equation nodes.
//!
//! Links live in the nodes themselves, so unlinking from the middle is O(1)
//! and a node can be on at most one queue at a time. A queue holds a
//! reference to every node on it: a node that leaves the trie while queued
//! stays readable until it is popped.

use crate::arena::{NodeArena, NodeId, QueueLink};

/// Which queue a node is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    /// Inserted equations awaiting adoption.
    Adopt,
    /// Equations whose right-hand side must be resolved again.
    Revisit,
}

#[derive(Debug)]
pub struct EquationQueue {
    kind: QueueKind,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl EquationQueue {
    pub fn new(kind: QueueKind) -> Self {
        Self {
            kind,
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn kind(&self) -> QueueKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, arena: &NodeArena, id: NodeId) -> bool {
        arena.node(id).link.kind == Some(self.kind)
    }

    /// Append `id`. Returns false if it already is on some queue.
    pub fn push_back(&mut self, arena: &mut NodeArena, id: NodeId) -> bool {
        if arena.node(id).link.kind.is_some() {
            return false;
        }
        arena.attach(id);
        arena.node_mut(id).link = QueueLink {
            kind: Some(self.kind),
            prev: self.tail,
            next: None,
        };
        match self.tail {
            Some(tail) => arena.node_mut(tail).link.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
        true
    }

    /// Take the oldest node.
    ///
    /// The queue's reference is dropped; nodes that nothing else kept alive
    /// are freed and skipped.
    pub fn pop_front(&mut self, arena: &mut NodeArena) -> Option<NodeId> {
        while let Some(id) = self.head {
            self.unlink_raw(arena, id);
            if arena.node(id).refs() > 1 {
                arena.detach(id);
                return Some(id);
            }
            arena.detach(id);
        }
        None
    }

    /// Remove `id` from the middle of the queue. Returns false if it was not
    /// on this queue.
    pub fn unlink(&mut self, arena: &mut NodeArena, id: NodeId) -> bool {
        if !self.contains(arena, id) {
            return false;
        }
        self.unlink_raw(arena, id);
        arena.detach(id);
        true
    }

    /// Drop every entry.
    pub fn clear(&mut self, arena: &mut NodeArena) {
        while let Some(id) = self.head {
            self.unlink_raw(arena, id);
            arena.detach(id);
        }
    }

    fn unlink_raw(&mut self, arena: &mut NodeArena, id: NodeId) {
        let QueueLink { prev, next, .. } = arena.node(id).link;
        match prev {
            Some(p) => arena.node_mut(p).link.next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => arena.node_mut(n).link.prev = prev,
            None => self.tail = prev,
        }
        arena.node_mut(id).link = QueueLink::default();
        self.len -= 1;
    }
}
