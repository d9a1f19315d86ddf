//! Node records stored in the arena.

use std::fmt;

use wordfsa_core::{Gen, Step};

use crate::differences::StateId;
use crate::queue::QueueKind;

/// Dense node handle, an index into the arena.
///
/// Handles are recycled through the free list once a node's reference count
/// drops to zero, so a handle is only meaningful while someone holds a
/// reference to it.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The empty word. Never freed.
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Lifecycle of an equation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Inserted, not yet on a queue.
    New,
    /// Waiting for adoption.
    Queued,
    /// Overlaps computed; part of the working system.
    Adopted,
}

/// Children of a trie node.
#[derive(Debug, Clone)]
pub(crate) enum Table {
    Dense(Box<[Option<NodeId>]>),
    /// Sorted by generator.
    Sparse(Vec<(Gen, NodeId)>),
}

impl Table {
    pub(crate) fn new(dense: bool, generators: usize) -> Self {
        if dense {
            Table::Dense(vec![None; generators].into_boxed_slice())
        } else {
            Table::Sparse(Vec::new())
        }
    }

    #[inline]
    pub(crate) fn get(&self, g: Gen) -> Option<NodeId> {
        match self {
            Table::Dense(slots) => slots[g as usize],
            Table::Sparse(entries) => entries
                .binary_search_by_key(&g, |&(eg, _)| eg)
                .ok()
                .map(|i| entries[i].1),
        }
    }

    pub(crate) fn set(&mut self, g: Gen, child: Option<NodeId>) {
        match self {
            Table::Dense(slots) => slots[g as usize] = child,
            Table::Sparse(entries) => {
                let at = entries.binary_search_by_key(&g, |&(eg, _)| eg);
                match (at, child) {
                    (Ok(i), Some(c)) => entries[i].1 = c,
                    (Ok(i), None) => {
                        entries.remove(i);
                    }
                    (Err(i), Some(c)) => entries.insert(i, (g, c)),
                    (Err(_), None) => {}
                }
            }
        }
    }

    /// Children in generator order.
    pub(crate) fn children(&self) -> Vec<(Gen, NodeId)> {
        match self {
            Table::Dense(slots) => slots
                .iter()
                .enumerate()
                .filter_map(|(g, c)| c.map(|c| (g as Gen, c)))
                .collect(),
            Table::Sparse(entries) => entries.clone(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Table::Dense(slots) => slots.iter().all(Option::is_none),
            Table::Sparse(entries) => entries.is_empty(),
        }
    }
}

/// Cached suffix step, valid while the arena epoch is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SuffixLink {
    pub step: Step<NodeId, NodeId>,
    pub epoch: u64,
}

/// A word with no left-hand side as a subword (as far as the trie knows).
#[derive(Debug, Clone)]
pub struct Irreducible {
    pub(crate) table: Table,
    pub(crate) suffix: Option<SuffixLink>,
    /// Node of the reduced formal inverse. Holds a reference.
    pub(crate) inverse: Option<NodeId>,
    /// Difference state keyed by this word.
    pub(crate) difference: Option<StateId>,
    /// Per generator `x`: node of the reduced `x⁻¹·w`. Entries hold references.
    pub(crate) half: Option<Box<[Option<NodeId>]>>,
    /// Number of children in `table`.
    pub(crate) children: u32,
}

impl Irreducible {
    pub(crate) fn new(dense: bool, generators: usize) -> Self {
        Self {
            table: Table::new(dense, generators),
            suffix: None,
            inverse: None,
            difference: None,
            half: None,
            children: 0,
        }
    }

    pub fn difference(&self) -> Option<StateId> {
        self.difference
    }

    pub fn child_count(&self) -> usize {
        self.children as usize
    }
}

/// A rule `word(node) → word(rhs)`.
#[derive(Debug, Clone)]
pub struct Equation {
    /// Holds a reference.
    pub(crate) rhs: NodeId,
    pub(crate) stage: Stage,
    /// Next equation sharing the same right-hand node.
    pub(crate) sibling: Option<NodeId>,
    /// False once the left-hand side gained a reducible suffix.
    pub(crate) primary: bool,
    /// Set once the tracker has learnt the equation.
    pub(crate) interest: bool,
}

impl Equation {
    pub fn rhs(&self) -> NodeId {
        self.rhs
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn is_learnt(&self) -> bool {
        self.interest
    }
}

#[derive(Debug, Clone)]
pub enum NodeBody {
    Irreducible(Irreducible),
    Equation(Equation),
    /// Out of the trie; kept only so its word stays readable.
    Removed,
    /// On the free list.
    Free { next: Option<NodeId> },
}

/// Membership in an intrusive queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct QueueLink {
    pub kind: Option<QueueKind>,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Node {
    /// Node of the word without its last letter; `None` only for the root.
    pub(crate) prefix: Option<NodeId>,
    pub(crate) last: Gen,
    pub(crate) length: u32,
    pub(crate) refs: u32,
    /// Set once the node left the trie: `prefix` then holds a reference.
    pub(crate) owns_prefix: bool,
    /// Head of the list of equations whose right-hand node is this one.
    pub(crate) rhs_of: Option<NodeId>,
    pub(crate) link: QueueLink,
    pub(crate) body: NodeBody,
}

impl Node {
    pub(crate) fn new(prefix: Option<NodeId>, last: Gen, length: u32, body: NodeBody) -> Self {
        Self {
            prefix,
            last,
            length,
            refs: 1,
            owns_prefix: false,
            rhs_of: None,
            link: QueueLink::default(),
            body,
        }
    }

    pub fn prefix(&self) -> Option<NodeId> {
        self.prefix
    }

    pub fn len(&self) -> usize {
        self.length as usize
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn refs(&self) -> u32 {
        self.refs
    }

    pub fn body(&self) -> &NodeBody {
        &self.body
    }

    /// Whether the node is part of the live trie.
    pub fn in_trie(&self) -> bool {
        matches!(self.body, NodeBody::Irreducible(_) | NodeBody::Equation(_))
    }
}
