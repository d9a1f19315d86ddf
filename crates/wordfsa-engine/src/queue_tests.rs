use wordfsa_core::Alphabet;

use crate::arena::{NodeArena, NodeId};
use crate::limits::TableKind;
use crate::queue::{EquationQueue, QueueKind};

fn setup() -> (NodeArena, Vec<NodeId>) {
    let mut arena = NodeArena::new(Alphabet::new(["x", "y", "z"]).unwrap(), TableKind::Auto, 16);
    let eqs = (0..3)
        .map(|g| arena.make_equation(NodeId::ROOT, g, NodeId::ROOT, true).unwrap())
        .collect();
    (arena, eqs)
}

#[test]
fn first_in_first_out() {
    let (mut arena, eqs) = setup();
    let mut queue = EquationQueue::new(QueueKind::Adopt);
    for &eq in &eqs {
        assert!(queue.push_back(&mut arena, eq));
    }

    assert_eq!(queue.len(), 3);
    assert_eq!(arena.node(eqs[0]).refs(), 2);
    let popped: Vec<_> = std::iter::from_fn(|| queue.pop_front(&mut arena)).collect();
    assert_eq!(popped, eqs);
    assert!(queue.is_empty());
    assert_eq!(arena.node(eqs[0]).refs(), 1);
}

#[test]
fn node_is_on_one_queue_at_a_time() {
    let (mut arena, eqs) = setup();
    let mut adopt = EquationQueue::new(QueueKind::Adopt);
    let mut revisit = EquationQueue::new(QueueKind::Revisit);

    assert!(adopt.push_back(&mut arena, eqs[0]));
    assert!(!adopt.push_back(&mut arena, eqs[0]));
    assert!(!revisit.push_back(&mut arena, eqs[0]));
    assert!(adopt.contains(&arena, eqs[0]));
    assert!(!revisit.contains(&arena, eqs[0]));
    assert_eq!(revisit.kind(), QueueKind::Revisit);
}

#[test]
fn unlink_from_the_middle() {
    let (mut arena, eqs) = setup();
    let mut queue = EquationQueue::new(QueueKind::Adopt);
    for &eq in &eqs {
        queue.push_back(&mut arena, eq);
    }

    assert!(queue.unlink(&mut arena, eqs[1]));
    assert!(!queue.unlink(&mut arena, eqs[1]));

    assert_eq!(queue.pop_front(&mut arena), Some(eqs[0]));
    assert_eq!(queue.pop_front(&mut arena), Some(eqs[2]));
    assert_eq!(queue.pop_front(&mut arena), None);
}

#[test]
fn nodes_only_the_queue_kept_are_skipped() {
    let (mut arena, eqs) = setup();
    let mut queue = EquationQueue::new(QueueKind::Adopt);
    queue.push_back(&mut arena, eqs[0]);
    queue.push_back(&mut arena, eqs[1]);

    arena.remove(eqs[0]);
    let free = arena.free_count();

    assert_eq!(queue.pop_front(&mut arena), Some(eqs[1]));
    assert_eq!(arena.free_count(), free + 1);
    assert_eq!(arena.take_fault(), None);
}

#[test]
fn clear_drops_references() {
    let (mut arena, eqs) = setup();
    let mut queue = EquationQueue::new(QueueKind::Revisit);
    for &eq in &eqs {
        queue.push_back(&mut arena, eq);
    }

    queue.clear(&mut arena);

    assert!(queue.is_empty());
    assert!(eqs.iter().all(|&eq| arena.node(eq).refs() == 1));
}
