use wordfsa_core::{Alphabet, ReduceFlags, Word, WordError};

use super::{NodeArena, NodeId};
use crate::limits::TableKind;

fn word(arena: &NodeArena, text: &str) -> Word {
    arena.alphabet().parse_word(text).unwrap()
}

fn rule(arena: &mut NodeArena, lhs: &str, rhs: &str) -> NodeId {
    let lhs = word(arena, lhs);
    let rhs = word(arena, rhs);
    let rhs = arena.insert(&rhs).unwrap();
    let (&last, prefix) = lhs.split_last().unwrap();
    let prefix = arena.insert(prefix).unwrap();
    arena.make_equation(prefix, last, rhs, true).unwrap()
}

fn free_group(table: TableKind) -> NodeArena {
    let mut arena = NodeArena::new(Alphabet::group(["a", "A", "b", "B"]).unwrap(), table, 64);
    for (lhs, rhs) in [("aA", ""), ("Aa", ""), ("bB", ""), ("Bb", "")] {
        rule(&mut arena, lhs, rhs);
    }
    arena
}

fn reduce_text(arena: &mut NodeArena, text: &str) -> String {
    let reduced = arena.reduced(&word(arena, text)).unwrap();
    arena.alphabet().format_word(&reduced)
}

#[test]
fn free_cancellation() {
    let mut arena = free_group(TableKind::Auto);

    assert_eq!(reduce_text(&mut arena, "aaAA"), "");
    assert_eq!(reduce_text(&mut arena, "aAa"), "a");
    assert_eq!(reduce_text(&mut arena, "abBA"), "");
    assert_eq!(reduce_text(&mut arena, "abAB"), "abAB");
}

#[test]
fn dense_and_sparse_tables_agree() {
    let mut dense = free_group(TableKind::Dense);
    let mut sparse = free_group(TableKind::Sparse);

    for text in ["", "BbAa", "abBBbA", "aaaBBb", "AbaBAab"] {
        assert_eq!(reduce_text(&mut dense, text), reduce_text(&mut sparse, text), "{text}");
    }
}

#[test]
fn reduction_stops_at_irreducible_words() {
    let mut arena = free_group(TableKind::Auto);
    let w = word(&arena, "abAB");

    assert!(!arena.is_reducible(&w).unwrap());
    let mut copy = word(&arena, "aBbA");
    assert!(arena.reduce(&mut copy, ReduceFlags::STOP_AFTER_FIRST).unwrap());
    assert_eq!(arena.alphabet().format_word(&copy), "aA");
}

#[test]
fn stale_node_is_reported() {
    let mut arena = free_group(TableKind::Auto);
    let aab = arena.insert(&word(&arena, "aab")).unwrap();
    arena.take_stale();

    rule(&mut arena, "ab", "ba");

    assert!(arena.is_irreducible(aab));
    assert!(arena.is_reducible(&word(&arena, "aab")).unwrap());
    assert_eq!(arena.take_stale(), vec![aab]);
}

#[test]
fn minimal_equations() {
    let mut arena = NodeArena::new(Alphabet::new(["x", "y"]).unwrap(), TableKind::Auto, 64);
    let yx = rule(&mut arena, "yx", "xy");
    let yyx = rule(&mut arena, "yyx", "x");

    assert!(arena.is_minimal(yx));
    assert!(!arena.is_minimal(yyx));
    assert!(!arena.is_minimal(NodeId::ROOT));
}

#[test]
fn growth_past_maximum_fails() {
    let mut arena = NodeArena::new(Alphabet::new(["x", "y"]).unwrap(), TableKind::Auto, 4);
    rule(&mut arena, "x", "yy");

    assert_eq!(reduce_text(&mut arena, "xx"), "yyyy");
    let err = arena.reduced(&word(&arena, "xxx")).unwrap_err();
    assert!(matches!(err, WordError::TooLong { max: 4, .. }));
}
