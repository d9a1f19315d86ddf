//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use wordfsa_core::Gen;

/// Split a left-hand side into its last letter and prefix.
///
/// Left-hand sides are oriented against the empty word, which sorts first,
/// so they are never empty.
pub(crate) fn ensure_oriented_lhs(lhs: &[Gen]) -> (Gen, &[Gen]) {
    match lhs.split_last() {
        Some((&last, prefix)) => (last, prefix),
        None => panic!("insert_pair: empty left-hand side (the empty word always sorts first)"),
    }
}
