//! Overlaps between left-hand sides and the critical pairs they yield.

use wordfsa_core::{Gen, Word};

/// Overlap lengths `m`, shortest first, with `1 <= m < min(|l1|, |l2|)` and
/// the last `m` letters of `l1` equal to the first `m` letters of `l2`.
pub(crate) fn overlaps<'a>(l1: &'a [Gen], l2: &'a [Gen]) -> impl Iterator<Item = usize> + 'a {
    (1..l1.len().min(l2.len())).filter(move |&m| l1[l1.len() - m..] == l2[..m])
}

/// Length of the overlap word `l1[..|l1|-m]·l2`.
pub(crate) fn overlap_length(l1: &[Gen], l2: &[Gen], m: usize) -> usize {
    l1.len() + l2.len() - m
}

/// The two one-step reductions of the overlap word of `l1 → r1` and
/// `l2 → r2`: `(r1·l2[m..], l1[..|l1|-m]·r2)`.
pub(crate) fn critical_pair(
    (l1, r1): (&[Gen], &[Gen]),
    (l2, r2): (&[Gen], &[Gen]),
    m: usize,
) -> (Word, Word) {
    let mut left = Word::with_capacity(r1.len() + l2.len() - m);
    left.extend_from_slice(r1);
    left.extend_from_slice(&l2[m..]);

    let head = &l1[..l1.len() - m];
    let mut right = Word::with_capacity(head.len() + r2.len());
    right.extend_from_slice(head);
    right.extend_from_slice(r2);

    (left, right)
}
