//! The word reduction loop.
//!
//! A [`Rewriter`] is a deterministic automaton that reads one letter at a
//! time and either moves to a new state or reports that the letters read so
//! far end with the left-hand side of a rule. [`reduce_with`] drives any
//! rewriter over a word until no rule applies.
//!
//! # Buffer discipline
//!
//! The word buffer is used as a gap buffer: `buf[..w]` is the reduced output,
//! `buf[r..]` is unread input, and `w <= r` always holds. A rule that does
//! not lengthen the word fits into the gap: its right-hand side is written
//! just before `r` and read again. When a right-hand side is longer than the
//! gap, the unread input moves to an explicit stack and reading continues
//! from there, so the total work is bounded by the number of letters ever
//! produced rather than by the number of rewrites.

use std::ops::BitOr;

use crate::word::{Word, WordError, check_length};
use crate::Gen;

/// Result of reading one letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step<S, R> {
    /// The word read so far is irreducible; continue from this state.
    State(S),
    /// The word read so far ends with the left-hand side of this rule.
    Rule(R),
}

/// A rewriting automaton.
pub trait Rewriter {
    type State: Copy;
    type Rule: Copy;

    /// State for the empty word.
    fn initial(&self) -> Self::State;

    /// Read letter `g` in `state`.
    fn step(&mut self, state: Self::State, g: Gen) -> Step<Self::State, Self::Rule>;

    /// Length of the rule's left-hand side (at least 1).
    fn lhs_len(&self, rule: Self::Rule) -> usize;

    /// Replace the contents of `out` with the rule's right-hand side.
    fn rhs_into(&mut self, rule: Self::Rule, out: &mut Word);
}

/// Options for [`reduce_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ReduceFlags(u8);

impl ReduceFlags {
    pub const NONE: Self = Self(0);
    /// Apply at most one rewrite.
    pub const STOP_AFTER_FIRST: Self = Self(0x01);
    /// Only report whether the word is reducible; the word is left untouched.
    pub const CHECK_ONLY: Self = Self(0x02);
    /// Leave the final letter out of the reduction.
    pub const IGNORE_TRAILING: Self = Self(0x04);

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for ReduceFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Reduce `word` in place with `rw`.
///
/// Returns `true` when a rule applied (with [`ReduceFlags::CHECK_ONLY`]: when
/// one would apply). Fails with [`WordError::TooLong`] as soon as the word,
/// including pending input, grows past `max_len`; the word is then left in an
/// unspecified but valid state.
pub fn reduce_with<R>(
    rw: &mut R,
    word: &mut Word,
    flags: ReduceFlags,
    max_len: usize,
) -> Result<bool, WordError>
where
    R: Rewriter + ?Sized,
{
    check_length(word.len(), max_len)?;

    let trailing = if flags.contains(ReduceFlags::IGNORE_TRAILING) {
        word.pop()
    } else {
        None
    };
    let reserved = usize::from(trailing.is_some());

    let mut buf = std::mem::take(word);
    let mut states: Vec<R::State> = Vec::with_capacity(buf.len() + 1);
    states.push(rw.initial());

    let mut w = 0usize;
    let mut r = 0usize;
    let mut stack: Vec<Gen> = Vec::new();
    let mut stack_mode = false;
    let mut rhs = Word::new();
    let mut changed = false;

    loop {
        let g = if stack_mode {
            match stack.pop() {
                Some(g) => g,
                None => break,
            }
        } else {
            if r == buf.len() {
                break;
            }
            r += 1;
            buf[r - 1]
        };

        match rw.step(states[w], g) {
            Step::State(next) => {
                if stack_mode {
                    buf.push(g);
                } else {
                    buf[w] = g;
                }
                w += 1;
                states.push(next);
            }
            Step::Rule(rule) => {
                changed = true;
                if flags.contains(ReduceFlags::CHECK_ONLY) {
                    // Nothing was rewritten yet, so `buf` still holds the input.
                    *word = buf;
                    if let Some(t) = trailing {
                        word.push(t);
                    }
                    return Ok(true);
                }

                let lhs_len = rw.lhs_len(rule);
                debug_assert!(lhs_len >= 1 && lhs_len <= w + 1, "rule longer than input read");
                w = w + 1 - lhs_len;
                states.truncate(w + 1);
                rw.rhs_into(rule, &mut rhs);

                if flags.contains(ReduceFlags::STOP_AFTER_FIRST) {
                    // First rewrite, so still in gap mode.
                    let mut out = Word::with_capacity(w + rhs.len() + buf.len() - r + reserved);
                    out.extend_from_slice(&buf[..w]);
                    out.extend_from_slice(&rhs);
                    out.extend_from_slice(&buf[r..]);
                    out.extend(trailing);
                    check_length(out.len(), max_len)?;
                    *word = out;
                    return Ok(true);
                }

                if stack_mode {
                    buf.truncate(w);
                    stack.extend(rhs.iter().rev());
                } else if rhs.len() <= r - w {
                    r -= rhs.len();
                    buf[r..r + rhs.len()].copy_from_slice(&rhs);
                } else {
                    stack_mode = true;
                    stack.extend(buf[r..].iter().rev());
                    buf.truncate(w);
                    stack.extend(rhs.iter().rev());
                }

                let pending = if stack_mode { stack.len() } else { buf.len() - r };
                check_length(w + pending + reserved, max_len)?;
            }
        }
    }

    buf.truncate(w);
    buf.extend(trailing);
    *word = buf;
    Ok(changed)
}
