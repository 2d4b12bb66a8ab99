//! Thin wrapper around imara-diff producing index-range edit operations
//! over token slices.
//!
//! The differ hands this module two token sequences; it runs Myers over the
//! interned tokens and fills in the equal stretches between hunks so the
//! result covers both inputs end to end.

use imara_diff::{Algorithm, Diff, InternedInput, TokenSource};
use std::hash::Hash;
use std::ops::Range;

/// One edit-script segment, expressed as index ranges into the old and new
/// token sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOp {
    /// Tokens equal in both sequences.
    Equal {
        old: Range<usize>,
        new: Range<usize>,
    },
    /// Tokens present only in the old sequence.
    Delete { old: Range<usize> },
    /// Tokens present only in the new sequence, anchored before `old_at` in
    /// the old sequence.
    Insert {
        old_at: usize,
        new: Range<usize>,
    },
    /// A contiguous run where old tokens were swapped for new ones.
    Replace {
        old: Range<usize>,
        new: Range<usize>,
    },
}

/// Token source adapter so imara-diff can intern arbitrary slices.
struct SliceTokens<'a, T> {
    slice: &'a [T],
}

impl<'a, T: Clone + Hash + Eq> TokenSource for SliceTokens<'a, T> {
    type Token = T;
    type Tokenizer = std::iter::Cloned<std::slice::Iter<'a, T>>;

    fn tokenize(&self) -> Self::Tokenizer {
        self.slice.iter().cloned()
    }

    fn estimate_tokens(&self) -> u32 {
        self.slice.len() as u32
    }
}

/// Runs Myers over two token slices and returns the full edit script,
/// including the equal runs between and around the changed hunks.
pub fn token_ops<T: Hash + Eq + Clone>(old: &[T], new: &[T]) -> Vec<TokenOp> {
    let input = InternedInput::new(SliceTokens { slice: old }, SliceTokens { slice: new });
    let diff = Diff::compute(Algorithm::Myers, &input);

    let mut ops = Vec::new();
    let mut old_idx: usize = 0;
    let mut new_idx: usize = 0;

    for hunk in diff.hunks() {
        let old_start = hunk.before.start as usize;
        let old_end = hunk.before.end as usize;
        let new_start = hunk.after.start as usize;
        let new_end = hunk.after.end as usize;

        if old_idx < old_start {
            ops.push(TokenOp::Equal {
                old: old_idx..old_start,
                new: new_idx..new_start,
            });
        }

        let old_len = old_end - old_start;
        let new_len = new_end - new_start;
        if old_len > 0 && new_len > 0 {
            ops.push(TokenOp::Replace {
                old: old_start..old_end,
                new: new_start..new_end,
            });
        } else if old_len > 0 {
            ops.push(TokenOp::Delete {
                old: old_start..old_end,
            });
        } else if new_len > 0 {
            ops.push(TokenOp::Insert {
                old_at: old_start,
                new: new_start..new_end,
            });
        }

        old_idx = old_end;
        new_idx = new_end;
    }

    if old_idx < old.len() {
        ops.push(TokenOp::Equal {
            old: old_idx..old.len(),
            new: new_idx..new.len(),
        });
    }

    ops
}
