//! Token-level text diffing with semantic cleanup.
//!
//! The diff runs over word, whitespace and punctuation tokens rather than
//! raw characters so edits fall on natural boundaries. A minimal Myers
//! script is still too fragmented to review (a one-space equal run
//! sandwiched between two replacements splits what a reader sees as one
//! edit), so a cleanup pass folds such runs into the surrounding edits
//! before the ops are handed to the group builder.

use serde::{Deserialize, Serialize};

use super::token_diff::{TokenOp, token_ops};

/// Kind of a diff segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffOpKind {
    Equal,
    Delete,
    Insert,
}

/// One segment of a text diff: an operation plus the text it covers.
///
/// Concatenating the Equal and Delete texts in order reproduces the
/// original input exactly; concatenating Equal and Insert reproduces the
/// proposed input exactly. Every function here preserves both invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOp {
    pub op: DiffOpKind,
    pub text: String,
}

impl DiffOp {
    pub fn equal(text: impl Into<String>) -> Self {
        DiffOp {
            op: DiffOpKind::Equal,
            text: text.into(),
        }
    }

    pub fn delete(text: impl Into<String>) -> Self {
        DiffOp {
            op: DiffOpKind::Delete,
            text: text.into(),
        }
    }

    pub fn insert(text: impl Into<String>) -> Self {
        DiffOp {
            op: DiffOpKind::Insert,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    Word,
    Space,
    Punct,
}

fn classify(c: char) -> TokenClass {
    if c.is_alphanumeric() || c == '_' {
        TokenClass::Word
    } else if c.is_whitespace() {
        TokenClass::Space
    } else {
        TokenClass::Punct
    }
}

/// Splits `text` into tokens that tile it completely: alphanumeric runs,
/// whitespace runs, and single punctuation characters. Token boundaries
/// are always char boundaries, which is what keeps every recorded offset
/// downstream safe to splice at.
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut iter = text.char_indices().peekable();
    while let Some((start, c)) = iter.next() {
        let class = classify(c);
        let mut end = start + c.len_utf8();
        // Punctuation stays one char per token so "word." splits cleanly.
        if class != TokenClass::Punct {
            while let Some(&(next_start, next_c)) = iter.peek() {
                if classify(next_c) != class {
                    break;
                }
                end = next_start + next_c.len_utf8();
                iter.next();
            }
        }
        tokens.push(&text[start..end]);
    }
    tokens
}

/// Byte offset of each token's start, plus the total length as a final
/// sentinel, so `starts[i]..starts[j]` is the byte range of tokens `i..j`.
fn token_starts(tokens: &[&str]) -> Vec<usize> {
    let mut starts = Vec::with_capacity(tokens.len() + 1);
    let mut pos = 0;
    for token in tokens {
        starts.push(pos);
        pos += token.len();
    }
    starts.push(pos);
    starts
}

/// Token-level diff of `original` against `proposed` with semantic cleanup
/// applied. Deterministic and pure.
pub fn diff_ops(original: &str, proposed: &str) -> Vec<DiffOp> {
    if original == proposed {
        if original.is_empty() {
            return Vec::new();
        }
        return vec![DiffOp::equal(original)];
    }

    let old_tokens = tokenize(original);
    let new_tokens = tokenize(proposed);
    let old_starts = token_starts(&old_tokens);
    let new_starts = token_starts(&new_tokens);

    let mut ops = Vec::new();
    for op in token_ops(&old_tokens, &new_tokens) {
        match op {
            TokenOp::Equal { old, .. } => {
                ops.push(DiffOp::equal(
                    &original[old_starts[old.start]..old_starts[old.end]],
                ));
            }
            TokenOp::Delete { old } => {
                ops.push(DiffOp::delete(
                    &original[old_starts[old.start]..old_starts[old.end]],
                ));
            }
            TokenOp::Insert { new, .. } => {
                ops.push(DiffOp::insert(
                    &proposed[new_starts[new.start]..new_starts[new.end]],
                ));
            }
            TokenOp::Replace { old, new } => {
                ops.push(DiffOp::delete(
                    &original[old_starts[old.start]..old_starts[old.end]],
                ));
                ops.push(DiffOp::insert(
                    &proposed[new_starts[new.start]..new_starts[new.end]],
                ));
            }
        }
    }

    merge_ops(fold_small_equalities(ops))
}

/// Semantic cleanup rule: an Equal run no longer than the edit activity on
/// both of its sides carries no useful anchor, so it is re-emitted as a
/// paired Delete+Insert and absorbed into the surrounding cluster. Repeats
/// until no run qualifies; each fold removes one Equal, so this terminates.
fn fold_small_equalities(mut ops: Vec<DiffOp>) -> Vec<DiffOp> {
    loop {
        let mut fold_at: Option<usize> = None;
        let mut before_del = 0usize;
        let mut before_ins = 0usize;
        let mut after_del = 0usize;
        let mut after_ins = 0usize;
        let mut last_equal: Option<usize> = None;

        for (idx, op) in ops.iter().enumerate() {
            match op.op {
                DiffOpKind::Equal => {
                    before_del = after_del;
                    before_ins = after_ins;
                    after_del = 0;
                    after_ins = 0;
                    last_equal = Some(idx);
                }
                DiffOpKind::Delete => after_del += op.text.len(),
                DiffOpKind::Insert => after_ins += op.text.len(),
            }
            if let Some(eq_idx) = last_equal {
                let eq_len = ops[eq_idx].text.len();
                if eq_len > 0
                    && eq_len <= before_del.max(before_ins)
                    && eq_len <= after_del.max(after_ins)
                {
                    fold_at = Some(eq_idx);
                    break;
                }
            }
        }

        match fold_at {
            Some(idx) => {
                let text = ops[idx].text.clone();
                ops[idx] = DiffOp::insert(text.clone());
                ops.insert(idx, DiffOp::delete(text));
            }
            None => return ops,
        }
    }
}

/// Coalesces each run between Equal anchors into at most one Delete
/// followed by one Insert, concatenates adjacent Equal runs, and drops
/// empty segments.
fn merge_ops(ops: Vec<DiffOp>) -> Vec<DiffOp> {
    fn flush(out: &mut Vec<DiffOp>, del: &mut String, ins: &mut String) {
        if !del.is_empty() {
            out.push(DiffOp::delete(std::mem::take(del)));
        }
        if !ins.is_empty() {
            out.push(DiffOp::insert(std::mem::take(ins)));
        }
    }

    let mut out: Vec<DiffOp> = Vec::new();
    let mut del = String::new();
    let mut ins = String::new();

    for op in ops {
        match op.op {
            DiffOpKind::Equal => {
                if op.text.is_empty() {
                    continue;
                }
                flush(&mut out, &mut del, &mut ins);
                match out.last_mut() {
                    Some(prev) if prev.op == DiffOpKind::Equal => prev.text.push_str(&op.text),
                    _ => out.push(op),
                }
            }
            DiffOpKind::Delete => del.push_str(&op.text),
            DiffOpKind::Insert => ins.push_str(&op.text),
        }
    }
    flush(&mut out, &mut del, &mut ins);
    out
}
