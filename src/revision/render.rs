//! Human-readable rendering of suggestions under review.

use crate::config::Config;

use super::groups::{ChangeGroup, GroupStatus};

/// Formats a full review: a one-line summary, the document with pending
/// changes annotated inline, and a numbered list of every group.
///
/// `groups` must have been computed against `original` (callers check
/// suggestion freshness first).
pub fn render_review(original: &str, groups: &[ChangeGroup]) -> String {
    let mut out = String::new();
    out.push_str(&render_summary(groups));
    out.push_str("\n\n");
    out.push_str(&render_inline(original, groups));
    out.push('\n');
    if !groups.is_empty() {
        out.push('\n');
        let context = Config::get().review_context();
        for (idx, group) in groups.iter().enumerate() {
            out.push_str(&describe_group(idx, group, original, context));
            out.push('\n');
        }
    }
    out
}

pub fn render_summary(groups: &[ChangeGroup]) -> String {
    let pending = groups
        .iter()
        .filter(|g| g.status == GroupStatus::Pending)
        .count();
    let accepted = groups
        .iter()
        .filter(|g| g.status == GroupStatus::Accepted)
        .count();
    let rejected = groups
        .iter()
        .filter(|g| g.status == GroupStatus::Rejected)
        .count();
    format!(
        "{} change group(s): {} pending, {} accepted, {} rejected",
        groups.len(),
        pending,
        accepted,
        rejected
    )
}

/// The document text with each group rendered according to its status:
/// pending groups show `[-old-]{+new+}` markers, accepted groups show
/// their new text, rejected groups show the original text.
pub fn render_inline(original: &str, groups: &[ChangeGroup]) -> String {
    let mut out = String::new();
    let mut cursor = 0usize;
    for group in groups {
        out.push_str(&original[cursor..group.start_pos]);
        match group.status {
            GroupStatus::Pending => {
                if group.start_pos < group.end_pos {
                    out.push_str("[-");
                    out.push_str(&original[group.start_pos..group.end_pos]);
                    out.push_str("-]");
                }
                if group.inserted_len() > 0 {
                    out.push_str("{+");
                    for edit in &group.insertions {
                        out.push_str(&edit.text);
                    }
                    out.push_str("+}");
                }
            }
            GroupStatus::Accepted => {
                for edit in &group.insertions {
                    out.push_str(&edit.text);
                }
            }
            GroupStatus::Rejected => {
                out.push_str(&original[group.start_pos..group.end_pos]);
            }
        }
        cursor = group.end_pos;
    }
    out.push_str(&original[cursor..]);
    out
}

fn describe_group(index: usize, group: &ChangeGroup, original: &str, context: usize) -> String {
    let deleted = &original[group.start_pos..group.end_pos];
    let inserted: String = group
        .insertions
        .iter()
        .map(|e| e.text.as_str())
        .collect();
    let action = if !deleted.is_empty() && !inserted.is_empty() {
        format!(
            "replace {:?} with {:?}",
            elide_middle(deleted, context),
            elide_middle(&inserted, context)
        )
    } else if !deleted.is_empty() {
        format!("delete {:?}", elide_middle(deleted, context))
    } else {
        format!("insert {:?}", elide_middle(&inserted, context))
    };
    format!(
        "{}. [{}] {} at {}..{}",
        index + 1,
        group.status.as_str(),
        action,
        group.start_pos,
        group.end_pos
    )
}

/// Keeps the first and last `max_chars / 2` characters, eliding the rest.
/// Counts characters, not bytes, so multibyte text never splits.
fn elide_middle(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars || max_chars < 2 {
        return text.to_string();
    }
    let keep = max_chars / 2;
    let head: String = text.chars().take(keep).collect();
    let tail: String = text.chars().skip(total - keep).collect();
    format!("{}...{}", head, tail)
}
