//! Change groups: clusters of adjacent edits reviewed as one unit.

use serde::{Deserialize, Serialize};

use super::differ::{DiffOp, DiffOpKind, diff_ops};

/// One deletion or insertion inside a change group.
///
/// `position` is a byte offset into the original text's coordinate space,
/// never into the proposed text. For an insertion it is the point in the
/// original text after which the inserted text logically lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub text: String,
    pub position: usize,
}

/// Review decision for one change group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupStatus {
    Pending,
    Accepted,
    Rejected,
}

impl GroupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupStatus::Pending => "pending",
            GroupStatus::Accepted => "accepted",
            GroupStatus::Rejected => "rejected",
        }
    }
}

/// A cluster of directly adjacent deletions and insertions.
///
/// `end_pos` always equals `start_pos` plus the summed byte length of the
/// deletions; insertions consume no original-text bytes and never extend
/// it. Groups built here are sorted ascending by `start_pos` and their
/// `[start_pos, end_pos)` spans never overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeGroup {
    pub start_pos: usize,
    pub end_pos: usize,
    #[serde(default)]
    pub deletions: Vec<Edit>,
    #[serde(default)]
    pub insertions: Vec<Edit>,
    pub status: GroupStatus,
}

impl ChangeGroup {
    fn open_at(pos: usize) -> Self {
        ChangeGroup {
            start_pos: pos,
            end_pos: pos,
            deletions: Vec::new(),
            insertions: Vec::new(),
            status: GroupStatus::Pending,
        }
    }

    /// Total bytes the group removes from the original text.
    pub fn deleted_len(&self) -> usize {
        self.deletions.iter().map(|e| e.text.len()).sum()
    }

    /// Total bytes the group's insertions add.
    pub fn inserted_len(&self) -> usize {
        self.insertions.iter().map(|e| e.text.len()).sum()
    }

    pub fn is_pending(&self) -> bool {
        self.status == GroupStatus::Pending
    }
}

/// Groups consecutive non-equal diff ops into pending change groups.
///
/// Strict adjacency: any Equal op closes the open group, so only directly
/// adjacent delete/insert runs share a group. The cursor `pos` tracks
/// original-text bytes and advances on Equal and Delete only. Insertions
/// are recorded at the owning group's `start_pos`: the applier splices a
/// group's deletions first, which removes `[start_pos, end_pos)` entirely,
/// so `start_pos` is the one offset where replacement text lands where the
/// deleted text was.
pub fn build_change_groups(ops: &[DiffOp]) -> Vec<ChangeGroup> {
    let mut groups: Vec<ChangeGroup> = Vec::new();
    let mut open: Option<ChangeGroup> = None;
    let mut pos = 0usize;

    for op in ops {
        match op.op {
            DiffOpKind::Equal => {
                if let Some(group) = open.take() {
                    groups.push(group);
                }
                pos += op.text.len();
            }
            DiffOpKind::Delete => {
                let group = open.get_or_insert_with(|| ChangeGroup::open_at(pos));
                group.deletions.push(Edit {
                    text: op.text.clone(),
                    position: pos,
                });
                pos += op.text.len();
                group.end_pos = pos;
            }
            DiffOpKind::Insert => {
                let group = open.get_or_insert_with(|| ChangeGroup::open_at(pos));
                let position = group.start_pos;
                group.insertions.push(Edit {
                    text: op.text.clone(),
                    position,
                });
            }
        }
    }
    if let Some(group) = open.take() {
        groups.push(group);
    }

    // Monotonic by construction; the sort and assert are a postcondition
    // guard against ops assembled by hand.
    groups.sort_by_key(|g| (g.start_pos, g.end_pos));
    debug_assert!(
        groups.windows(2).all(|w| w[0].end_pos <= w[1].start_pos),
        "change groups must not overlap"
    );
    groups
}

/// Entry point combining the differ and the group builder.
pub fn compute_change_groups(original: &str, proposed: &str) -> Vec<ChangeGroup> {
    build_change_groups(&diff_ops(original, proposed))
}
