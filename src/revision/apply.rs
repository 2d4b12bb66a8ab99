//! Offset-safe application of accepted change groups.

use crate::error::{CopydeskError, Result};

use super::groups::{ChangeGroup, Edit, GroupStatus};

/// Applies every group marked accepted onto `base` and returns the new
/// content. Pending and rejected groups are no-ops: the original text at
/// their spans is retained.
///
/// Groups are spliced in descending `start_pos` order so the recorded
/// offsets of lower groups stay valid while the string mutates; within a
/// group, deletions land first (descending by position), then insertions.
/// All validation runs before the first splice, so either every edit lands
/// or an error comes back and the caller's document is untouched.
pub fn apply_accepted_groups(base: &str, groups: &[ChangeGroup]) -> Result<String> {
    let mut accepted: Vec<&ChangeGroup> = groups
        .iter()
        .filter(|g| g.status == GroupStatus::Accepted)
        .collect();
    accepted.sort_by_key(|g| (g.start_pos, g.end_pos));

    validate_groups(base, &accepted)?;

    let mut content = base.to_string();
    for group in accepted.iter().rev() {
        let mut deletions: Vec<&Edit> = group.deletions.iter().collect();
        deletions.sort_by_key(|e| e.position);
        for edit in deletions.iter().rev() {
            content.replace_range(edit.position..edit.position + edit.text.len(), "");
        }
        // Ascending stable sort walked backwards keeps same-position
        // insertions in their recorded left-to-right order.
        let mut insertions: Vec<&Edit> = group.insertions.iter().collect();
        insertions.sort_by_key(|e| e.position);
        for edit in insertions.iter().rev() {
            content.insert_str(edit.position, &edit.text);
        }
    }
    Ok(content)
}

/// Checks every accepted group (sorted ascending by span) before a single
/// splice runs: spans inside the text and on char boundaries, deletions
/// tiling exactly `[start_pos, end_pos)` with text still matching the base,
/// insertions anchored at the group start, and no pairwise span overlap.
/// Groups may have been persisted, reloaded or hand-edited since they were
/// built, so none of this is assumed.
fn validate_groups(base: &str, accepted: &[&ChangeGroup]) -> Result<()> {
    for group in accepted {
        if group.start_pos > group.end_pos || group.end_pos > base.len() {
            return Err(CopydeskError::InvalidRange(format!(
                "group span {}..{} does not fit a document of {} bytes",
                group.start_pos,
                group.end_pos,
                base.len()
            )));
        }
        if !base.is_char_boundary(group.start_pos) || !base.is_char_boundary(group.end_pos) {
            return Err(CopydeskError::InvalidRange(format!(
                "group span {}..{} is not aligned to character boundaries",
                group.start_pos, group.end_pos
            )));
        }

        let mut deletions: Vec<&Edit> = group.deletions.iter().collect();
        deletions.sort_by_key(|e| e.position);
        let mut cursor = group.start_pos;
        for edit in deletions {
            if edit.position != cursor {
                return Err(CopydeskError::InvalidRange(format!(
                    "deletion at {} leaves a gap in its group (expected {})",
                    edit.position, cursor
                )));
            }
            match base.get(cursor..cursor + edit.text.len()) {
                Some(slice) if slice == edit.text => {}
                _ => {
                    return Err(CopydeskError::InvalidRange(format!(
                        "recorded deletion at {} no longer matches the document",
                        edit.position
                    )));
                }
            }
            cursor += edit.text.len();
        }
        if cursor != group.end_pos {
            return Err(CopydeskError::InvalidRange(format!(
                "deletions cover {}..{} but the group ends at {}",
                group.start_pos, cursor, group.end_pos
            )));
        }

        for edit in &group.insertions {
            if edit.position != group.start_pos {
                return Err(CopydeskError::InvalidRange(format!(
                    "insertion at {} is not anchored at its group start {}",
                    edit.position, group.start_pos
                )));
            }
        }
    }

    for pair in accepted.windows(2) {
        if pair[0].end_pos > pair[1].start_pos {
            return Err(CopydeskError::Overlap(format!(
                "groups {}..{} and {}..{} overlap",
                pair[0].start_pos, pair[0].end_pos, pair[1].start_pos, pair[1].end_pos
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revision::groups::compute_change_groups;

    fn accept_all(mut groups: Vec<ChangeGroup>) -> Vec<ChangeGroup> {
        for g in &mut groups {
            g.status = GroupStatus::Accepted;
        }
        groups
    }

    #[test]
    fn accepting_everything_reconstructs_the_proposal() {
        let a = "The cat sat on the mat.";
        let b = "The dog sat on the mat quickly.";
        let groups = accept_all(compute_change_groups(a, b));
        assert_eq!(apply_accepted_groups(a, &groups).unwrap(), b);
    }

    #[test]
    fn pending_and_rejected_groups_are_no_ops() {
        let a = "The cat sat on the mat.";
        let b = "The dog sat on the mat quickly.";
        let mut groups = compute_change_groups(a, b);
        assert_eq!(apply_accepted_groups(a, &groups).unwrap(), a);
        for g in &mut groups {
            g.status = GroupStatus::Rejected;
        }
        assert_eq!(apply_accepted_groups(a, &groups).unwrap(), a);
    }

    #[test]
    fn partial_acceptance_applies_only_the_chosen_group() {
        let a = "The cat sat on the mat.";
        let b = "The dog sat on the mat quickly.";
        let groups = compute_change_groups(a, b);
        assert_eq!(groups.len(), 2);

        let mut only_first = groups.clone();
        only_first[0].status = GroupStatus::Accepted;
        assert_eq!(
            apply_accepted_groups(a, &only_first).unwrap(),
            "The dog sat on the mat."
        );

        let mut only_second = groups.clone();
        only_second[1].status = GroupStatus::Accepted;
        assert_eq!(
            apply_accepted_groups(a, &only_second).unwrap(),
            "The cat sat on the mat quickly."
        );
    }

    #[test]
    fn deletion_only_group_round_trips() {
        let a = "Hello world today";
        let b = "Hello today";
        let groups = compute_change_groups(a, b);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].insertions.is_empty());
        assert_eq!(groups[0].deleted_len(), 6);
        assert_eq!(
            apply_accepted_groups(a, &accept_all(groups)).unwrap(),
            b
        );
    }

    #[test]
    fn out_of_bounds_group_is_refused_before_splicing() {
        let group = ChangeGroup {
            start_pos: 10,
            end_pos: 14,
            deletions: vec![Edit { text: "text".into(), position: 10 }],
            insertions: vec![],
            status: GroupStatus::Accepted,
        };
        let err = apply_accepted_groups("short", &[group]).unwrap_err();
        assert!(matches!(err, CopydeskError::InvalidRange(_)));
    }

    #[test]
    fn diverged_deletion_text_is_refused() {
        let group = ChangeGroup {
            start_pos: 0,
            end_pos: 3,
            deletions: vec![Edit { text: "abc".into(), position: 0 }],
            insertions: vec![],
            status: GroupStatus::Accepted,
        };
        let err = apply_accepted_groups("xyz rest", &[group]).unwrap_err();
        assert!(matches!(err, CopydeskError::InvalidRange(_)));
    }

    #[test]
    fn misaligned_multibyte_span_is_refused() {
        let base = "héllo";
        let group = ChangeGroup {
            start_pos: 2,
            end_pos: 3,
            deletions: vec![Edit { text: "\u{a9}".into(), position: 2 }],
            insertions: vec![],
            status: GroupStatus::Accepted,
        };
        let err = apply_accepted_groups(base, &[group]).unwrap_err();
        assert!(matches!(err, CopydeskError::InvalidRange(_)));
    }

    #[test]
    fn overlapping_groups_are_refused() {
        let first = ChangeGroup {
            start_pos: 0,
            end_pos: 4,
            deletions: vec![Edit { text: "abcd".into(), position: 0 }],
            insertions: vec![],
            status: GroupStatus::Accepted,
        };
        let second = ChangeGroup {
            start_pos: 2,
            end_pos: 6,
            deletions: vec![Edit { text: "cdef".into(), position: 2 }],
            insertions: vec![],
            status: GroupStatus::Accepted,
        };
        let err = apply_accepted_groups("abcdefgh", &[first, second]).unwrap_err();
        assert!(matches!(err, CopydeskError::Overlap(_)));
    }

    #[test]
    fn replacement_group_splices_in_place() {
        let group = ChangeGroup {
            start_pos: 4,
            end_pos: 7,
            deletions: vec![Edit { text: "cat".into(), position: 4 }],
            insertions: vec![Edit { text: "dog".into(), position: 4 }],
            status: GroupStatus::Accepted,
        };
        assert_eq!(
            apply_accepted_groups("The cat sat", &[group]).unwrap(),
            "The dog sat"
        );
    }

    #[test]
    fn adjacent_groups_apply_cleanly() {
        // Zero-width insertion group touching a deletion group's start.
        let insert = ChangeGroup {
            start_pos: 5,
            end_pos: 5,
            deletions: vec![],
            insertions: vec![Edit { text: "X".into(), position: 5 }],
            status: GroupStatus::Accepted,
        };
        let delete = ChangeGroup {
            start_pos: 5,
            end_pos: 8,
            deletions: vec![Edit { text: " wo".into(), position: 5 }],
            insertions: vec![],
            status: GroupStatus::Accepted,
        };
        assert_eq!(
            apply_accepted_groups("Hello world", &[insert, delete]).unwrap(),
            "HelloXrld"
        );
    }
}
